// Library exports for the console binary and tests
pub mod config;
pub mod controllers;
pub mod models;
pub mod services;
