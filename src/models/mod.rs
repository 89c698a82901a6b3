pub mod auth;
pub mod import;
pub mod product;
