use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the inventory REST API.
    pub api_base_url: String,
    /// Directory where the bearer token and cached user are persisted.
    pub session_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".into()),
            session_dir: env::var("SESSION_DIR")
                .unwrap_or_else(|_| ".almacen-session".into()),
        })
    }
}
