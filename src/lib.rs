pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::gemini::GeminiClient;

// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gemini: GeminiClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let gemini = GeminiClient::new(&config);
        Self { config, gemini }
    }
}
