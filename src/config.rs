use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub port: u16,
    pub static_dir: String,
    pub max_file_size: usize,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        // The Gemini key is the only required setting
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|e| anyhow::anyhow!("Failed to load GEMINI_API_KEY: {}", e))?;

        let gemini_base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string());

        Ok(Config {
            gemini_api_key,
            gemini_base_url,
            port,
            static_dir,
            max_file_size: 10 * 1024 * 1024, // 10MB
        })
    }
}
