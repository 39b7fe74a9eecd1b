use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use crate::error::{AppError, Result};

pub const COMPLETION_URL: &str = "https://api.featherless.ai/v1/chat/completions";
pub const MODEL: &str = "Qwen/Qwen2.5-7B-Instruct";

/// Value shipped in the example `.env`; treated the same as a missing key.
pub const PLACEHOLDER_API_KEY: &str = "PUT_YOUR_KEY_HERE";

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub api_key: Option<String>,
    pub completion_url: String,
    pub model: String,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        // A missing key is reported per request, not at startup
        let api_key = env::var("FEATHERLESS_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::Startup(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::Startup(format!("Invalid host address: {}", e)))?;

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            api_key,
            completion_url: COMPLETION_URL.to_string(),
            model: MODEL.to_string(),
            static_dir,
        })
    }

    pub fn has_usable_api_key(&self) -> bool {
        usable_api_key(self.api_key.as_deref()).is_some()
    }
}

/// Returns the key only when it is set, non-blank and not the placeholder.
pub(crate) fn usable_api_key(key: Option<&str>) -> Option<&str> {
    key.map(str::trim)
        .filter(|k| !k.is_empty() && *k != PLACEHOLDER_API_KEY)
}
