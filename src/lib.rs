pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod llm;
pub mod logging;

use std::sync::Arc;
use config::Config;
use error::{AppError, Result};
use fetcher::PageFetcher;
use llm::AnswerClient;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: PageFetcher,
    pub answers: AnswerClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = PageFetcher::new()
            .map_err(|e| AppError::Startup(format!("Failed to build page fetcher: {}", e)))?;
        let answers = AnswerClient::new(&config)
            .map_err(|e| AppError::Startup(format!("Failed to build completion client: {}", e)))?;

        Ok(AppState {
            config: Arc::new(config),
            fetcher,
            answers,
        })
    }
}
