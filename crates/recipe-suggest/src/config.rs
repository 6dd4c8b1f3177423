use std::net::SocketAddr;

use recipe_common::images::ImageClientConfig;
use recipe_common::llm::LlmClientConfig;

use crate::error::AppError;

/// Application configuration loaded explicitly from environment
/// variables. Every knob has a default; an unset environment still
/// yields a runnable (if capability-degraded) server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Directory for the append-only journals.
    pub data_dir: String,
    /// Text-generation capability settings. `api_key == None` means
    /// the catalog cascade runs alone.
    pub llm: LlmClientConfig,
    /// Image-search capability settings. Keyless resolution falls
    /// back to the local keyword map.
    pub images: ImageClientConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `LISTEN_ADDR`: bind address (default `127.0.0.1:8000`)
    /// - `DATA_DIR`: journal directory (default `./data`)
    /// - `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_MODEL`
    /// - `PEXELS_API_KEY`, `PEXELS_BASE_URL`, `STATIC_IMAGE_ROOT`
    pub fn from_env() -> Result<Self, AppError> {
        let listen_addr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("LISTEN_ADDR is not a socket address: {e}")))?;

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        Ok(Self {
            listen_addr,
            data_dir,
            llm: LlmClientConfig::from_env(),
            images: ImageClientConfig::from_env(),
        })
    }
}
