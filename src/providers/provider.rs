//! Chat backend trait for neuralterm.

use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Body read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Ordered, finite sequence of reply fragments. Fragment boundaries carry no
/// meaning; concatenating them yields the reply.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Remote chat endpoint.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Send one visitor message and open the streamed reply. An `Err` means
    /// no reply is coming (connection refused, non-2xx status, no body).
    async fn open_chat(&self, message: &str) -> Result<TextStream>;
}

impl ProviderError {
    pub fn other(s: impl Into<String>) -> Self {
        ProviderError::Other(s.into())
    }
}
