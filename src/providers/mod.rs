//! Backend clients: the streamed chat plus the demo panels' audit endpoints.

use std::sync::Arc;
use std::time::Duration;

pub mod audit;
pub mod http;
pub mod provider;
pub mod stream;

pub use http::HttpBackend;
pub use provider::{ChatBackend, ProviderError, Result, TextStream};

use crate::config::Settings;

/// Build the HTTP backend described by `settings`.
pub fn create_backend(settings: &Settings) -> Result<HttpBackend> {
    match settings.connect_timeout_secs {
        Some(secs) => HttpBackend::with_connect_timeout(&settings.api_url, Duration::from_secs(secs)),
        None => Ok(HttpBackend::with_base_url(&settings.api_url)),
    }
}

/// Same as [`create_backend`], shared for the terminal engine.
pub fn create_chat_backend(settings: &Settings) -> Result<Arc<dyn ChatBackend>> {
    Ok(Arc::new(create_backend(settings)?))
}
