//! HTTP client for the portfolio backend.
//!
//! The backend exposes the streamed chat, the citation audit, the live
//! fact-check and a health endpoint under one base URL.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;

use super::provider::{ChatBackend, ProviderError, Result, TextStream};
use super::stream::text_fragments;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

pub struct HttpBackend {
    pub(crate) client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

impl HttpBackend {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Backend whose connection attempts give up after `timeout`. Without one
    /// a hung connection waits for the OS.
    pub fn with_connect_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().connect_timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ping the health endpoint. Hosted backends sleep when idle and this
    /// wakes them before the visitor's first chat message.
    pub async fn wake(&self) -> Result<()> {
        let response = self.client.get(self.url("/api/health")).send().await?;
        let status = response.status();
        tracing::debug!("Backend health check returned {}", status);
        ensure_success(response).await?;
        Ok(())
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a non-2xx response into [`ProviderError::Status`].
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ChatBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn open_chat(&self, message: &str) -> Result<TextStream> {
        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&ChatRequest { message })
            .send()
            .await?;

        let response = ensure_success(response).await?;
        tracing::debug!("Chat stream opened ({})", response.status());

        Ok(Box::pin(text_fragments(response.bytes_stream())))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::body::{Body, Bytes};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use tokio_stream::StreamExt;

    /// Serve `router` on an ephemeral local port and return its base URL.
    pub(crate) async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn chunked_chat(Json(body): Json<serde_json::Value>) -> Body {
        let message = body["message"].as_str().unwrap_or_default().to_string();
        let chunks: Vec<std::result::Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from("echo: ")),
            Ok(Bytes::from(message)),
            Ok(Bytes::from_static(" ✓".as_bytes())),
        ];
        Body::from_stream(tokio_stream::iter(chunks))
    }

    #[tokio::test]
    async fn test_chat_stream_round_trip() {
        let base = spawn_server(Router::new().route("/api/chat", post(chunked_chat))).await;
        let backend = HttpBackend::with_base_url(format!("{}/", base));

        let stream = backend.open_chat("hello").await.unwrap();
        let parts: Vec<String> = stream.map(|r| r.unwrap()).collect().await;
        assert_eq!(parts.concat(), "echo: hello ✓");
    }

    #[tokio::test]
    async fn test_chat_non_success_status() {
        let router = Router::new().route(
            "/api/chat",
            post(|| async { (StatusCode::BAD_GATEWAY, "model offline") }),
        );
        let backend = HttpBackend::with_base_url(spawn_server(router).await);

        match backend.open_chat("hello").await {
            Err(ProviderError::Status { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "model offline");
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected a status error"),
        }
    }

    #[tokio::test]
    async fn test_wake() {
        let router = Router::new().route("/api/health", get(|| async { "OK" }));
        let backend = HttpBackend::with_base_url(spawn_server(router).await);
        backend.wake().await.unwrap();

        let missing = HttpBackend::with_base_url(spawn_server(Router::new()).await);
        assert!(missing.wake().await.is_err());
    }
}
