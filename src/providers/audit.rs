//! Citation audit and live fact-check clients.
//!
//! The audit endpoint streams one JSON object per line: progress notes
//! (`{"info": ...}`), errors (`{"error": ...}`) or a verdict for one
//! citation. The fact-check endpoint answers a single claim with one JSON
//! document.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;

use super::http::{ensure_success, HttpBackend};
use super::provider::Result;
use super::stream::json_lines;

pub const DEFAULT_SOURCE_FILTER: &str = "all";

/// Verdict for a single citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CitationStatus {
    Real,
    Fake,
    Mismatch,
    Suspicious,
    Unverified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditItem {
    pub citation_text: String,
    pub status: CitationStatus,
    pub confidence: f64,
    pub message: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// One decoded line of the audit stream.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditEvent {
    Info(String),
    Error(String),
    Item(AuditItem),
}

impl AuditEvent {
    /// Decode a line. Returns `None` for lines that fit none of the shapes.
    pub fn parse(line: &str) -> Option<Self> {
        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Skipping malformed audit line: {}", e);
                return None;
            }
        };

        if let Some(info) = value.get("info") {
            return Some(AuditEvent::Info(json_text(info)));
        }
        if let Some(error) = value.get("error") {
            return Some(AuditEvent::Error(json_text(error)));
        }

        match serde_json::from_value(value) {
            Ok(item) => Some(AuditEvent::Item(item)),
            Err(e) => {
                tracing::warn!("Skipping unrecognised audit line: {}", e);
                None
            }
        }
    }
}

fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Everything an audit produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditReport {
    pub items: Vec<AuditItem>,
    pub errors: Vec<String>,
}

impl AuditReport {
    /// Share of citations found real, as a rounded percentage.
    pub fn score(&self) -> u32 {
        if self.items.is_empty() {
            return 0;
        }
        let real = self
            .items
            .iter()
            .filter(|item| item.status == CitationStatus::Real)
            .count();
        (real as f64 * 100.0 / self.items.len() as f64).round() as u32
    }
}

/// Verdict for a spoken or typed claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    True,
    False,
    Unverifiable,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckResponse {
    pub verdict: Verdict,
    pub evidence: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// A checked claim with the time it was answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactCheck {
    pub text: String,
    pub verdict: Verdict,
    pub evidence: String,
    pub source: Option<String>,
    pub checked_at: DateTime<Local>,
}

/// Running tallies across fact-checks. Every false claim is a "zap".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FactCheckStats {
    pub total_claims: u32,
    pub total_zaps: u32,
    pub true_count: u32,
    pub false_count: u32,
    pub unverifiable_count: u32,
}

impl FactCheckStats {
    pub fn record(&mut self, verdict: Verdict) {
        self.total_claims += 1;
        match verdict {
            Verdict::True => self.true_count += 1,
            Verdict::False => {
                self.false_count += 1;
                self.total_zaps += 1;
            }
            Verdict::Unverifiable => self.unverifiable_count += 1,
            Verdict::Error => {}
        }
    }

    /// Rounded percentage of claims judged true.
    pub fn truth_rate(&self) -> u32 {
        if self.total_claims == 0 {
            return 0;
        }
        (self.true_count as f64 * 100.0 / self.total_claims as f64).round() as u32
    }
}

#[derive(Serialize)]
struct AuditRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct FactCheckRequest<'a> {
    text: &'a str,
    source_filter: &'a str,
}

impl HttpBackend {
    /// Audit the citations in `text`, calling `on_event` for every decoded
    /// line as it arrives.
    pub async fn audit<F>(&self, text: &str, mut on_event: F) -> Result<AuditReport>
    where
        F: FnMut(&AuditEvent) + Send,
    {
        let response = self
            .client
            .post(self.url("/api/audit"))
            .json(&AuditRequest { text })
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let lines = json_lines(response.bytes_stream());
        tokio::pin!(lines);
        let mut report = AuditReport::default();

        while let Some(line) = lines.next().await {
            apply_line(&line?, &mut report, &mut on_event);
        }

        tracing::info!(
            "Audit finished: {} citations, {} errors",
            report.items.len(),
            report.errors.len()
        );
        Ok(report)
    }

    /// Check one claim against the sources selected by `source_filter`.
    pub async fn fact_check(&self, text: &str, source_filter: &str) -> Result<FactCheck> {
        let response = self
            .client
            .post(self.url("/api/realibuddy/audit"))
            .json(&FactCheckRequest {
                text,
                source_filter,
            })
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: FactCheckResponse = response.json().await?;

        Ok(FactCheck {
            text: text.to_string(),
            verdict: body.verdict,
            evidence: body.evidence,
            source: body.source,
            checked_at: Local::now(),
        })
    }
}

fn apply_line<F>(line: &str, report: &mut AuditReport, on_event: &mut F)
where
    F: FnMut(&AuditEvent),
{
    let Some(event) = AuditEvent::parse(line) else {
        return;
    };
    on_event(&event);
    match event {
        AuditEvent::Info(info) => tracing::debug!("Audit progress: {}", info),
        AuditEvent::Error(error) => {
            tracing::warn!("Audit backend reported: {}", error);
            report.errors.push(error);
        }
        AuditEvent::Item(item) => report.items.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::tests::spawn_server;
    use axum::body::{Body, Bytes};
    use axum::routing::post;
    use axum::{Json, Router};

    fn item(status: CitationStatus) -> AuditItem {
        AuditItem {
            citation_text: "Devlin et al., 2018".to_string(),
            status,
            confidence: 0.9,
            message: String::new(),
            source: "crossref".to_string(),
            metadata: None,
        }
    }

    #[test]
    fn test_parse_lines() {
        assert_eq!(
            AuditEvent::parse(r#"{"info": "scanning"}"#),
            Some(AuditEvent::Info("scanning".to_string()))
        );
        assert_eq!(
            AuditEvent::parse(r#"{"error": "rate limited"}"#),
            Some(AuditEvent::Error("rate limited".to_string()))
        );
        let line = r#"{"citation_text":"He, 2016","status":"MISMATCH","confidence":0.4,"message":"topic differs","source":"arxiv","metadata":{"year":2016}}"#;
        match AuditEvent::parse(line) {
            Some(AuditEvent::Item(item)) => {
                assert_eq!(item.status, CitationStatus::Mismatch);
                assert_eq!(item.metadata.unwrap()["year"], 2016);
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(AuditEvent::parse("not json"), None);
        assert_eq!(AuditEvent::parse(r#"{"status":"REAL"}"#), None);
    }

    #[test]
    fn test_score() {
        assert_eq!(AuditReport::default().score(), 0);
        let report = AuditReport {
            items: vec![
                item(CitationStatus::Real),
                item(CitationStatus::Fake),
                item(CitationStatus::Real),
            ],
            errors: Vec::new(),
        };
        assert_eq!(report.score(), 67);
    }

    #[test]
    fn test_fact_check_stats() {
        let mut stats = FactCheckStats::default();
        assert_eq!(stats.truth_rate(), 0);
        stats.record(Verdict::True);
        stats.record(Verdict::False);
        stats.record(Verdict::Unverifiable);
        stats.record(Verdict::Error);
        assert_eq!(stats.total_claims, 4);
        assert_eq!(stats.total_zaps, 1);
        assert_eq!(stats.unverifiable_count, 1);
        assert_eq!(stats.truth_rate(), 25);
    }

    #[tokio::test]
    async fn test_audit_lines_split_across_chunks() {
        let router = Router::new().route(
            "/api/audit",
            post(|| async {
                let chunks: Vec<std::result::Result<Bytes, std::io::Error>> = vec![
                    Ok(Bytes::from("{\"info\":\"start\"}\n{\"citation_text\":\"A\",\"sta")),
                    Ok(Bytes::from("tus\":\"REAL\",\"confidence\":1.0,\"message\":\"ok\",\"source\":\"s\"}\n")),
                    Ok(Bytes::from("garbage\n{\"error\":\"lookup failed\"}\n")),
                    Ok(Bytes::from("{\"citation_text\":\"B\",\"status\":\"FAKE\",\"confidence\":0.2,\"message\":\"none\",\"source\":\"s\"}")),
                ];
                Body::from_stream(tokio_stream::iter(chunks))
            }),
        );
        let backend = HttpBackend::with_base_url(spawn_server(router).await);

        let mut seen = Vec::new();
        let report = backend
            .audit("citations", |event| seen.push(event.clone()))
            .await
            .unwrap();

        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], AuditEvent::Info("start".to_string()));
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[1].citation_text, "B");
        assert_eq!(report.errors, vec!["lookup failed".to_string()]);
        assert_eq!(report.score(), 50);
    }

    #[tokio::test]
    async fn test_fact_check() {
        let router = Router::new().route(
            "/api/realibuddy/audit",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["source_filter"], "news");
                Json(serde_json::json!({
                    "verdict": "False",
                    "evidence": "Contradicted by census data",
                    "source": "census.gov"
                }))
            }),
        );
        let backend = HttpBackend::with_base_url(spawn_server(router).await);

        let check = backend.fact_check("The moon is cheese", "news").await.unwrap();
        assert_eq!(check.verdict, Verdict::False);
        assert_eq!(check.source.as_deref(), Some("census.gov"));
        assert_eq!(check.text, "The moon is cheese");
    }
}
