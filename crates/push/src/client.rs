//! Multicast push delivery with per-token result accounting.
//!
//! [`PushClient`] sends a message to a set of device tokens through the
//! push gateway's multicast endpoint. The gateway accepts at most
//! [`MAX_TOKENS_PER_CALL`] tokens per request, so larger sets are split
//! into chunks. Expired or invalid tokens are steady-state noise and are
//! only logged; a transport failure fails that chunk's tokens and moves
//! on to the next chunk.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Maximum device tokens the gateway accepts in one multicast call.
pub const MAX_TOKENS_PER_CALL: usize = 500;

/// HTTP request timeout for a single multicast attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Config / message / report types
// ---------------------------------------------------------------------------

/// Push gateway connection settings.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Multicast endpoint URL.
    pub gateway_url: String,
    /// Bearer key sent in the `Authorization` header.
    pub api_key: String,
}

impl PushConfig {
    /// Load gateway settings from `PUSH_GATEWAY_URL` / `PUSH_GATEWAY_KEY`.
    ///
    /// Returns `None` when either variable is unset, in which case push
    /// delivery is disabled and the inbox remains the only channel.
    pub fn from_env() -> Option<Self> {
        let gateway_url = std::env::var("PUSH_GATEWAY_URL").ok()?;
        let api_key = std::env::var("PUSH_GATEWAY_KEY").ok()?;
        Some(Self {
            gateway_url,
            api_key,
        })
    }
}

/// The message delivered to every token of one multicast.
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// Structured payload forwarded to the client application.
    pub data: serde_json::Value,
}

/// Accumulated per-token outcome of a multicast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushReport {
    pub success_count: usize,
    pub failure_count: usize,
}

impl PushReport {
    /// Fold another report into this one.
    pub fn absorb(&mut self, other: PushReport) {
        self.success_count += other.success_count;
        self.failure_count += other.failure_count;
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One entry of the gateway's per-token result array.
#[derive(Debug, Deserialize)]
struct TokenResult {
    #[serde(default)]
    error: Option<String>,
}

/// Gateway response to a multicast call.
#[derive(Debug, Deserialize)]
struct MulticastResponse {
    #[serde(default)]
    results: Vec<TokenResult>,
}

/// Error type for a single multicast request.
#[derive(Debug, thiserror::Error)]
enum PushError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Push gateway returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// PushClient
// ---------------------------------------------------------------------------

/// Sends multicast pushes to the configured gateway.
pub struct PushClient {
    client: reqwest::Client,
    config: PushConfig,
}

impl PushClient {
    /// Create a client with a pre-configured HTTP connection pool.
    pub fn new(config: PushConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    /// Deliver `message` to every token, chunked to the gateway limit.
    ///
    /// Never returns an error: transport failures mark the whole chunk
    /// failed and the remaining chunks are still attempted.
    pub async fn send_multicast(&self, message: &PushMessage, tokens: &[String]) -> PushReport {
        let mut report = PushReport::default();

        for chunk in tokens.chunks(MAX_TOKENS_PER_CALL) {
            match self.send_chunk(message, chunk).await {
                Ok(chunk_report) => report.absorb(chunk_report),
                Err(e) => {
                    tracing::error!(
                        tokens = chunk.len(),
                        error = %e,
                        "Multicast chunk failed, counting all tokens as failed"
                    );
                    report.failure_count += chunk.len();
                }
            }
        }

        tracing::info!(
            success = report.success_count,
            failed = report.failure_count,
            "Push multicast finished"
        );
        report
    }

    /// Execute one multicast request and tally its per-token results.
    async fn send_chunk(
        &self,
        message: &PushMessage,
        tokens: &[String],
    ) -> Result<PushReport, PushError> {
        let body = multicast_body(message, tokens);

        let response = self
            .client
            .post(&self.config.gateway_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PushError::HttpStatus(response.status().as_u16()));
        }

        let parsed: MulticastResponse = response.json().await?;

        for (token, result) in tokens.iter().zip(&parsed.results) {
            if let Some(error) = &result.error {
                tracing::warn!(token, error, "Push rejected for token");
            }
        }

        Ok(tally(&parsed.results, tokens.len()))
    }
}

/// Build the JSON body of one multicast request.
fn multicast_body(message: &PushMessage, tokens: &[String]) -> serde_json::Value {
    serde_json::json!({
        "registration_ids": tokens,
        "notification": {
            "title": message.title,
            "body": message.body,
        },
        "data": message.data,
    })
}

/// Tally per-token results into a report.
///
/// Tokens the gateway did not report on count as failed.
fn tally(results: &[TokenResult], sent: usize) -> PushReport {
    let success_count = results.iter().filter(|r| r.error.is_none()).count();
    PushReport {
        success_count,
        failure_count: sent.saturating_sub(success_count),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn result(error: Option<&str>) -> TokenResult {
        TokenResult {
            error: error.map(String::from),
        }
    }

    #[test]
    fn tally_counts_successes_and_failures() {
        let results = vec![
            result(None),
            result(Some("NotRegistered")),
            result(None),
            result(Some("InvalidToken")),
        ];
        let report = tally(&results, 4);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.failure_count, 2);
    }

    #[test]
    fn tally_treats_unreported_tokens_as_failed() {
        // Gateway answered for only 2 of 5 tokens.
        let results = vec![result(None), result(None)];
        let report = tally(&results, 5);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.failure_count, 3);
    }

    #[test]
    fn report_absorb_accumulates() {
        let mut report = PushReport {
            success_count: 3,
            failure_count: 1,
        };
        report.absorb(PushReport {
            success_count: 2,
            failure_count: 4,
        });
        assert_eq!(report.success_count, 5);
        assert_eq!(report.failure_count, 5);
    }

    #[test]
    fn multicast_body_shape() {
        let message = PushMessage {
            title: "Exam Update".to_string(),
            body: "New schedule posted".to_string(),
            data: serde_json::json!({ "kind": "exam_schedule" }),
        };
        let tokens = vec!["tok-a".to_string(), "tok-b".to_string()];

        let body = multicast_body(&message, &tokens);
        assert_eq!(body["registration_ids"].as_array().unwrap().len(), 2);
        assert_eq!(body["notification"]["title"], "Exam Update");
        assert_eq!(body["data"]["kind"], "exam_schedule");
    }

    #[test]
    fn chunking_respects_gateway_limit() {
        let tokens: Vec<String> = (0..1203).map(|i| format!("tok-{i}")).collect();
        let chunks: Vec<_> = tokens.chunks(MAX_TOKENS_PER_CALL).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 500);
        assert_eq!(chunks[1].len(), 500);
        assert_eq!(chunks[2].len(), 203);
    }
}
