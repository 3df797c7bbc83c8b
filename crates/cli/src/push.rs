//! Outbound notification channel (wxpusher-compatible HTTP push).
//!
//! One outbound call per run. Dispatch failures are logged by the caller
//! and never affect the run's own status or exit code.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const PUSH_ENDPOINT: &str = "https://wxpusher.zjiecode.com/api/send/message";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// contentType 2 = HTML body.
const CONTENT_TYPE_HTML: u32 = 2;
/// Success code in the push service's response envelope.
const CODE_OK: i64 = 1000;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("push request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("push rejected: code {code}, {msg}")]
    Rejected { code: i64, msg: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PushRequest<'a> {
    app_token: &'a str,
    content: &'a str,
    summary: &'a str,
    content_type: u32,
    topic_ids: Vec<&'a str>,
    verify_pay_type: u32,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    code: i64,
    #[serde(default)]
    msg: String,
}

/// Client for the push channel.
pub struct PushClient {
    client: Client,
    endpoint: String,
    app_token: String,
    topic_id: String,
}

impl PushClient {
    pub fn new(app_token: &str, topic_id: &str) -> Result<Self, PushError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: PUSH_ENDPOINT.to_string(),
            app_token: app_token.to_string(),
            topic_id: topic_id.to_string(),
        })
    }

    /// Sends one HTML notification.
    pub async fn send(&self, content: &str, summary: &str) -> Result<(), PushError> {
        let request = PushRequest {
            app_token: &self.app_token,
            content,
            summary,
            content_type: CONTENT_TYPE_HTML,
            topic_ids: vec![&self.topic_id],
            verify_pay_type: 0,
        };

        debug!(target = "lurker.push", endpoint = %self.endpoint, "dispatching notification");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: PushResponse = response.json().await?;
        if body.code != CODE_OK {
            return Err(PushError::Rejected { code: body.code, msg: body.msg });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_the_wire_field_names() {
        let request = PushRequest {
            app_token: "AT_token",
            content: "<h1>run</h1>",
            summary: "lurker run",
            content_type: CONTENT_TYPE_HTML,
            topic_ids: vec!["12345"],
            verify_pay_type: 0,
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["appToken"], "AT_token");
        assert_eq!(value["contentType"], 2);
        assert_eq!(value["topicIds"][0], "12345");
        assert_eq!(value["verifyPayType"], 0);
        assert_eq!(value["summary"], "lurker run");
    }

    #[test]
    fn response_parses_without_msg() {
        let body: PushResponse = serde_json::from_str(r#"{"code": 1000}"#).unwrap();
        assert_eq!(body.code, CODE_OK);
        assert_eq!(body.msg, "");
    }
}
