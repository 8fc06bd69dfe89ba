//! Remote conversational backend adapter.
//!
//! Speaks the Rasa REST webhook protocol: POST `{sender, message}` and
//! receive an ordered JSON array of reply fragments.

use std::time::Duration;

use async_trait::async_trait;
use falcon_core::config::RemoteConfig;
use falcon_core::types::{Button, Category};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChatError;

/// Text used when a fragment carries neither `text` nor `custom.text`.
pub const PLACEHOLDER_TEXT: &str = "I'm processing your request...";

/// One outbound utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteRequest {
    /// Conversation id. The webhook calls this field `sender`.
    #[serde(rename = "sender")]
    pub session_id: String,
    pub message: String,
}

impl RemoteRequest {
    pub fn new(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            message: message.into(),
        }
    }
}

/// A normalized reply fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub buttons: Vec<Button>,
    pub image: Option<String>,
    /// Backend-supplied category, if it sent a recognised one.
    pub category: Option<Category>,
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
            image: None,
            category: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFragment {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    buttons: Option<Vec<RawButton>>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    custom: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawButton {
    #[serde(default)]
    title: String,
    #[serde(default)]
    payload: String,
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

/// String field of the free-form `custom` object, if present.
fn custom_field(custom: Option<&serde_json::Value>, key: &str) -> Option<String> {
    custom
        .and_then(|c| c.get(key))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

impl From<RawFragment> for Fragment {
    fn from(raw: RawFragment) -> Self {
        let custom = raw.custom.as_ref();
        let text = non_empty(raw.text)
            .or_else(|| non_empty(custom_field(custom, "text")))
            .unwrap_or_else(|| PLACEHOLDER_TEXT.to_string());
        let category = custom_field(custom, "category").and_then(|c| match c.parse::<Category>() {
            Ok(category) => Some(category),
            Err(e) => {
                debug!("Ignoring backend category: {}", e);
                None
            }
        });
        Fragment {
            text,
            buttons: raw
                .buttons
                .unwrap_or_default()
                .into_iter()
                .map(|b| Button::new(b.title, b.payload))
                .collect(),
            image: non_empty(raw.image),
            category,
        }
    }
}

/// Parse a webhook response body into fragments.
///
/// A blank body or anything that is not a JSON array of fragment objects is
/// malformed. An empty array is valid and yields no fragments.
pub fn parse_fragments(body: &str) -> Result<Vec<Fragment>, ChatError> {
    if body.trim().is_empty() {
        return Err(ChatError::RemoteMalformed("empty body".to_string()));
    }
    let raw: Vec<RawFragment> =
        serde_json::from_str(body).map_err(|e| ChatError::RemoteMalformed(e.to_string()))?;
    Ok(raw.into_iter().map(Fragment::from).collect())
}

// =============================================================================
// Backends
// =============================================================================

/// Something that can answer an utterance with reply fragments.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    async fn send(&self, request: &RemoteRequest) -> Result<Vec<Fragment>, ChatError>;
}

/// HTTP webhook backend.
pub struct HttpBackend {
    client: Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(config: &RemoteConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ChatError::RemoteUnavailable(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteBackend for HttpBackend {
    async fn send(&self, request: &RemoteRequest) -> Result<Vec<Fragment>, ChatError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::RemoteUnavailable("request timed out".to_string())
                } else if e.is_connect() {
                    ChatError::RemoteUnavailable(format!("unable to reach {}", self.endpoint))
                } else {
                    ChatError::RemoteUnavailable(format!("network error: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::RemoteUnavailable(format!("HTTP status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatError::RemoteMalformed(format!("failed to read body: {}", e)))?;
        let fragments = parse_fragments(&body)?;
        debug!(count = fragments.len(), "Remote reply received");
        Ok(fragments)
    }
}

/// Backend used when remote delivery is disabled. Every call fails, so every
/// reply is synthesized locally.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineBackend;

#[async_trait]
impl RemoteBackend for OfflineBackend {
    async fn send(&self, _request: &RemoteRequest) -> Result<Vec<Fragment>, ChatError> {
        Err(ChatError::RemoteUnavailable("remote backend disabled".to_string()))
    }
}
