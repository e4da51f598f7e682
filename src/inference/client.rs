//! HTTP client for a hosted text-generation endpoint
//!
//! One prompt in, one reply string out. Failures never escape: every error
//! path resolves to a user-facing message from [`super::response`].

use crate::config::{GenerationParameters, InferenceConfig};
use crate::error::{ChatpadError, Result};
use crate::inference::response::{
    error_detail, finalize_reply, status_message, NETWORK_ERROR, UNEXPECTED_ERROR,
};
use crate::inference::InferenceBackend;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;

/// Request body sent to the endpoint
#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParameters,
}

/// Why a request produced no usable response
#[derive(Debug, Error)]
enum RequestError {
    /// The endpoint answered with a non-success status
    #[error("endpoint returned {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// The request went out but no response arrived
    #[error("no response from endpoint: {0}")]
    Network(#[source] reqwest::Error),

    /// Anything else (timeouts, request construction, body read)
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl RequestError {
    fn from_send(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_builder() {
            Self::Unexpected(error.to_string())
        } else if error.is_connect() || error.is_request() {
            Self::Network(error)
        } else {
            Self::Unexpected(error.to_string())
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Status { status, detail } => status_message(status.as_u16(), detail.as_deref()),
            Self::Network(_) => NETWORK_ERROR.to_string(),
            Self::Unexpected(_) => UNEXPECTED_ERROR.to_string(),
        }
    }
}

/// Client for a Hugging Face style inference endpoint
///
/// Keeps an observational log of the text exchanged during its lifetime;
/// the log never feeds into requests, each call is an independent prompt.
///
/// # Examples
///
/// ```no_run
/// use chatpad::config::InferenceConfig;
/// use chatpad::inference::InferenceClient;
///
/// # async fn example() -> chatpad::error::Result<()> {
/// let client = InferenceClient::new(InferenceConfig::default())?;
/// let reply = client.send_message("Hello!").await;
/// println!("{}", reply);
/// # Ok(())
/// # }
/// ```
pub struct InferenceClient {
    client: Client,
    config: InferenceConfig,
    history: RwLock<Vec<String>>,
}

impl InferenceClient {
    /// Create a client for the configured endpoint
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use chatpad::config::InferenceConfig;
    /// use chatpad::inference::InferenceClient;
    ///
    /// let client = InferenceClient::new(InferenceConfig::default());
    /// assert!(client.is_ok());
    /// ```
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("chatpad/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChatpadError::Inference(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized inference client: url={}, authenticated={}",
            config.api_url,
            config.api_key().is_some()
        );

        Ok(Self {
            client,
            config,
            history: RwLock::new(Vec::new()),
        })
    }

    /// The configured endpoint URL
    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }

    /// Send `text` as a prompt and return the reply to show the user
    ///
    /// Always returns a displayable string: the model's reply, or a fixed
    /// message describing why there is none.
    pub async fn send_message(&self, text: &str) -> String {
        self.record(text);

        match self.request(text).await {
            Ok(payload) => {
                let reply = finalize_reply(&payload, text);
                self.record(&reply);
                reply
            }
            Err(e) => {
                tracing::error!("Inference request failed: {}", e);
                e.user_message()
            }
        }
    }

    /// Copy of the text exchanged so far, inputs and replies in call order
    pub fn history(&self) -> Vec<String> {
        self.history
            .read()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    /// Forget the exchanged text
    pub fn clear_history(&self) {
        if let Ok(mut history) = self.history.write() {
            history.clear();
        }
    }

    fn record(&self, text: &str) {
        if let Ok(mut history) = self.history.write() {
            history.push(text.to_string());
        }
    }

    async fn request(&self, text: &str) -> std::result::Result<Value, RequestError> {
        let body = GenerationRequest {
            inputs: text,
            parameters: &self.config.parameters,
        };

        let mut request = self.client.post(&self.config.api_url).json(&body);
        if let Some(key) = self.config.api_key() {
            request = request.bearer_auth(key);
        }

        tracing::debug!("Sending {} chars to {}", text.len(), self.config.api_url);
        let response = request.send().await.map_err(RequestError::from_send)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok();
            tracing::warn!(
                "Inference endpoint returned {}: {}",
                status,
                body.as_deref().unwrap_or("<unreadable body>")
            );
            return Err(RequestError::Status {
                status,
                detail: body.as_deref().and_then(error_detail),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| RequestError::Unexpected(format!("Failed to read response body: {}", e)))?;

        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::warn!("Inference response is not JSON: {}", e);
            Value::Null
        }))
    }
}

#[async_trait]
impl InferenceBackend for InferenceClient {
    async fn send_message(&self, text: &str) -> String {
        InferenceClient::send_message(self, text).await
    }

    fn history(&self) -> Vec<String> {
        InferenceClient::history(self)
    }

    fn clear_history(&self) {
        InferenceClient::clear_history(self)
    }
}
