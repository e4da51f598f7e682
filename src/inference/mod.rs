//! Inference endpoint access
//!
//! [`InferenceBackend`] is the seam the chat flow talks to; [`InferenceClient`]
//! is the HTTP implementation for Hugging Face style text-generation
//! endpoints.

use async_trait::async_trait;

pub mod client;
pub mod response;

pub use client::InferenceClient;
pub use response::{
    error_detail, extract_reply, finalize_reply, status_message, strip_echo, AUTH_FAILED,
    EMPTY_REPLY, GENERIC_ERROR_DETAIL, MODEL_LOADING, NETWORK_ERROR, NO_RESPONSE_GENERATED,
    TOO_MANY_REQUESTS, UNEXPECTED_ERROR, UNRECOGNIZED_FORMAT,
};

/// Something that turns a user utterance into a reply string
///
/// Implementations must not fail: every failure is expressed as the
/// returned text.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use chatpad::inference::InferenceBackend;
///
/// struct Echo;
///
/// #[async_trait]
/// impl InferenceBackend for Echo {
///     async fn send_message(&self, text: &str) -> String {
///         format!("You said: {}", text)
///     }
/// }
/// ```
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Produce the reply for one user message
    async fn send_message(&self, text: &str) -> String;

    /// Text exchanged so far, in call order
    fn history(&self) -> Vec<String> {
        Vec::new()
    }

    /// Forget the exchanged text
    fn clear_history(&self) {}
}
