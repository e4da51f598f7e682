//! Reply normalization and user-facing failure messages
//!
//! Text-generation endpoints do not agree on a response shape, and every
//! failure must end up as a string that can be shown in the conversation.
//! The functions here turn raw payloads and HTTP statuses into that text.

use serde_json::Value;

/// Shown when the model is still being loaded by the endpoint (HTTP 503)
pub const MODEL_LOADING: &str =
    "The AI model is currently loading. Please try again in a few moments.";

/// Shown when the endpoint rate-limits the caller (HTTP 429)
pub const TOO_MANY_REQUESTS: &str = "Too many requests. Please wait a moment and try again.";

/// Shown when the endpoint rejects the API key (HTTP 401)
pub const AUTH_FAILED: &str = "API authentication failed. Please check your API key.";

/// Detail used for other HTTP errors when the body carries none
pub const GENERIC_ERROR_DETAIL: &str = "Failed to get response from AI";

/// Shown when the request went out but no response came back
pub const NETWORK_ERROR: &str = "Network error. Please check your internet connection.";

/// Shown for any other failure, timeouts included
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";

/// Shown when an array payload holds no usable generated text
pub const NO_RESPONSE_GENERATED: &str = "Sorry, I could not generate a response.";

/// Shown when the payload shape is not recognized at all
pub const UNRECOGNIZED_FORMAT: &str = "Sorry, I could not understand the response format.";

/// Substituted when the reply is empty after echo stripping
pub const EMPTY_REPLY: &str = "I'm not sure how to respond to that.";

const GENERATED_TEXT: &str = "generated_text";

/// Pull the generated text out of a response payload
///
/// Shapes are tried in order: `[{generated_text}]`, `{generated_text}`,
/// then `[[{generated_text}]]`. Anything else yields a fixed fallback.
///
/// # Examples
///
/// ```
/// use chatpad::inference::extract_reply;
/// use serde_json::json;
///
/// assert_eq!(extract_reply(&json!([{"generated_text": "Hi"}])), "Hi");
/// assert_eq!(extract_reply(&json!({"generated_text": "Hi"})), "Hi");
/// assert_eq!(extract_reply(&json!([[{"generated_text": "Hi"}]])), "Hi");
/// ```
pub fn extract_reply(payload: &Value) -> String {
    if let Some(items) = payload.as_array() {
        if let Some(text) = items.first().and_then(generated_text) {
            return text.to_string();
        }
    } else if let Some(text) = generated_text(payload) {
        return text.to_string();
    }

    if let Some(text) = payload
        .as_array()
        .and_then(|items| items.first())
        .and_then(Value::as_array)
        .and_then(|inner| inner.first())
        .and_then(generated_text)
    {
        return text.to_string();
    }

    if payload.is_array() {
        NO_RESPONSE_GENERATED.to_string()
    } else {
        UNRECOGNIZED_FORMAT.to_string()
    }
}

fn generated_text(value: &Value) -> Option<&str> {
    value
        .get(GENERATED_TEXT)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

/// Remove the prompt from the front of a reply that echoes it
///
/// Replies that do not start with the prompt are returned untouched.
pub fn strip_echo(reply: &str, input: &str) -> String {
    match reply.strip_prefix(input) {
        Some(rest) => rest.trim().to_string(),
        None => reply.to_string(),
    }
}

/// Final reply text for a successful response payload
///
/// # Examples
///
/// ```
/// use chatpad::inference::{finalize_reply, EMPTY_REPLY};
/// use serde_json::json;
///
/// let payload = json!([{"generated_text": "HiI am fine"}]);
/// assert_eq!(finalize_reply(&payload, "Hi"), "I am fine");
///
/// let payload = json!([{"generated_text": "Hi"}]);
/// assert_eq!(finalize_reply(&payload, "Hi"), EMPTY_REPLY);
/// ```
pub fn finalize_reply(payload: &Value, input: &str) -> String {
    let reply = strip_echo(&extract_reply(payload), input);
    if reply.is_empty() {
        EMPTY_REPLY.to_string()
    } else {
        reply
    }
}

/// User-facing message for an HTTP error status
///
/// `detail` is the endpoint's own error text, used for statuses without a
/// dedicated message.
pub fn status_message(status: u16, detail: Option<&str>) -> String {
    match status {
        503 => MODEL_LOADING.to_string(),
        429 => TOO_MANY_REQUESTS.to_string(),
        401 => AUTH_FAILED.to_string(),
        _ => format!("Error: {}", detail.unwrap_or(GENERIC_ERROR_DETAIL)),
    }
}

/// The `error` string of an error response body, if it has one
pub fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("error")
        .and_then(Value::as_str)
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}
