use crate::utils::error::{ComponentError, Result};

/// Parses the completion text as JSON.
///
/// The completion service is prompted for JSON but nothing guarantees it;
/// a malformed reply is a `DecodeError`, kept distinct from transport
/// failures so policy can diverge later.
pub fn decode_output(text: &str) -> Result<serde_json::Value> {
    serde_json::from_str(text).map_err(|e| ComponentError::DecodeError {
        message: format!("{} (output: {:?})", e, excerpt(text)),
    })
}

fn excerpt(text: &str) -> String {
    const MAX_CHARS: usize = 120;
    if text.chars().count() <= MAX_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_CHARS).collect();
        format!("{}...", head)
    }
}
