//! Inbound frame and payload validation.

use serde::de::DeserializeOwned;
use validator::Validate;

use rally_core::error::AppError;
use rally_core::result::AppResult;

use super::types::InboundMessage;

/// Parse a text frame into an [`InboundMessage`].
pub fn parse_inbound(raw: &str, max_bytes: usize) -> AppResult<InboundMessage> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }
    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    let message: InboundMessage = serde_json::from_str(raw)
        .map_err(|e| AppError::validation(format!("Failed to parse message: {e}")))?;
    if message.kind.is_empty() {
        return Err(AppError::validation("Message type is required"));
    }
    Ok(message)
}

/// Decode and validate an event payload.
pub fn decode_payload<T: DeserializeOwned + Validate>(value: &str) -> AppResult<T> {
    let payload: T = serde_json::from_str(value)
        .map_err(|e| AppError::validation(format!("Invalid payload: {e}")))?;
    payload.validate()?;
    Ok(payload)
}

/// Like [`decode_payload`], but an empty value yields the default payload.
pub fn decode_optional_payload<T: DeserializeOwned + Validate + Default>(
    value: &str,
) -> AppResult<T> {
    if value.trim().is_empty() {
        return Ok(T::default());
    }
    decode_payload(value)
}
