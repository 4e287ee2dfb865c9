use orderdesk_core::{InboundMessage, OutboundMessage};
use serde_json::Value;

/// Message types the widget accepts from the host.
pub const INBOUND_KINDS: [&str; 3] = ["ORDERS_RESULT", "ORDER_UPDATED", "ERROR"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed json: {0}")]
    Malformed(String),
    #[error("message is not a json object")]
    NotAnObject,
    #[error("message has no string `type` field")]
    MissingType,
    #[error("unknown message type {0}")]
    UnknownType(String),
    #[error("invalid {kind} payload: {message}")]
    InvalidPayload { kind: String, message: String },
}

/// Validate and decode one host message.
///
/// The `type` tag is checked before the payload so that unknown or
/// foreign messages sharing the channel are reported as such rather than
/// as payload errors.
pub fn decode_inbound(text: &str) -> Result<InboundMessage, DecodeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;
    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?
        .to_string();
    if !INBOUND_KINDS.contains(&kind.as_str()) {
        return Err(DecodeError::UnknownType(kind));
    }
    serde_json::from_value(value).map_err(|e| DecodeError::InvalidPayload {
        kind,
        message: e.to_string(),
    })
}

pub fn encode_outbound(message: &OutboundMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}
