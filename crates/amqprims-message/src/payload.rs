//! Typed payloads keyed by content type, as a messaging client sends them.

use bytes::Bytes;
use tracing::warn;

use crate::error::{MessageError, Result};
use crate::host::HostValue;
use crate::message::Message;
use crate::scalar::Scalar;

pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";
pub const APPLICATION_JSON: &str = "application/json";

/// Message content as an application sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Bytes(Bytes),
    /// Carried as serialized JSON text.
    Json(serde_json::Value),
}

impl Payload {
    /// Content type written alongside this payload.
    pub fn content_type(&self) -> &'static str {
        match self {
            Payload::Text(_) => TEXT_PLAIN,
            Payload::Bytes(_) => APPLICATION_OCTET_STREAM,
            Payload::Json(_) => APPLICATION_JSON,
        }
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Text(value.to_owned())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Text(value)
    }
}

impl From<Bytes> for Payload {
    fn from(value: Bytes) -> Self {
        Payload::Bytes(value)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}

impl Message {
    /// Set the body and the matching content type.
    pub fn set_payload(&mut self, payload: Payload) -> Result<()> {
        if self.is_destroyed() {
            return Err(MessageError::Destroyed);
        }
        let content_type = payload.content_type();
        let body = match payload {
            Payload::Text(text) => HostValue::String(text),
            Payload::Bytes(bytes) => HostValue::Buffer(bytes),
            Payload::Json(value) => HostValue::String(serde_json::to_string(&value)?),
        };
        self.set_body(&body);
        self.set_content_type(content_type);
        Ok(())
    }

    /// Read the body, parsing it as JSON when the content type says so.
    ///
    /// JSON that does not parse comes back as text.
    pub fn payload(&mut self) -> Option<Payload> {
        let is_json = self.content_type() == Some(APPLICATION_JSON);
        let payload = match self.body()? {
            Scalar::String(text) if is_json => match serde_json::from_str(&text) {
                Ok(value) => Payload::Json(value),
                Err(err) => {
                    warn!(message = %self.name(), error = %err, "body is not valid JSON");
                    Payload::Text(text)
                }
            },
            Scalar::String(text) => Payload::Text(text),
            Scalar::Binary(bytes) => Payload::Bytes(bytes),
            _ => return None,
        };
        Some(payload)
    }
}
