/// Errors that can occur when moving a message across the wire boundary.
///
/// The value codecs never fail: unsupported content is skipped. These errors
/// only come from encoding or decoding whole messages and from payload
/// serialization.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// Data-stream level error.
    #[error("data error: {0}")]
    Data(#[from] amqprims_data::DataError),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A section descriptor that is not part of the AMQP message format.
    #[error("unknown message section 0x{0:02x}")]
    UnknownSection(u64),

    /// A known section with content of the wrong shape.
    #[error("malformed {section} section: {reason}")]
    MalformedSection {
        section: &'static str,
        reason: String,
    },

    /// The message resources were already released.
    #[error("message has been destroyed")]
    Destroyed,
}

pub type Result<T> = std::result::Result<T, MessageError>;
