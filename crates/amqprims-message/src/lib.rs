//! AMQP 1.0 message content exposed to a dynamic host.
//!
//! A [`Message`] owns a [`MessageContainer`] with three data regions (body,
//! delivery annotations, application properties) plus address, content type
//! and time-to-live. The codecs translate between those regions and the
//! host's value model:
//! - [`HostValue`] is what the host hands in
//! - [`Scalar`], [`Properties`] and [`AnnotationEntry`] are what it gets back
//!
//! Unsupported content is skipped rather than reported. Only whole-message
//! encoding and decoding can fail.

pub mod annotations;
pub mod body;
pub mod container;
pub mod error;
pub mod host;
pub mod message;
pub mod payload;
pub mod properties;
pub mod scalar;
pub mod section;

pub use annotations::{decode_annotations, AnnotationEntry, AnnotationType};
pub use body::{decode_body, encode_body};
pub use container::MessageContainer;
pub use error::{MessageError, Result};
pub use host::HostValue;
pub use message::{clamp_ttl, Message, MAX_TTL};
pub use payload::{Payload, APPLICATION_JSON, APPLICATION_OCTET_STREAM, TEXT_PLAIN};
pub use properties::{decode_properties, encode_properties, Properties};
pub use scalar::{decode_scalar, encode_scalar, Scalar};
