use amqprims_data::DataConfig;
use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::annotations::{decode_annotations, AnnotationEntry};
use crate::body::{decode_body, encode_body};
use crate::container::MessageContainer;
use crate::error::{MessageError, Result};
use crate::host::HostValue;
use crate::properties::{decode_properties, encode_properties, Properties};
use crate::scalar::Scalar;

/// Largest time-to-live a message can hold.
pub const MAX_TTL: u32 = u32::MAX;

/// Clamp a host number to the time-to-live range.
///
/// Non-finite values and anything at or above [`MAX_TTL`] become `MAX_TTL`.
/// Other values are truncated toward zero; negative results wrap modulo 2^32
/// like an unsigned 32-bit conversion, so `-1` becomes `MAX_TTL`.
pub fn clamp_ttl(value: f64) -> u32 {
    if !value.is_finite() || value >= f64::from(MAX_TTL) {
        return MAX_TTL;
    }
    (value.trunc() as i64) as u32
}

/// A message owned by the host: its container plus the receiving link address.
///
/// Readers take `&mut self` because decoding moves the cursor of a data
/// region; every reader leaves the cursor rewound. After [`destroy`], readers
/// return their absent or default values and writers do nothing.
///
/// [`destroy`]: Message::destroy
#[derive(Debug)]
pub struct Message {
    name: String,
    container: Option<Box<MessageContainer>>,
    link_address: Option<String>,
}

impl Message {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::from_parts(MessageContainer::new(), None)
    }

    /// Wrap a container delivered on a receiving link.
    pub fn received(container: MessageContainer, link_address: impl Into<String>) -> Self {
        Self::from_parts(container, Some(link_address.into()))
    }

    /// Decode a wire message, keeping `link_address` as given.
    pub fn decode(src: &[u8], link_address: Option<String>) -> Result<Self> {
        Self::decode_with_config(src, link_address, &DataConfig::default())
    }

    pub fn decode_with_config(
        src: &[u8],
        link_address: Option<String>,
        config: &DataConfig,
    ) -> Result<Self> {
        let container = MessageContainer::decode_with_config(src, config)?;
        Ok(Self::from_parts(container, link_address))
    }

    /// The name is the container's address, so it only tells apart messages
    /// that are alive at the same time; a later message may reuse it.
    fn from_parts(container: MessageContainer, link_address: Option<String>) -> Self {
        let container = Box::new(container);
        let name = name_of(&container);
        debug!(message = %name, link_address = ?link_address, "message created");
        Self {
            name,
            container: Some(container),
            link_address,
        }
    }

    /// Encode the message in the AMQP 1.0 wire format.
    pub fn encode(&self) -> Result<Bytes> {
        let container = self.container.as_deref().ok_or(MessageError::Destroyed)?;
        let mut buf = BytesMut::new();
        container.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Diagnostic name used in log events. Unique among live messages only.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_destroyed(&self) -> bool {
        self.container.is_none()
    }

    /// The underlying container, `None` once destroyed.
    pub fn container(&self) -> Option<&MessageContainer> {
        self.container.as_deref()
    }

    pub fn container_mut(&mut self) -> Option<&mut MessageContainer> {
        self.container.as_deref_mut()
    }

    /// Text or binary body. `None` only once destroyed.
    pub fn body(&mut self) -> Option<Scalar> {
        trace!(message = %self.name, "get body");
        let container = self.container.as_deref_mut()?;
        Some(decode_body(&mut container.body))
    }

    /// Replace the body with text or a buffer; other values are ignored.
    pub fn set_body(&mut self, value: &HostValue) {
        trace!(message = %self.name, kind = value.kind(), "set body");
        if let Some(container) = self.container.as_deref_mut() {
            encode_body(&mut container.body, value);
        }
    }

    pub fn address(&self) -> Option<&str> {
        self.container.as_deref()?.address.as_deref()
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        let address = address.into();
        trace!(message = %self.name, address = %address, "set address");
        if let Some(container) = self.container.as_deref_mut() {
            container.address = Some(address);
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.container.as_deref()?.content_type.as_deref()
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        let content_type = content_type.into();
        trace!(message = %self.name, content_type = %content_type, "set content type");
        if let Some(container) = self.container.as_deref_mut() {
            container.content_type = Some(content_type);
        }
    }

    /// Address of the link the message arrived on. Survives [`Message::destroy`]
    /// only until the call; afterwards it is `None`.
    pub fn link_address(&self) -> Option<&str> {
        self.link_address.as_deref()
    }

    /// Delivery annotations with symbol keys and symbol, string or int values.
    pub fn delivery_annotations(&mut self) -> Option<Vec<AnnotationEntry>> {
        trace!(message = %self.name, "get delivery annotations");
        let container = self.container.as_deref_mut()?;
        decode_annotations(&mut container.instructions)
    }

    pub fn properties(&mut self) -> Option<Properties> {
        trace!(message = %self.name, "get properties");
        let container = self.container.as_deref_mut()?;
        decode_properties(&mut container.properties)
    }

    /// Replace the application properties, keeping the order of `entries`.
    pub fn set_properties(&mut self, entries: &[(String, HostValue)]) {
        trace!(message = %self.name, count = entries.len(), "set properties");
        if let Some(container) = self.container.as_deref_mut() {
            encode_properties(&mut container.properties, entries);
        }
    }

    /// Time-to-live, 0 once destroyed.
    pub fn ttl(&self) -> u32 {
        self.container.as_deref().map_or(0, |container| container.ttl)
    }

    /// Set the time-to-live from a host number, clamped by [`clamp_ttl`].
    pub fn set_ttl(&mut self, value: f64) {
        let ttl = clamp_ttl(value);
        trace!(message = %self.name, value, ttl, "set ttl");
        if let Some(container) = self.container.as_deref_mut() {
            container.ttl = ttl;
        }
    }

    /// Release the container and link address. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if let Some(mut container) = self.container.take() {
            container.clear();
            debug!(message = %self.name, "message destroyed");
        }
        self.link_address = None;
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Message {
    /// Deep copy with independent regions and link address.
    fn clone(&self) -> Self {
        let container = self.container.clone();
        let copy = Self {
            name: container.as_deref().map_or_else(|| self.name.clone(), name_of),
            container,
            link_address: self.link_address.clone(),
        };
        debug!(message = %self.name, copy = %copy.name, "message copied");
        copy
    }

    /// Release this message's resources, then take a deep copy of `source`.
    fn clone_from(&mut self, source: &Self) {
        self.destroy();
        self.container = source.container.clone();
        if let Some(container) = self.container.as_deref() {
            self.name = name_of(container);
        }
        self.link_address = source.link_address.clone();
        debug!(message = %self.name, source = %source.name, "message assigned");
    }
}

fn name_of(container: &MessageContainer) -> String {
    format!("{container:p}")
}

impl Drop for Message {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use amqprims_data::constructor::{
        ARRAY8, DESCRIBED, MAP8, NULL, SMALL_INT, SMALL_ULONG, STR8, SYM8, TRUE,
    };
    use bytes::BufMut;

    use super::*;
    use crate::annotations::AnnotationType;

    #[test]
    fn new_message_is_empty() {
        let mut message = Message::new();
        assert_eq!(message.body(), Some(Scalar::Binary(Bytes::new())));
        assert_eq!(message.address(), None);
        assert_eq!(message.content_type(), None);
        assert_eq!(message.link_address(), None);
        assert_eq!(message.delivery_annotations(), None);
        assert_eq!(message.properties(), None);
        assert_eq!(message.ttl(), 0);
        assert!(!message.is_destroyed());
    }

    #[test]
    fn ttl_clamps_to_u32() {
        assert_eq!(clamp_ttl(-1.0), MAX_TTL);
        assert_eq!(clamp_ttl(5_000_000_000.0), MAX_TTL);
        assert_eq!(clamp_ttl(4_294_967_295.0), MAX_TTL);
        assert_eq!(clamp_ttl(f64::NAN), MAX_TTL);
        assert_eq!(clamp_ttl(f64::INFINITY), MAX_TTL);
        assert_eq!(clamp_ttl(f64::NEG_INFINITY), MAX_TTL);
        assert_eq!(clamp_ttl(100.0), 100);
        assert_eq!(clamp_ttl(99.9), 99);
        assert_eq!(clamp_ttl(-0.5), 0);
    }

    #[test]
    fn scalar_fields_roundtrip() {
        let mut message = Message::new();
        message.set_address("amqp://localhost/topic");
        message.set_content_type("text/plain");
        message.set_ttl(100.0);
        assert_eq!(message.address(), Some("amqp://localhost/topic"));
        assert_eq!(message.content_type(), Some("text/plain"));
        assert_eq!(message.ttl(), 100);
    }

    #[test]
    fn destroyed_message_is_inert() {
        let mut message = Message::received(MessageContainer::new(), "link");
        message.set_body(&HostValue::from("x"));
        message.destroy();
        message.destroy();

        assert!(message.is_destroyed());
        assert_eq!(message.body(), None);
        assert_eq!(message.address(), None);
        assert_eq!(message.content_type(), None);
        assert_eq!(message.link_address(), None);
        assert_eq!(message.delivery_annotations(), None);
        assert_eq!(message.properties(), None);
        assert_eq!(message.ttl(), 0);

        message.set_body(&HostValue::from("y"));
        message.set_address("a");
        message.set_content_type("c");
        message.set_ttl(5.0);
        message.set_properties(&[("k".into(), HostValue::Null)]);
        assert_eq!(message.body(), None);
        assert_eq!(message.ttl(), 0);
        assert!(matches!(message.encode(), Err(MessageError::Destroyed)));
    }

    #[test]
    fn clone_is_independent() {
        let mut original = Message::received(MessageContainer::new(), "link-a");
        original.set_body(&HostValue::from("original"));
        original.set_properties(&[("k".into(), HostValue::from("v"))]);

        let mut copy = original.clone();
        copy.set_body(&HostValue::from("changed"));
        copy.set_properties(&[("other".into(), HostValue::Bool(true))]);

        assert_eq!(original.body(), Some(Scalar::String("original".into())));
        let properties = original.properties().unwrap();
        assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["k"]);
        assert_eq!(copy.link_address(), Some("link-a"));

        copy.destroy();
        assert_eq!(original.link_address(), Some("link-a"));
    }

    #[test]
    fn clone_from_replaces_target() {
        let mut source = Message::received(MessageContainer::new(), "source-link");
        source.set_body(&HostValue::from("from source"));
        source.set_ttl(7.0);

        let mut target = Message::new();
        target.set_address("stale");
        target.clone_from(&source);

        assert_eq!(target.address(), None);
        assert_eq!(target.ttl(), 7);
        assert_eq!(target.link_address(), Some("source-link"));
        assert_eq!(target.body(), Some(Scalar::String("from source".into())));

        target.set_ttl(1.0);
        assert_eq!(source.ttl(), 7);
    }

    #[test]
    fn clone_from_revives_destroyed_target() {
        let source = Message::new();
        let mut target = Message::new();
        target.destroy();
        target.clone_from(&source);
        assert!(!target.is_destroyed());
    }

    #[test]
    fn wire_roundtrip_keeps_fields() {
        let mut message = Message::new();
        message.set_address("queue/a");
        message.set_content_type("application/octet-stream");
        message.set_ttl(1500.0);
        message.set_body(&HostValue::from(vec![1u8, 2, 3]));
        message.set_properties(&[("n".into(), HostValue::Number(2.0))]);

        let wire = message.encode().unwrap();
        let mut received = Message::decode(&wire, Some("queue/a-link".into())).unwrap();

        assert_eq!(received.address(), Some("queue/a"));
        assert_eq!(received.content_type(), Some("application/octet-stream"));
        assert_eq!(received.ttl(), 1500);
        assert_eq!(
            received.body(),
            Some(Scalar::Binary(Bytes::from_static(&[1, 2, 3])))
        );
        assert_eq!(
            received.properties().unwrap().get("n"),
            Some(&Scalar::Double(2.0))
        );
        assert_eq!(received.link_address(), Some("queue/a-link"));
    }

    #[test]
    fn decode_without_link_address_leaves_it_unset() {
        let wire = Message::new().encode().unwrap();
        let received = Message::decode(&wire, None).unwrap();
        assert_eq!(received.link_address(), None);
    }

    #[test]
    fn live_messages_have_distinct_names() {
        let first = Message::new();
        let second = Message::new();
        let copy = first.clone();
        assert_ne!(first.name(), second.name());
        assert_ne!(first.name(), copy.name());
        assert!(first.name().starts_with("0x"));
    }

    #[test]
    fn unsupported_annotation_values_drop_only_their_pair() {
        let mut wire = BytesMut::new();
        wire.put_slice(&[DESCRIBED, SMALL_ULONG, 0x71, MAP8, 15, 4]);
        wire.put_slice(&[SYM8, 1, b'k', DESCRIBED, SMALL_ULONG, 0x01, NULL]);
        wire.put_slice(&[SYM8, 2, b'o', b'k', STR8, 1, b'v']);

        let mut received = Message::decode(&wire, None).unwrap();
        let annotations = received.delivery_annotations().unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].key, "ok");
        assert_eq!(annotations[0].value, "v");
        assert_eq!(annotations[0].value_type, AnnotationType::String);
    }

    #[test]
    fn unsupported_property_values_drop_only_their_pair() {
        let mut wire = BytesMut::new();
        wire.put_slice(&[DESCRIBED, SMALL_ULONG, 0x74, MAP8, 14, 4]);
        wire.put_slice(&[STR8, 1, b'a', ARRAY8, 4, 2, SMALL_INT, 1, 2]);
        wire.put_slice(&[STR8, 1, b'b', TRUE]);

        let mut received = Message::decode(&wire, None).unwrap();
        let properties = received.properties().unwrap();
        assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(properties.get("b"), Some(&Scalar::Boolean(true)));
    }
}
