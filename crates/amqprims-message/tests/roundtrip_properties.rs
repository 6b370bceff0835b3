//! Property tests: body and ttl values survive the accessors and the wire.

use amqprims_message::{clamp_ttl, HostValue, Message, Scalar, MAX_TTL};
use bytes::Bytes;
use proptest::prelude::*;

proptest! {
    #[test]
    fn text_body_roundtrips(text in ".*") {
        let mut message = Message::new();
        message.set_body(&HostValue::from(text.as_str()));
        prop_assert_eq!(message.body(), Some(Scalar::String(text)));
    }

    #[test]
    fn binary_body_roundtrips(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut message = Message::new();
        message.set_body(&HostValue::from(bytes.clone()));
        prop_assert_eq!(message.body(), Some(Scalar::Binary(Bytes::from(bytes))));
    }

    #[test]
    fn body_survives_the_wire(text in "[a-zA-Z0-9 ]{0,300}") {
        let mut message = Message::new();
        message.set_body(&HostValue::from(text.as_str()));
        let wire = message.encode().unwrap();
        let mut received = Message::decode(&wire, Some("link".into())).unwrap();
        prop_assert_eq!(received.body(), Some(Scalar::String(text)));
    }

    #[test]
    fn ttl_in_range_is_truncated(value in 0.0f64..4_294_967_295.0) {
        let mut message = Message::new();
        message.set_ttl(value);
        prop_assert_eq!(message.ttl(), value.trunc() as u32);
    }

    #[test]
    fn ttl_at_or_above_range_saturates(value in 4_294_967_295.0f64..1e300) {
        prop_assert_eq!(clamp_ttl(value), MAX_TTL);
    }
}
