//! AMQP 1.0 message content primitives for dynamic host runtimes.
//!
//! amqprims moves message content between an AMQP 1.0 typed data stream and
//! the value model of a dynamically typed host: text and binary bodies,
//! application properties, delivery annotations and time-to-live.
//!
//! # Crate Structure
//!
//! - [`data`]: typed data stream with a cursor, plus the AMQP 1.0 wire codec
//! - [`message`]: value codecs, the message container and the `Message` handle

/// Re-export data-stream types.
pub mod data {
    pub use amqprims_data::*;
}

/// Re-export message types.
pub mod message {
    pub use amqprims_message::*;
}
