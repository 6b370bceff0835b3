use amqprims_data::{Data, DataType};
use bytes::Bytes;
use tracing::debug;

use crate::host::HostValue;
use crate::scalar::Scalar;

/// Read the body: text when the first atom is a string, otherwise its bytes.
///
/// Anything that is not a string, including an empty body, reads as binary,
/// so an empty body is an empty buffer rather than an absent value.
pub fn decode_body(data: &mut Data) -> Scalar {
    let mut data = data.scoped();
    data.next();
    match data.data_type() {
        Some(DataType::String) => Scalar::String(data.get_string().unwrap_or_default().to_owned()),
        _ => Scalar::Binary(
            data.get_binary()
                .map(|bytes| Bytes::copy_from_slice(bytes))
                .unwrap_or_default(),
        ),
    }
}

/// Replace the body with a string or a byte buffer.
///
/// Other host values leave the body unchanged; the return value reports
/// whether the body was written.
pub fn encode_body(data: &mut Data, value: &HostValue) -> bool {
    let mut data = data.scoped();
    match value {
        HostValue::String(text) => {
            data.clear();
            data.put_string(text.as_str());
        }
        HostValue::Buffer(bytes) => {
            data.clear();
            data.put_binary(bytes.clone());
        }
        other => {
            debug!(kind = other.kind(), "body accepts only text or a buffer");
            return false;
        }
    }
    true
}
