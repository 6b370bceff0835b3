use amqprims_data::{Data, DataType};
use bytes::Bytes;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::host::HostValue;

/// A single typed value read from a message.
///
/// `String` and `Symbol` differ only in the stream type tag they came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Boolean(bool),
    ShortInt(i16),
    Int(i32),
    LongInt(i64),
    Float(f32),
    Double(f64),
    Byte(i8),
    Binary(Bytes),
    String(String),
    Symbol(String),
}

impl Scalar {
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Boolean(_) => "boolean",
            Scalar::ShortInt(_) => "short",
            Scalar::Int(_) => "int",
            Scalar::LongInt(_) => "long",
            Scalar::Float(_) => "float",
            Scalar::Double(_) => "double",
            Scalar::Byte(_) => "byte",
            Scalar::Binary(_) => "binary",
            Scalar::String(_) => "string",
            Scalar::Symbol(_) => "symbol",
        }
    }

    /// Numeric view of the integer and floating point variants.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::ShortInt(value) => Some(f64::from(*value)),
            Scalar::Int(value) => Some(f64::from(*value)),
            Scalar::LongInt(value) => Some(*value as f64),
            Scalar::Float(value) => Some(f64::from(*value)),
            Scalar::Double(value) => Some(*value),
            Scalar::Byte(value) => Some(f64::from(*value)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(value) | Scalar::Symbol(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Scalar::Binary(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Boolean(value) => serializer.serialize_bool(*value),
            Scalar::ShortInt(value) => serializer.serialize_i16(*value),
            Scalar::Int(value) => serializer.serialize_i32(*value),
            Scalar::LongInt(value) => serializer.serialize_i64(*value),
            Scalar::Float(value) => serializer.serialize_f32(*value),
            Scalar::Double(value) => serializer.serialize_f64(*value),
            Scalar::Byte(value) => serializer.serialize_i8(*value),
            Scalar::Binary(value) => serializer.collect_seq(value.iter()),
            Scalar::String(value) | Scalar::Symbol(value) => serializer.serialize_str(value),
        }
    }
}

impl From<Scalar> for serde_json::Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Boolean(value) => serde_json::Value::Bool(value),
            Scalar::ShortInt(value) => value.into(),
            Scalar::Int(value) => value.into(),
            Scalar::LongInt(value) => value.into(),
            Scalar::Float(value) => serde_json::Number::from_f64(f64::from(value))
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Scalar::Double(value) => serde_json::Number::from_f64(value)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Scalar::Byte(value) => value.into(),
            Scalar::Binary(value) => value.iter().map(|b| serde_json::Value::from(*b)).collect(),
            Scalar::String(value) | Scalar::Symbol(value) => serde_json::Value::String(value),
        }
    }
}

/// Advance the cursor one node and read it as a scalar.
///
/// Returns `None` at the end of the level and for types outside the scalar
/// model; callers treat that as an absent entry.
pub fn decode_scalar(data: &mut Data) -> Option<Scalar> {
    if !data.next() {
        return None;
    }
    scalar_at(data)
}

/// Read the node under the cursor as a scalar without moving.
pub(crate) fn scalar_at(data: &Data) -> Option<Scalar> {
    let data_type = data.data_type()?;
    let scalar = match data_type {
        DataType::Null => Scalar::Null,
        DataType::Bool => Scalar::Boolean(data.get_bool()?),
        DataType::Short => Scalar::ShortInt(data.get_short()?),
        DataType::Int => Scalar::Int(data.get_int()?),
        DataType::Long => Scalar::LongInt(data.get_long()?),
        DataType::Float => Scalar::Float(data.get_float()?),
        DataType::Double => Scalar::Double(data.get_double()?),
        DataType::Byte => Scalar::Byte(data.get_byte()?),
        DataType::Binary => Scalar::Binary(Bytes::copy_from_slice(data.get_binary()?)),
        DataType::String => Scalar::String(data.get_string()?.to_owned()),
        DataType::Symbol => Scalar::Symbol(data.get_symbol()?.to_owned()),
        unsupported => {
            debug!(data_type = %unsupported, "no scalar mapping for stream type");
            return None;
        }
    };
    Some(scalar)
}

/// Write one host value as a single atom after the cursor.
///
/// Every number is written as a double. Arrays and objects are skipped
/// without writing anything; the return value reports whether an atom was
/// written.
pub fn encode_scalar(data: &mut Data, value: &HostValue) -> bool {
    match value {
        HostValue::Undefined | HostValue::Null => data.put_null(),
        HostValue::Bool(value) => data.put_bool(*value),
        HostValue::Number(value) => data.put_double(*value),
        HostValue::String(value) => data.put_string(value.as_str()),
        HostValue::Buffer(value) => data.put_binary(value.clone()),
        HostValue::Array(_) | HostValue::Object(_) => {
            debug!(kind = value.kind(), "skipping host value with no atom form");
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_each_scalar_tag() {
        let mut data = Data::new();
        data.put_null();
        data.put_bool(true);
        data.put_short(-3);
        data.put_int(70000);
        data.put_long(-9_000_000_000);
        data.put_float(0.5);
        data.put_double(2.25);
        data.put_byte(-1);
        data.put_binary(vec![9u8, 8]);
        data.put_string("text");
        data.put_symbol("sym");
        data.rewind();

        let decoded: Vec<Scalar> = std::iter::from_fn(|| decode_scalar(&mut data)).collect();
        assert_eq!(
            decoded,
            vec![
                Scalar::Null,
                Scalar::Boolean(true),
                Scalar::ShortInt(-3),
                Scalar::Int(70000),
                Scalar::LongInt(-9_000_000_000),
                Scalar::Float(0.5),
                Scalar::Double(2.25),
                Scalar::Byte(-1),
                Scalar::Binary(Bytes::from_static(&[9, 8])),
                Scalar::String("text".into()),
                Scalar::Symbol("sym".into()),
            ]
        );
    }

    #[test]
    fn unsupported_tags_yield_nothing_but_advance() {
        let mut data = Data::new();
        data.put_ulong(5);
        data.put_map();
        data.put_string("after");
        data.rewind();

        assert_eq!(decode_scalar(&mut data), None);
        assert_eq!(decode_scalar(&mut data), None);
        assert_eq!(decode_scalar(&mut data), Some(Scalar::String("after".into())));
        assert_eq!(decode_scalar(&mut data), None);
    }

    #[test]
    fn every_number_is_written_as_double() {
        let mut data = Data::new();
        assert!(encode_scalar(&mut data, &HostValue::from(1)));
        assert!(encode_scalar(&mut data, &HostValue::Number(1e300)));
        data.rewind();

        assert!(data.next());
        assert_eq!(data.data_type(), Some(DataType::Double));
        assert_eq!(data.get_double(), Some(1.0));
        assert!(data.next());
        assert_eq!(data.get_double(), Some(1e300));
    }

    #[test]
    fn encodes_scalar_host_shapes() {
        let mut data = Data::new();
        for value in [
            HostValue::Undefined,
            HostValue::Null,
            HostValue::Bool(false),
            HostValue::from("s"),
            HostValue::from(vec![1u8, 2]),
        ] {
            assert!(encode_scalar(&mut data, &value));
        }
        data.rewind();

        let types: Vec<_> = std::iter::from_fn(|| data.next().then(|| data.data_type()))
            .flatten()
            .collect();
        assert_eq!(
            types,
            vec![
                DataType::Null,
                DataType::Null,
                DataType::Bool,
                DataType::String,
                DataType::Binary,
            ]
        );
    }

    #[test]
    fn other_object_shapes_write_nothing() {
        let mut data = Data::new();
        assert!(!encode_scalar(&mut data, &HostValue::Object(Vec::new())));
        assert!(!encode_scalar(&mut data, &HostValue::Array(vec![HostValue::Null])));
        assert!(data.is_empty());
    }

    #[test]
    fn json_view() {
        assert_eq!(
            serde_json::Value::from(Scalar::Binary(Bytes::from_static(&[1, 2]))),
            serde_json::json!([1, 2])
        );
        assert_eq!(
            serde_json::to_string(&Scalar::Symbol("s".into())).unwrap(),
            "\"s\""
        );
        assert_eq!(Scalar::Int(4).as_f64(), Some(4.0));
        assert_eq!(Scalar::Symbol("s".into()).as_str(), Some("s"));
        assert!(Scalar::Null.is_null());
    }
}
