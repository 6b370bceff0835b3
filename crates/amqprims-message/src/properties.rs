//! Application properties: an ordered string-keyed map of scalars.

use amqprims_data::{Data, DataType};
use bytes::Bytes;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::host::HostValue;
use crate::scalar::{encode_scalar, scalar_at, Scalar};

/// String-keyed scalars in stream order.
///
/// Inserting a key that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, Scalar)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Scalar) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl FromIterator<(String, Scalar)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        let mut properties = Properties::new();
        for (key, value) in iter {
            properties.insert(key, value);
        }
        properties
    }
}

impl IntoIterator for Properties {
    type Item = (String, Scalar);
    type IntoIter = std::vec::IntoIter<(String, Scalar)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Read the application properties map.
///
/// Returns `None` when the region holds no map or an empty one. The map is
/// walked for as many key/value slots as it reports. A slot whose key is a
/// string yields one entry unless the value type has no property form, in
/// which case the pair is dropped. A slot whose key is not a string does not
/// move the cursor, so every remaining slot lands on the same key and the
/// rest of the map is never read.
// NOTE: whether a non-string key should stop the walk or be stepped over is
// still open with the owners of the message format; keep the stall as is.
pub fn decode_properties(data: &mut Data) -> Option<Properties> {
    let mut data = data.scoped();
    data.next();
    let size = data.get_map();
    if size == 0 {
        return None;
    }

    data.enter();
    data.next();

    let mut properties = Properties::new();
    for _ in (0..size).step_by(2) {
        if data.data_type() != Some(DataType::String) {
            continue;
        }
        let Some(key) = data.get_string().map(str::to_owned) else {
            continue;
        };

        if !data.next() {
            break;
        }

        match property_value(&data) {
            Some(value) => properties.insert(key, value),
            None => debug!(
                key = %key,
                data_type = ?data.data_type(),
                "dropping property with unsupported value type"
            ),
        }

        if !data.next() {
            break;
        }
    }

    data.exit();
    Some(properties)
}

/// A single byte and a binary atom both become a byte buffer.
fn property_value(data: &Data) -> Option<Scalar> {
    match data.data_type()? {
        DataType::Null
        | DataType::Bool
        | DataType::Short
        | DataType::Int
        | DataType::Long
        | DataType::Float
        | DataType::Double
        | DataType::Binary
        | DataType::String => scalar_at(data),
        DataType::Byte => {
            let byte = data.get_byte()?;
            Some(Scalar::Binary(Bytes::copy_from_slice(&byte.to_be_bytes())))
        }
        _ => None,
    }
}

/// Replace the application properties with `entries`, in the given order.
///
/// An empty slice leaves the region untouched. Entries whose value has no
/// atom form are left out entirely, key included.
pub fn encode_properties(data: &mut Data, entries: &[(String, HostValue)]) {
    if entries.is_empty() {
        return;
    }

    let mut data = data.scoped();
    data.clear();
    data.put_map();
    data.enter();

    for (key, value) in entries {
        if !value.is_scalar() {
            debug!(key = %key, kind = value.kind(), "skipping property with no atom form");
            continue;
        }
        data.put_string(key.as_str());
        encode_scalar(&mut data, value);
    }

    data.exit();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: Vec<(&str, HostValue)>) -> Vec<(String, HostValue)> {
        pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }

    #[test]
    fn roundtrip_keeps_host_order_and_types() {
        let mut data = Data::new();
        encode_properties(
            &mut data,
            &entries(vec![
                ("a", HostValue::from(1)),
                ("b", HostValue::from("x")),
                ("c", HostValue::Bool(true)),
                ("d", HostValue::Null),
            ]),
        );

        let properties = decode_properties(&mut data).unwrap();
        assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
        assert_eq!(properties.get("a"), Some(&Scalar::Double(1.0)));
        assert_eq!(properties.get("b"), Some(&Scalar::String("x".into())));
        assert_eq!(properties.get("c"), Some(&Scalar::Boolean(true)));
        assert_eq!(properties.get("d"), Some(&Scalar::Null));
        assert_eq!(data.data_type(), None);
    }

    #[test]
    fn unsupported_host_values_are_skipped_with_their_key() {
        let mut data = Data::new();
        encode_properties(
            &mut data,
            &entries(vec![
                ("keep", HostValue::from("v")),
                ("nested", HostValue::Object(vec![("x".into(), HostValue::Null)])),
                ("list", HostValue::Array(Vec::new())),
                ("tail", HostValue::from(vec![1u8])),
            ]),
        );

        data.next();
        assert_eq!(data.get_map(), 4);
        data.rewind();

        let properties = decode_properties(&mut data).unwrap();
        assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["keep", "tail"]);
    }

    #[test]
    fn empty_input_does_not_touch_the_stream() {
        let mut data = Data::new();
        data.put_symbol("untouched");
        data.rewind();

        encode_properties(&mut data, &[]);
        assert_eq!(data.len(), 1);
        data.next();
        assert_eq!(data.get_symbol(), Some("untouched"));
    }

    #[test]
    fn only_unsupported_entries_still_write_an_empty_map() {
        let mut data = Data::new();
        encode_properties(&mut data, &entries(vec![("o", HostValue::Object(Vec::new()))]));
        data.next();
        assert_eq!(data.data_type(), Some(DataType::Map));
        assert_eq!(data.get_map(), 0);
        data.rewind();
        assert_eq!(decode_properties(&mut data), None);
    }

    #[test]
    fn encoding_replaces_previous_map() {
        let mut data = Data::new();
        encode_properties(&mut data, &entries(vec![("old", HostValue::from(1))]));
        encode_properties(&mut data, &entries(vec![("new", HostValue::from(2))]));

        let properties = decode_properties(&mut data).unwrap();
        assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["new"]);
    }

    #[test]
    fn absent_or_non_map_region_is_absent() {
        assert_eq!(decode_properties(&mut Data::new()), None);

        let mut data = Data::new();
        data.put_string("not a map");
        assert_eq!(decode_properties(&mut data), None);
    }

    #[test]
    fn byte_and_binary_values_become_buffers() {
        let mut data = Data::new();
        data.put_map();
        data.enter();
        data.put_string("byte");
        data.put_byte(-2);
        data.put_string("bin");
        data.put_binary(vec![1u8, 2, 3]);
        data.put_string("short");
        data.put_short(12);
        data.exit();

        let properties = decode_properties(&mut data).unwrap();
        assert_eq!(
            properties.get("byte"),
            Some(&Scalar::Binary(Bytes::from_static(&[0xfe])))
        );
        assert_eq!(
            properties.get("bin"),
            Some(&Scalar::Binary(Bytes::from_static(&[1, 2, 3])))
        );
        assert_eq!(properties.get("short").and_then(Scalar::as_f64), Some(12.0));
    }

    #[test]
    fn long_and_float_values_keep_their_width() {
        let mut data = Data::new();
        data.put_map();
        data.enter();
        data.put_string("long");
        data.put_long(-9_000_000_000);
        data.put_string("float");
        data.put_float(0.5);
        data.exit();

        let properties = decode_properties(&mut data).unwrap();
        assert_eq!(
            properties.get("long"),
            Some(&Scalar::LongInt(-9_000_000_000))
        );
        assert_eq!(properties.get("float"), Some(&Scalar::Float(0.5)));
        assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["long", "float"]);
    }

    #[test]
    fn unsupported_value_drops_only_that_pair() {
        let mut data = Data::new();
        data.put_map();
        data.enter();
        data.put_string("sym");
        data.put_symbol("s");
        data.put_string("big");
        data.put_ulong(7);
        data.put_string("ok");
        data.put_int(3);
        data.exit();

        let properties = decode_properties(&mut data).unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties.get("ok"), Some(&Scalar::Int(3)));
    }

    #[test]
    fn non_string_key_stalls_the_walk() {
        let mut data = Data::new();
        data.put_map();
        data.enter();
        data.put_string("first");
        data.put_int(1);
        data.put_symbol("stuck");
        data.put_int(2);
        data.put_string("never");
        data.put_int(3);
        data.exit();

        let properties = decode_properties(&mut data).unwrap();
        assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["first"]);
        assert_eq!(data.data_type(), None);
    }

    #[test]
    fn duplicate_keys_keep_first_position() {
        let mut properties = Properties::new();
        properties.insert("a", Scalar::Int(1));
        properties.insert("b", Scalar::Int(2));
        properties.insert("a", Scalar::Int(3));
        assert_eq!(
            properties.into_iter().collect::<Vec<_>>(),
            vec![("a".to_string(), Scalar::Int(3)), ("b".to_string(), Scalar::Int(2))]
        );
    }
}
