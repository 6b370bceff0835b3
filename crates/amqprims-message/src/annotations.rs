//! Delivery annotations, projected onto the subset of entry types callers use.

use amqprims_data::{Data, DataType};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::debug;

/// Value types kept by [`decode_annotations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationType {
    Symbol,
    String,
    Int32,
}

impl AnnotationType {
    pub fn as_str(self) -> &'static str {
        match self {
            AnnotationType::Symbol => "symbol",
            AnnotationType::String => "string",
            AnnotationType::Int32 => "int32",
        }
    }

    fn of(data_type: Option<DataType>) -> Option<Self> {
        match data_type? {
            DataType::Symbol => Some(AnnotationType::Symbol),
            DataType::String => Some(AnnotationType::String),
            DataType::Int => Some(AnnotationType::Int32),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One delivery annotation. The key always comes from a symbol; an `int32`
/// value is carried as its decimal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationEntry {
    pub key: String,
    pub value: String,
    pub value_type: AnnotationType,
}

impl AnnotationEntry {
    pub const KEY_TYPE: &'static str = "symbol";

    pub fn key_type(&self) -> &'static str {
        Self::KEY_TYPE
    }
}

impl Serialize for AnnotationEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entry = serializer.serialize_struct("AnnotationEntry", 4)?;
        entry.serialize_field("key", &self.key)?;
        entry.serialize_field("key_type", Self::KEY_TYPE)?;
        entry.serialize_field("value", &self.value)?;
        entry.serialize_field("value_type", &self.value_type)?;
        entry.end()
    }
}

/// Read the delivery annotations as a list in stream order.
///
/// Only pairs with a symbol key and a symbol, string or int value are kept.
/// Returns `None`, rather than an empty list, when the region is absent, is
/// not a map, or has no pair that passes the filter. The cursor is rewound on
/// return.
pub fn decode_annotations(data: &mut Data) -> Option<Vec<AnnotationEntry>> {
    let mut data = data.scoped();

    let mut elements = 0usize;
    walk(&mut data, |_| elements += 1);
    data.rewind();

    if elements == 0 {
        return None;
    }

    let mut entries = Vec::with_capacity(elements);
    walk(&mut data, |entry| entries.push(entry));
    Some(entries)
}

/// Visit every kept pair of the map at the start of `data`.
///
/// A key with no value after it ends the walk.
fn walk(data: &mut Data, mut visit: impl FnMut(AnnotationEntry)) {
    if !data.next() || data.data_type() != Some(DataType::Map) {
        return;
    }
    if !data.enter() || !data.next() {
        return;
    }

    loop {
        let key = data.get_symbol().map(str::to_owned);
        if !data.next() {
            break;
        }

        match (key, AnnotationType::of(data.data_type())) {
            (Some(key), Some(value_type)) => {
                if let Some(value) = annotation_value(data, value_type) {
                    visit(AnnotationEntry {
                        key,
                        value,
                        value_type,
                    });
                }
            }
            (key, _) => debug!(
                key = ?key,
                value_type = ?data.data_type(),
                "excluding delivery annotation"
            ),
        }

        if !data.next() {
            break;
        }
    }
}

fn annotation_value(data: &Data, value_type: AnnotationType) -> Option<String> {
    match value_type {
        AnnotationType::Symbol => data.get_symbol().map(str::to_owned),
        AnnotationType::String => data.get_string().map(str::to_owned),
        AnnotationType::Int32 => data.get_int().map(|value| value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(fill: impl FnOnce(&mut Data)) -> Data {
        let mut data = Data::new();
        data.put_map();
        data.enter();
        fill(&mut data);
        data.exit();
        data.rewind();
        data
    }

    #[test]
    fn keeps_symbol_keyed_pairs_in_order() {
        let mut data = region(|data| {
            data.put_symbol("k1");
            data.put_symbol("s1");
            data.put_symbol("k2");
            data.put_string("v2");
            data.put_string("not-a-symbol");
            data.put_string("ignored");
        });

        let entries = decode_annotations(&mut data).unwrap();
        assert_eq!(
            entries,
            vec![
                AnnotationEntry {
                    key: "k1".into(),
                    value: "s1".into(),
                    value_type: AnnotationType::Symbol,
                },
                AnnotationEntry {
                    key: "k2".into(),
                    value: "v2".into(),
                    value_type: AnnotationType::String,
                },
            ]
        );
    }

    #[test]
    fn int_values_are_decimal_text() {
        let mut data = region(|data| {
            data.put_symbol("min");
            data.put_int(i32::MIN);
            data.put_symbol("seven");
            data.put_int(7);
        });

        let entries = decode_annotations(&mut data).unwrap();
        assert_eq!(entries[0].value, "-2147483648");
        assert_eq!(entries[0].value_type, AnnotationType::Int32);
        assert_eq!(entries[1].value, "7");
    }

    #[test]
    fn other_value_types_are_excluded() {
        let mut data = region(|data| {
            data.put_symbol("long");
            data.put_long(1);
            data.put_symbol("bin");
            data.put_binary(vec![1u8]);
            data.put_symbol("keep");
            data.put_int(1);
        });

        let entries = decode_annotations(&mut data).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "keep");
    }

    #[test]
    fn absent_empty_and_filtered_out_regions_are_absent() {
        assert_eq!(decode_annotations(&mut Data::new()), None);
        assert_eq!(decode_annotations(&mut region(|_| {})), None);

        let mut filtered = region(|data| {
            data.put_string("k");
            data.put_string("v");
        });
        assert_eq!(decode_annotations(&mut filtered), None);

        let mut not_a_map = Data::new();
        not_a_map.put_symbol("k");
        assert_eq!(decode_annotations(&mut not_a_map), None);
    }

    #[test]
    fn dangling_key_ends_the_walk() {
        // Built by hand: a well-formed map cannot end on a key.
        let mut data = Data::from_nodes(vec![amqprims_data::Node::Map(vec![
            amqprims_data::Atom::Symbol("k".into()).into(),
            amqprims_data::Atom::Int(1).into(),
            amqprims_data::Atom::Symbol("dangling".into()).into(),
        ])]);

        let entries = decode_annotations(&mut data).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "k");
    }

    #[test]
    fn repeated_reads_are_identical_and_rewound() {
        let mut data = region(|data| {
            data.put_symbol("a");
            data.put_string("b");
        });

        let first = decode_annotations(&mut data);
        assert_eq!(data.data_type(), None);
        let second = decode_annotations(&mut data);
        assert_eq!(first, second);
    }

    #[test]
    fn serializes_with_fixed_key_type() {
        let entry = AnnotationEntry {
            key: "x-opt-a".into(),
            value: "12".into(),
            value_type: AnnotationType::Int32,
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({
                "key": "x-opt-a",
                "key_type": "symbol",
                "value": "12",
                "value_type": "int32"
            })
        );
        assert_eq!(entry.key_type(), "symbol");
    }
}
