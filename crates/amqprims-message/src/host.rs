use bytes::Bytes;

/// A dynamically typed value as seen by the host runtime.
///
/// Only the scalar shapes can be written to a message. `Array` and `Object`
/// exist so callers can hand over arbitrary host values; the codecs skip them.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Buffer(Bytes),
    Array(Vec<HostValue>),
    Object(Vec<(String, HostValue)>),
}

impl HostValue {
    /// Host-side type name, for log events.
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null => "null",
            HostValue::Bool(_) => "boolean",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Buffer(_) => "buffer",
            HostValue::Array(_) => "array",
            HostValue::Object(_) => "object",
        }
    }

    /// Returns true if the value maps onto a single stream atom.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, HostValue::Array(_) | HostValue::Object(_))
    }
}

impl From<serde_json::Value> for HostValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => HostValue::Null,
            serde_json::Value::Bool(value) => HostValue::Bool(value),
            serde_json::Value::Number(number) => {
                HostValue::Number(number.as_f64().unwrap_or(f64::NAN))
            }
            serde_json::Value::String(value) => HostValue::String(value),
            serde_json::Value::Array(items) => {
                HostValue::Array(items.into_iter().map(HostValue::from).collect())
            }
            serde_json::Value::Object(fields) => HostValue::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, HostValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::String(value.to_string())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::String(value)
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Bool(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Number(value)
    }
}

impl From<i32> for HostValue {
    fn from(value: i32) -> Self {
        HostValue::Number(f64::from(value))
    }
}

impl From<Vec<u8>> for HostValue {
    fn from(value: Vec<u8>) -> Self {
        HostValue::Buffer(Bytes::from(value))
    }
}

impl From<Bytes> for HostValue {
    fn from(value: Bytes) -> Self {
        HostValue::Buffer(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_maps_onto_host_shapes() {
        let value = serde_json::json!({"n": 1, "s": "x", "b": false, "z": null, "a": [1]});
        let HostValue::Object(fields) = HostValue::from(value) else {
            panic!("expected object");
        };
        let find = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(find("n"), HostValue::Number(1.0));
        assert_eq!(find("s"), HostValue::String("x".into()));
        assert_eq!(find("b"), HostValue::Bool(false));
        assert_eq!(find("z"), HostValue::Null);
        assert_eq!(find("a"), HostValue::Array(vec![HostValue::Number(1.0)]));
    }

    #[test]
    fn containers_are_not_scalar() {
        assert!(HostValue::Undefined.is_scalar());
        assert!(HostValue::from(vec![1u8]).is_scalar());
        assert!(!HostValue::Array(Vec::new()).is_scalar());
        assert!(!HostValue::Object(Vec::new()).is_scalar());
        assert_eq!(HostValue::Object(Vec::new()).kind(), "object");
    }
}
