//! Conversions between JavaScript values and the message value model.

use amqprims_message::{HostValue, Properties, Scalar};
use bytes::Bytes;
use napi::{Env, JsBuffer, JsObject, JsUnknown, Result, ValueType};

/// Read a JavaScript value into a host value.
///
/// Arrays, plain objects and the remaining JS types keep only their shape;
/// the codecs skip them, so their contents are never read.
pub(crate) fn host_value(value: JsUnknown) -> Result<HostValue> {
    let host = match value.get_type()? {
        ValueType::Undefined => HostValue::Undefined,
        ValueType::Null => HostValue::Null,
        ValueType::Boolean => HostValue::Bool(value.coerce_to_bool()?.get_value()?),
        ValueType::Number => HostValue::Number(value.coerce_to_number()?.get_double()?),
        ValueType::String => HostValue::String(coerce_string(value)?),
        ValueType::Object if value.is_buffer()? => {
            let buffer = JsBuffer::try_from(value)?.into_value()?;
            HostValue::Buffer(Bytes::copy_from_slice(&buffer))
        }
        ValueType::Object if value.is_array()? => HostValue::Array(Vec::new()),
        _ => HostValue::Object(Vec::new()),
    };
    Ok(host)
}

/// `String(value)` semantics, used by the plain text setters.
pub(crate) fn coerce_string(value: JsUnknown) -> Result<String> {
    value.coerce_to_string()?.into_utf8()?.into_owned()
}

/// Enumerate an object's own keys in JS order into host entries.
pub(crate) fn host_entries(env: &Env, value: JsUnknown) -> Result<Vec<(String, HostValue)>> {
    if value.get_type()? != ValueType::Object {
        return Ok(Vec::new());
    }
    let object = JsObject::try_from(value)?;
    let names = object.get_property_names()?;
    let count = names.get_array_length()?;

    let mut entries = Vec::with_capacity(count as usize);
    for index in 0..count {
        let key = coerce_string(names.get_element::<JsUnknown>(index)?)?;
        let value: JsUnknown = object.get_property(env.create_string(&key)?)?;
        entries.push((key, host_value(value)?));
    }
    Ok(entries)
}

pub(crate) fn scalar_to_js(env: &Env, scalar: Scalar) -> Result<JsUnknown> {
    let value = match scalar {
        Scalar::Null => env.get_null()?.into_unknown(),
        Scalar::Boolean(value) => env.get_boolean(value)?.into_unknown(),
        Scalar::ShortInt(value) => env.create_int32(i32::from(value))?.into_unknown(),
        Scalar::Int(value) => env.create_int32(value)?.into_unknown(),
        Scalar::LongInt(value) => env.create_int64(value)?.into_unknown(),
        Scalar::Float(value) => env.create_double(f64::from(value))?.into_unknown(),
        Scalar::Double(value) => env.create_double(value)?.into_unknown(),
        Scalar::Byte(value) => env.create_int32(i32::from(value))?.into_unknown(),
        Scalar::Binary(bytes) => env
            .create_buffer_with_data(bytes.to_vec())?
            .into_raw()
            .into_unknown(),
        Scalar::String(text) | Scalar::Symbol(text) => env.create_string(&text)?.into_unknown(),
    };
    Ok(value)
}

pub(crate) fn properties_to_js(env: &Env, properties: Properties) -> Result<JsObject> {
    let mut object = env.create_object()?;
    for (key, value) in properties {
        let value = scalar_to_js(env, value)?;
        object.set_named_property(&key, value)?;
    }
    Ok(object)
}

pub(crate) fn undefined(env: &Env) -> Result<JsUnknown> {
    Ok(env.get_undefined()?.into_unknown())
}

