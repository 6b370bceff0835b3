use std::sync::Mutex;

use amqprims_message::MAX_TTL;
use napi::bindgen_prelude::{Buffer, Either, Undefined};
use napi::{Env, JsUnknown, Result};
use napi_derive::napi;
use tracing::debug;

use crate::annotation::JsAnnotation;
use crate::convert::{
    coerce_string, host_entries, host_value, properties_to_js, scalar_to_js, undefined,
};
use crate::error::{invalid_state, to_napi_error};

/// An AMQP message. Instances come from `Message.create()` or
/// `Message.decode()`; the class has no constructor.
#[napi]
pub struct Message {
    inner: Mutex<amqprims_message::Message>,
}

impl Message {
    fn from_inner(message: amqprims_message::Message) -> Self {
        Self {
            inner: Mutex::new(message),
        }
    }

    fn with_message<T>(
        &self,
        f: impl FnOnce(&mut amqprims_message::Message) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| invalid_state("message lock poisoned"))?;
        f(&mut guard)
    }
}

fn optional_string(value: Option<&str>) -> Either<String, Undefined> {
    match value {
        Some(value) => Either::A(value.to_string()),
        None => Either::B(()),
    }
}

#[napi]
impl Message {
    #[napi(factory)]
    pub fn create() -> Self {
        Self::from_inner(amqprims_message::Message::new())
    }

    /// Decode a wire message, optionally received on `linkAddress`.
    #[napi(factory)]
    pub fn decode(data: Buffer, link_address: Option<String>) -> Result<Self> {
        let message = amqprims_message::Message::decode(data.as_ref(), link_address)
            .map_err(|err| to_napi_error("decode failed", err))?;
        Ok(Self::from_inner(message))
    }

    #[napi]
    pub fn encode(&self) -> Result<Buffer> {
        self.with_message(|message| {
            let wire = message
                .encode()
                .map_err(|err| to_napi_error("encode failed", err))?;
            Ok(wire.to_vec().into())
        })
    }

    /// A string or a Buffer; an empty body reads as an empty Buffer.
    #[napi(getter, js_name = "body")]
    pub fn body(&self, env: Env) -> Result<JsUnknown> {
        self.with_message(|message| match message.body() {
            Some(body) => scalar_to_js(&env, body),
            None => undefined(&env),
        })
    }

    #[napi(setter, js_name = "body")]
    pub fn set_body(&self, value: JsUnknown) -> Result<()> {
        let value = host_value(value)?;
        self.with_message(|message| {
            message.set_body(&value);
            Ok(())
        })
    }

    #[napi(getter, js_name = "contentType")]
    pub fn content_type(&self) -> Result<Option<String>> {
        self.with_message(|message| Ok(message.content_type().map(str::to_string)))
    }

    #[napi(setter, js_name = "contentType")]
    pub fn set_content_type(&self, value: JsUnknown) -> Result<()> {
        let value = coerce_string(value)?;
        self.with_message(|message| {
            message.set_content_type(value);
            Ok(())
        })
    }

    #[napi(getter, js_name = "address")]
    pub fn address(&self) -> Result<Either<String, Undefined>> {
        self.with_message(|message| Ok(optional_string(message.address())))
    }

    #[napi(setter, js_name = "address")]
    pub fn set_address(&self, value: JsUnknown) -> Result<()> {
        let value = coerce_string(value)?;
        self.with_message(|message| {
            message.set_address(value);
            Ok(())
        })
    }

    #[napi(getter, js_name = "linkAddress")]
    pub fn link_address(&self) -> Result<Either<String, Undefined>> {
        self.with_message(|message| Ok(optional_string(message.link_address())))
    }

    #[napi(getter, js_name = "deliveryAnnotations")]
    pub fn delivery_annotations(&self) -> Result<Either<Vec<JsAnnotation>, Undefined>> {
        self.with_message(|message| {
            Ok(match message.delivery_annotations() {
                Some(entries) => Either::A(entries.into_iter().map(JsAnnotation::from).collect()),
                None => Either::B(()),
            })
        })
    }

    #[napi(getter, js_name = "properties")]
    pub fn properties(&self, env: Env) -> Result<JsUnknown> {
        self.with_message(|message| match message.properties() {
            Some(properties) => Ok(properties_to_js(&env, properties)?.into_unknown()),
            None => undefined(&env),
        })
    }

    #[napi(setter, js_name = "properties")]
    pub fn set_properties(&self, env: Env, value: JsUnknown) -> Result<()> {
        let entries = host_entries(&env, value)?;
        self.with_message(|message| {
            message.set_properties(&entries);
            Ok(())
        })
    }

    #[napi(getter, js_name = "ttl")]
    pub fn ttl(&self) -> Result<u32> {
        self.with_message(|message| Ok(message.ttl()))
    }

    /// NaN and values at or above 4294967295 store 4294967295; negative values
    /// wrap like a uint32 conversion.
    #[napi(setter, js_name = "ttl")]
    pub fn set_ttl(&self, value: JsUnknown) -> Result<()> {
        let value = value.coerce_to_number()?.get_double()?;
        self.with_message(|message| {
            message.set_ttl(value);
            Ok(())
        })
    }

    /// Release the message content. Later reads return undefined or 0.
    #[napi]
    pub fn destroy(&self) -> Result<()> {
        self.with_message(|message| {
            debug!(message = %message.name(), "destroy requested from host");
            message.destroy();
            Ok(())
        })
    }
}

#[napi]
pub fn max_ttl() -> u32 {
    MAX_TTL
}
