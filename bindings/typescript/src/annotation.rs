use amqprims_message::AnnotationEntry;
use napi_derive::napi;

/// One delivery annotation as seen from JavaScript.
#[napi(object)]
pub struct JsAnnotation {
    pub key: String,
    #[napi(js_name = "key_type")]
    pub key_type: String,
    pub value: String,
    #[napi(js_name = "value_type")]
    pub value_type: String,
}

impl From<AnnotationEntry> for JsAnnotation {
    fn from(entry: AnnotationEntry) -> Self {
        Self {
            key_type: entry.key_type().to_string(),
            value_type: entry.value_type.to_string(),
            key: entry.key,
            value: entry.value,
        }
    }
}
