mod annotation;
mod convert;
mod error;
mod message;

pub use annotation::JsAnnotation;
pub use message::Message;
