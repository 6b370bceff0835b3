use amqprims_message::MessageError;
use napi::{Error, Status};

pub(crate) fn to_napi_error(context: &str, err: MessageError) -> Error {
    let status = match err {
        MessageError::Destroyed => Status::InvalidArg,
        _ => Status::GenericFailure,
    };
    Error::new(status, format!("{context}: {err}"))
}

pub(crate) fn invalid_state(message: &str) -> Error {
    Error::new(Status::InvalidArg, message.to_string())
}
