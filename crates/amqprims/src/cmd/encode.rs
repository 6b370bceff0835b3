use std::fs;
use std::io::Write;

use amqprims_data::Data;
use amqprims_message::{HostValue, Message, Payload};
use bytes::Bytes;
use tracing::{debug, info};

use crate::cmd::EncodeArgs;
use crate::exit::{io_error, message_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::write_raw;

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let properties = args
        .properties
        .iter()
        .map(|raw| parse_property(raw))
        .collect::<CliResult<Vec<_>>>()?;
    let annotations = args
        .annotations
        .iter()
        .map(|raw| split_pair("--annotation", raw))
        .collect::<CliResult<Vec<_>>>()?;

    let mut message = Message::new();
    if let Some(payload) = resolve_payload(&args)? {
        message
            .set_payload(payload)
            .map_err(|err| message_error("invalid body", err))?;
    }
    if let Some(address) = &args.address {
        message.set_address(address.as_str());
    }
    if let Some(content_type) = &args.content_type {
        message.set_content_type(content_type.as_str());
    }
    if let Some(ttl) = args.ttl {
        message.set_ttl(ttl);
    }
    message.set_properties(&properties);
    if !annotations.is_empty() {
        let container = message
            .container_mut()
            .ok_or_else(|| CliError::new(INTERNAL, "message has no container"))?;
        container.instructions = annotation_map(&annotations);
    }

    let wire = message
        .encode()
        .map_err(|err| message_error("encode failed", err))?;
    info!(message = %message.name(), size = wire.len(), "message encoded");

    match &args.out {
        Some(path) => {
            let mut file = fs::File::create(path)
                .map_err(|err| io_error(&format!("failed creating {}", path.display()), err))?;
            file.write_all(&wire)
                .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
        }
        None => write_raw(&wire)?,
    }

    Ok(SUCCESS)
}

fn resolve_payload(args: &EncodeArgs) -> CliResult<Option<Payload>> {
    if let Some(text) = &args.text {
        return Ok(Some(Payload::Text(text.clone())));
    }
    if let Some(json) = &args.json {
        let value = serde_json::from_str(json)
            .map_err(|err| CliError::usage(format!("--json is not valid JSON: {err}")))?;
        return Ok(Some(Payload::Json(value)));
    }
    if let Some(path) = &args.file {
        let bytes = fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        return Ok(Some(Payload::Bytes(Bytes::from(bytes))));
    }
    Ok(None)
}

fn split_pair<'a>(flag: &str, raw: &'a str) -> CliResult<(&'a str, &'a str)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(CliError::usage(format!("{flag} expects KEY=VALUE, got {raw:?}"))),
    }
}

fn parse_property(raw: &str) -> CliResult<(String, HostValue)> {
    let (key, value) = split_pair("--property", raw)?;
    let value = match serde_json::from_str::<serde_json::Value>(value) {
        Ok(json) => HostValue::from(json),
        Err(_) => {
            debug!(key, "property value is not JSON, using text");
            HostValue::from(value)
        }
    };
    Ok((key.to_string(), value))
}

fn annotation_map(annotations: &[(&str, &str)]) -> Data {
    let mut data = Data::new();
    data.put_map();
    data.enter();
    for (key, value) in annotations {
        data.put_symbol(*key);
        data.put_string(*value);
    }
    data.exit();
    data.rewind();
    data
}
