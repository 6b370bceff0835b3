use std::fs;
use std::io::Read;
use std::path::Path;

use amqprims_data::DataConfig;
use amqprims_message::Message;
use tracing::info;

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, message_error, CliResult, SUCCESS};
use crate::output::{print_report, MessageReport, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = read_input(&args.input)?;

    let mut config = DataConfig::default();
    if let Some(max_size) = args.max_size {
        config.max_encoded_size = max_size;
    }

    let mut message = Message::decode_with_config(&wire, args.link_address, &config)
        .map_err(|err| message_error("decode failed", err))?;
    info!(message = %message.name(), size = wire.len(), "message decoded");

    let report = MessageReport::from_message(&mut message);
    print_report(&report, format)?;
    Ok(SUCCESS)
}

fn read_input(path: &Path) -> CliResult<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|err| io_error("failed reading stdin", err))?;
        return Ok(buf);
    }
    fs::read(path).map_err(|err| io_error(&format!("failed reading {}", path.display()), err))
}
