use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a message and write its wire encoding.
    Encode(EncodeArgs),
    /// Decode a wire message and print its content.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Destination address (properties `to`).
    #[arg(long)]
    pub address: Option<String>,
    /// Content type. Defaults to the type implied by the body flag.
    #[arg(long)]
    pub content_type: Option<String>,
    /// Time-to-live in milliseconds; clamped to the unsigned 32-bit range.
    #[arg(long, allow_negative_numbers = true)]
    pub ttl: Option<f64>,
    /// Text body.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub text: Option<String>,
    /// JSON body, sent as text with content type application/json.
    #[arg(long, conflicts_with_all = ["text", "file"])]
    pub json: Option<String>,
    /// Binary body read from a file.
    #[arg(long, conflicts_with_all = ["text", "json"])]
    pub file: Option<PathBuf>,
    /// Application property as KEY=JSON; a value that is not JSON is taken as text.
    #[arg(long = "property", value_name = "KEY=VALUE")]
    pub properties: Vec<String>,
    /// Delivery annotation as KEY=VALUE (symbol key, string value).
    #[arg(long = "annotation", value_name = "KEY=VALUE")]
    pub annotations: Vec<String>,
    /// Write to a file instead of stdout.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Wire message file, or `-` for stdin.
    pub input: PathBuf,
    /// Link address reported for the received message.
    #[arg(long)]
    pub link_address: Option<String>,
    /// Largest accepted encoded size in bytes.
    #[arg(long)]
    pub max_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
