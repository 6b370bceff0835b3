use std::io::{IsTerminal, Write};

use amqprims_message::{AnnotationEntry, Message, Payload, Properties, Scalar};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::exit::{io_error, CliResult};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Everything the CLI shows about a decoded message.
#[derive(Debug, Serialize)]
pub struct MessageReport {
    pub address: Option<String>,
    pub content_type: Option<String>,
    pub ttl: u32,
    pub link_address: Option<String>,
    pub body_type: &'static str,
    pub body: serde_json::Value,
    pub properties: Option<Properties>,
    pub delivery_annotations: Option<Vec<AnnotationEntry>>,
    #[serde(skip)]
    raw_body: Vec<u8>,
}

impl MessageReport {
    pub fn from_message(message: &mut Message) -> Self {
        let (body_type, body, raw_body) = match message.payload() {
            Some(Payload::Text(text)) => {
                let raw = text.clone().into_bytes();
                ("text", serde_json::Value::String(text), raw)
            }
            Some(Payload::Json(value)) => {
                let raw = value.to_string().into_bytes();
                ("json", value, raw)
            }
            Some(Payload::Bytes(bytes)) => {
                let raw = bytes.to_vec();
                ("binary", Scalar::Binary(bytes).into(), raw)
            }
            None => ("none", serde_json::Value::Null, Vec::new()),
        };

        Self {
            address: message.address().map(str::to_owned),
            content_type: message.content_type().map(str::to_owned),
            ttl: message.ttl(),
            link_address: message.link_address().map(str::to_owned),
            body_type,
            body,
            properties: message.properties(),
            delivery_annotations: message.delivery_annotations(),
            raw_body,
        }
    }

    fn rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("address".to_string(), optional(self.address.as_deref())),
            ("content_type".to_string(), optional(self.content_type.as_deref())),
            ("ttl".to_string(), self.ttl.to_string()),
            ("link_address".to_string(), optional(self.link_address.as_deref())),
            (format!("body ({})", self.body_type), body_preview(self)),
        ];
        for (key, value) in self.properties.iter().flat_map(|properties| properties.iter()) {
            rows.push((format!("property {key}"), scalar_preview(value)));
        }
        for entry in self.delivery_annotations.iter().flatten() {
            rows.push((
                format!("annotation {}", entry.key),
                format!("{} ({})", entry.value, entry.value_type),
            ));
        }
        rows
    }
}

pub fn print_report(report: &MessageReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in report.rows() {
                table.add_row(vec![field, value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (field, value) in report.rows() {
                println!("{field}: {value}");
            }
        }
        OutputFormat::Raw => write_raw(&report.raw_body)?,
    }
    Ok(())
}

/// Write bytes to stdout as the command's output.
pub fn write_raw(data: &[u8]) -> CliResult<()> {
    write_all_to(&mut std::io::stdout().lock(), data)
        .map_err(|err| io_error("failed writing stdout", err))
}

fn write_all_to(out: &mut impl Write, data: &[u8]) -> std::io::Result<()> {
    out.write_all(data)?;
    out.flush()
}

fn optional(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn body_preview(report: &MessageReport) -> String {
    match report.body_type {
        "binary" => format!("<binary {} bytes>", report.raw_body.len()),
        "none" => "-".to_string(),
        _ => String::from_utf8_lossy(&report.raw_body).into_owned(),
    }
}

fn scalar_preview(value: &Scalar) -> String {
    match value {
        Scalar::Binary(bytes) => format!("<binary {} bytes>", bytes.len()),
        Scalar::String(text) | Scalar::Symbol(text) => text.clone(),
        other => serde_json::Value::from(other.clone()).to_string(),
    }
}
