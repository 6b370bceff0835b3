use amqprims_data::constructor::DESCRIBED;
use amqprims_data::{
    decode_node, decode_node_with_config, encode_node, skip_node_with_config, Atom, Data,
    DataConfig, DataError, Node,
};
use bytes::{Buf, BufMut, BytesMut};
use tracing::debug;

use crate::error::{MessageError, Result};
use crate::section::*;

/// Position of `ttl` in the header list.
const HEADER_TTL_FIELD: usize = 2;
/// Position of `to` in the properties list.
const PROPERTIES_TO_FIELD: usize = 2;
/// Position of `content-type` in the properties list.
const PROPERTIES_CONTENT_TYPE_FIELD: usize = 6;
const PROPERTIES_FIELD_COUNT: usize = 7;
const DEFAULT_PRIORITY: u8 = 4;

/// The stored parts of a message: three data regions and the scalar fields.
///
/// `instructions` holds the delivery annotations map, `properties` the
/// application properties map, and `body` a single value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageContainer {
    pub address: Option<String>,
    pub content_type: Option<String>,
    pub ttl: u32,
    pub body: Data,
    pub instructions: Data,
    pub properties: Data,
}

impl MessageContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every field and region.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Encode as an AMQP 1.0 bare message: a sequence of described sections.
    ///
    /// Sections with nothing to carry are left out. The body goes out as an
    /// `amqp-value` section.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        if self.ttl != 0 {
            let header = Node::List(vec![
                Atom::Bool(false).into(),
                Atom::UByte(DEFAULT_PRIORITY).into(),
                Atom::UInt(self.ttl).into(),
            ]);
            put_section(HEADER, &header, dst)?;
        }

        if let Some(annotations) = self.instructions.nodes().first() {
            put_section(DELIVERY_ANNOTATIONS, annotations, dst)?;
        }

        if self.address.is_some() || self.content_type.is_some() {
            let mut fields = vec![Node::Atom(Atom::Null); PROPERTIES_FIELD_COUNT];
            if let Some(address) = &self.address {
                fields[PROPERTIES_TO_FIELD] = Atom::String(address.clone()).into();
            }
            if let Some(content_type) = &self.content_type {
                fields[PROPERTIES_CONTENT_TYPE_FIELD] = Atom::Symbol(content_type.clone()).into();
            }
            put_section(PROPERTIES, &Node::List(fields), dst)?;
        }

        if let Some(properties) = self.properties.nodes().first() {
            put_section(APPLICATION_PROPERTIES, properties, dst)?;
        }

        if let Some(body) = self.body.nodes().first() {
            put_section(AMQP_VALUE, body, dst)?;
        }

        Ok(())
    }

    /// Decode a bare message with default limits.
    pub fn decode(src: &[u8]) -> Result<Self> {
        Self::decode_with_config(src, &DataConfig::default())
    }

    /// Decode a bare message.
    ///
    /// A `data` section becomes a binary body. Message annotations, sequence
    /// bodies and footers are skipped.
    pub fn decode_with_config(src: &[u8], config: &DataConfig) -> Result<Self> {
        if src.len() > config.max_encoded_size {
            return Err(DataError::TooLarge {
                size: src.len(),
                max: config.max_encoded_size,
            }
            .into());
        }

        let mut src = src;
        let mut container = Self::default();
        while src.has_remaining() {
            let code = read_descriptor(&mut src)?;
            match code {
                MESSAGE_ANNOTATIONS | AMQP_SEQUENCE | FOOTER => {
                    skip_node_with_config(&mut src, config)?;
                    debug!(section = section_name(code), "skipping message section");
                    continue;
                }
                HEADER..=FOOTER => {}
                other => return Err(MessageError::UnknownSection(other)),
            }
            let value = decode_node_with_config(&mut src, config)?;

            match code {
                HEADER => container.ttl = header_ttl(&value)?,
                DELIVERY_ANNOTATIONS => container.instructions = Data::from_nodes(vec![value]),
                PROPERTIES => {
                    let Node::List(fields) = &value else {
                        return Err(malformed(PROPERTIES, "expected a list"));
                    };
                    container.address = text_field(fields, PROPERTIES_TO_FIELD)?;
                    container.content_type = text_field(fields, PROPERTIES_CONTENT_TYPE_FIELD)?;
                }
                APPLICATION_PROPERTIES => container.properties = Data::from_nodes(vec![value]),
                AMQP_VALUE => container.body = Data::from_nodes(vec![value]),
                DATA => {
                    if !matches!(value, Node::Atom(Atom::Binary(_))) {
                        return Err(malformed(
                            DATA,
                            format!("expected binary, found {}", value.data_type()),
                        ));
                    }
                    container.body = Data::from_nodes(vec![value]);
                }
                _ => {}
            }
        }

        Ok(container)
    }
}

fn put_section(code: u64, value: &Node, dst: &mut BytesMut) -> Result<()> {
    dst.put_u8(DESCRIBED);
    encode_node(&Node::Atom(Atom::ULong(code)), dst)?;
    encode_node(value, dst)?;
    Ok(())
}

fn read_descriptor(src: &mut &[u8]) -> Result<u64> {
    if src.first() != Some(&DESCRIBED) {
        return Err(MessageError::MalformedSection {
            section: "message",
            reason: "expected a described section".to_string(),
        });
    }
    src.advance(1);

    match decode_node(src)? {
        Node::Atom(Atom::ULong(code)) => Ok(code),
        Node::Atom(Atom::Symbol(symbol)) => {
            section_code(&symbol).ok_or_else(|| MessageError::MalformedSection {
                section: "message",
                reason: format!("unknown descriptor {symbol}"),
            })
        }
        other => Err(MessageError::MalformedSection {
            section: "message",
            reason: format!("descriptor is {}", other.data_type()),
        }),
    }
}

fn header_ttl(value: &Node) -> Result<u32> {
    let Node::List(fields) = value else {
        return Err(malformed(HEADER, "expected a list"));
    };
    match fields.get(HEADER_TTL_FIELD) {
        None | Some(Node::Atom(Atom::Null)) => Ok(0),
        Some(Node::Atom(Atom::UInt(ttl))) => Ok(*ttl),
        Some(other) => Err(malformed(HEADER, format!("ttl is {}", other.data_type()))),
    }
}

fn text_field(fields: &[Node], index: usize) -> Result<Option<String>> {
    match fields.get(index) {
        None | Some(Node::Atom(Atom::Null)) => Ok(None),
        Some(Node::Atom(Atom::String(text) | Atom::Symbol(text))) => Ok(Some(text.clone())),
        Some(other) => Err(malformed(
            PROPERTIES,
            format!("field {index} is {}", other.data_type()),
        )),
    }
}

fn malformed(code: u64, reason: impl Into<String>) -> MessageError {
    MessageError::MalformedSection {
        section: section_name(code),
        reason: reason.into(),
    }
}
