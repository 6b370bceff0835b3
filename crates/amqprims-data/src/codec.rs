use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::atom::{Atom, Node};
use crate::constructor::*;
use crate::data::Data;
use crate::error::{DataError, Result};

/// Default maximum encoded size accepted by [`decode_data_with_config`]: 16 MiB.
pub const DEFAULT_MAX_ENCODED_SIZE: usize = 16 * 1024 * 1024;

/// Default maximum container nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Configuration for decoding a data stream.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Maximum encoded size in bytes. Default: 16 MiB.
    pub max_encoded_size: usize,
    /// Maximum container nesting depth. Default: 32.
    pub max_depth: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            max_encoded_size: DEFAULT_MAX_ENCODED_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Encode every top-level node of a stream, in order.
pub fn encode_data(data: &Data, dst: &mut BytesMut) -> Result<()> {
    for node in data.nodes() {
        encode_node(node, dst)?;
    }
    Ok(())
}

/// Encode one node in AMQP 1.0 format.
///
/// Integers use the compact encodings where the value fits; variable-width
/// and compound values use the 1-byte size form when size and count fit.
pub fn encode_node(node: &Node, dst: &mut BytesMut) -> Result<()> {
    match node {
        Node::Atom(atom) => encode_atom(atom, dst),
        Node::List(children) if children.is_empty() => {
            dst.put_u8(LIST0);
            Ok(())
        }
        Node::List(children) => encode_compound(LIST8, LIST32, children, dst),
        Node::Map(children) => {
            if children.len() % 2 != 0 {
                return Err(DataError::OddMapCount(children.len()));
            }
            encode_compound(MAP8, MAP32, children, dst)
        }
    }
}

fn encode_atom(atom: &Atom, dst: &mut BytesMut) -> Result<()> {
    match atom {
        Atom::Null => dst.put_u8(NULL),
        Atom::Bool(true) => dst.put_u8(TRUE),
        Atom::Bool(false) => dst.put_u8(FALSE),
        Atom::UByte(value) => {
            dst.put_u8(UBYTE);
            dst.put_u8(*value);
        }
        Atom::Byte(value) => {
            dst.put_u8(BYTE);
            dst.put_i8(*value);
        }
        Atom::UShort(value) => {
            dst.put_u8(USHORT);
            dst.put_u16(*value);
        }
        Atom::Short(value) => {
            dst.put_u8(SHORT);
            dst.put_i16(*value);
        }
        Atom::UInt(0) => dst.put_u8(UINT0),
        Atom::UInt(value) => match u8::try_from(*value) {
            Ok(small) => {
                dst.put_u8(SMALL_UINT);
                dst.put_u8(small);
            }
            Err(_) => {
                dst.put_u8(UINT);
                dst.put_u32(*value);
            }
        },
        Atom::Int(value) => match i8::try_from(*value) {
            Ok(small) => {
                dst.put_u8(SMALL_INT);
                dst.put_i8(small);
            }
            Err(_) => {
                dst.put_u8(INT);
                dst.put_i32(*value);
            }
        },
        Atom::Char(value) => {
            dst.put_u8(CHAR);
            dst.put_u32(u32::from(*value));
        }
        Atom::ULong(0) => dst.put_u8(ULONG0),
        Atom::ULong(value) => match u8::try_from(*value) {
            Ok(small) => {
                dst.put_u8(SMALL_ULONG);
                dst.put_u8(small);
            }
            Err(_) => {
                dst.put_u8(ULONG);
                dst.put_u64(*value);
            }
        },
        Atom::Long(value) => match i8::try_from(*value) {
            Ok(small) => {
                dst.put_u8(SMALL_LONG);
                dst.put_i8(small);
            }
            Err(_) => {
                dst.put_u8(LONG);
                dst.put_i64(*value);
            }
        },
        Atom::Timestamp(millis) => {
            dst.put_u8(TIMESTAMP);
            dst.put_i64(*millis);
        }
        Atom::Float(value) => {
            dst.put_u8(FLOAT);
            dst.put_f32(*value);
        }
        Atom::Double(value) => {
            dst.put_u8(DOUBLE);
            dst.put_f64(*value);
        }
        Atom::Uuid(value) => {
            dst.put_u8(UUID);
            dst.put_slice(value);
        }
        Atom::Binary(value) => encode_variable(VBIN8, VBIN32, value, dst)?,
        Atom::String(value) => encode_variable(STR8, STR32, value.as_bytes(), dst)?,
        Atom::Symbol(value) => encode_variable(SYM8, SYM32, value.as_bytes(), dst)?,
        Atom::Described(raw) | Atom::Array(raw) => dst.put_slice(raw),
    }
    Ok(())
}

fn encode_variable(short: u8, long: u8, bytes: &[u8], dst: &mut BytesMut) -> Result<()> {
    if let Ok(len) = u8::try_from(bytes.len()) {
        dst.reserve(2 + bytes.len());
        dst.put_u8(short);
        dst.put_u8(len);
    } else {
        let len = u32::try_from(bytes.len()).map_err(|_| DataError::TooLarge {
            size: bytes.len(),
            max: u32::MAX as usize,
        })?;
        dst.reserve(5 + bytes.len());
        dst.put_u8(long);
        dst.put_u32(len);
    }
    dst.put_slice(bytes);
    Ok(())
}

fn encode_compound(short: u8, long: u8, children: &[Node], dst: &mut BytesMut) -> Result<()> {
    let mut body = BytesMut::new();
    for child in children {
        encode_node(child, &mut body)?;
    }

    let count = children.len();
    match (u8::try_from(body.len() + 1), u8::try_from(count)) {
        (Ok(size), Ok(count)) => {
            dst.reserve(3 + body.len());
            dst.put_u8(short);
            dst.put_u8(size);
            dst.put_u8(count);
        }
        _ => {
            let too_large = || DataError::TooLarge {
                size: body.len(),
                max: u32::MAX as usize - 4,
            };
            let size = u32::try_from(body.len() + 4).map_err(|_| too_large())?;
            let count = u32::try_from(count).map_err(|_| too_large())?;
            dst.reserve(9 + body.len());
            dst.put_u8(long);
            dst.put_u32(size);
            dst.put_u32(count);
        }
    }
    dst.put_slice(&body);
    Ok(())
}

/// Decode a whole buffer into a rewound stream with default limits.
pub fn decode_data(src: &mut impl Buf) -> Result<Data> {
    let mut nodes = Vec::new();
    while src.has_remaining() {
        nodes.push(decode_node_at(src, 0, DEFAULT_MAX_DEPTH)?);
    }
    Ok(Data::from_nodes(nodes))
}

/// Decode a whole buffer into a rewound stream, enforcing `config`.
pub fn decode_data_with_config(src: &[u8], config: &DataConfig) -> Result<Data> {
    if src.len() > config.max_encoded_size {
        return Err(DataError::TooLarge {
            size: src.len(),
            max: config.max_encoded_size,
        });
    }
    let mut src = src;
    let mut nodes = Vec::new();
    while src.has_remaining() {
        nodes.push(decode_node_at(&mut src, 0, config.max_depth)?);
    }
    Ok(Data::from_nodes(nodes))
}

/// Decode one node, consuming its bytes from `src`.
///
/// Described values and arrays are not unpacked: they decode to
/// [`Atom::Described`] and [`Atom::Array`] holding their raw encoding.
pub fn decode_node(src: &mut impl Buf) -> Result<Node> {
    decode_node_at(src, 0, DEFAULT_MAX_DEPTH)
}

/// Decode one node with the nesting limit from `config`.
pub fn decode_node_with_config(src: &mut impl Buf, config: &DataConfig) -> Result<Node> {
    decode_node_at(src, 0, config.max_depth)
}

/// Advance `src` past one encoded value without decoding it.
pub fn skip_node(src: &mut impl Buf) -> Result<()> {
    pass_encoded(src, None, 0, DEFAULT_MAX_DEPTH)
}

/// Skip one value with the nesting limit from `config`.
pub fn skip_node_with_config(src: &mut impl Buf, config: &DataConfig) -> Result<()> {
    pass_encoded(src, None, 0, config.max_depth)
}

fn ensure(src: &mut impl Buf, needed: usize) -> Result<()> {
    if src.remaining() < needed {
        return Err(DataError::Truncated {
            needed,
            available: src.remaining(),
        });
    }
    Ok(())
}

fn decode_node_at(src: &mut impl Buf, depth: usize, max_depth: usize) -> Result<Node> {
    ensure(src, 1)?;
    let code = src.get_u8();

    let atom = match code {
        DESCRIBED | ARRAY8 | ARRAY32 => {
            let mut raw = BytesMut::new();
            raw.put_u8(code);
            pass_payload(code, src, Some(&mut raw), depth, max_depth)?;
            let raw = raw.freeze();
            if code == DESCRIBED {
                Atom::Described(raw)
            } else {
                Atom::Array(raw)
            }
        }
        NULL => Atom::Null,
        TRUE => Atom::Bool(true),
        FALSE => Atom::Bool(false),
        BOOLEAN => {
            ensure(src, 1)?;
            Atom::Bool(src.get_u8() != 0)
        }
        UBYTE => {
            ensure(src, 1)?;
            Atom::UByte(src.get_u8())
        }
        BYTE => {
            ensure(src, 1)?;
            Atom::Byte(src.get_i8())
        }
        USHORT => {
            ensure(src, 2)?;
            Atom::UShort(src.get_u16())
        }
        SHORT => {
            ensure(src, 2)?;
            Atom::Short(src.get_i16())
        }
        UINT0 => Atom::UInt(0),
        SMALL_UINT => {
            ensure(src, 1)?;
            Atom::UInt(u32::from(src.get_u8()))
        }
        UINT => {
            ensure(src, 4)?;
            Atom::UInt(src.get_u32())
        }
        SMALL_INT => {
            ensure(src, 1)?;
            Atom::Int(i32::from(src.get_i8()))
        }
        INT => {
            ensure(src, 4)?;
            Atom::Int(src.get_i32())
        }
        CHAR => {
            ensure(src, 4)?;
            let raw = src.get_u32();
            Atom::Char(char::from_u32(raw).ok_or(DataError::InvalidChar(raw))?)
        }
        ULONG0 => Atom::ULong(0),
        SMALL_ULONG => {
            ensure(src, 1)?;
            Atom::ULong(u64::from(src.get_u8()))
        }
        ULONG => {
            ensure(src, 8)?;
            Atom::ULong(src.get_u64())
        }
        SMALL_LONG => {
            ensure(src, 1)?;
            Atom::Long(i64::from(src.get_i8()))
        }
        LONG => {
            ensure(src, 8)?;
            Atom::Long(src.get_i64())
        }
        TIMESTAMP => {
            ensure(src, 8)?;
            Atom::Timestamp(src.get_i64())
        }
        FLOAT => {
            ensure(src, 4)?;
            Atom::Float(src.get_f32())
        }
        DOUBLE => {
            ensure(src, 8)?;
            Atom::Double(src.get_f64())
        }
        UUID => {
            ensure(src, 16)?;
            let mut uuid = [0u8; 16];
            src.copy_to_slice(&mut uuid);
            Atom::Uuid(uuid)
        }
        VBIN8 | VBIN32 => Atom::Binary(read_variable(src, code == VBIN32)?),
        STR8 | STR32 => Atom::String(read_text(src, code == STR32)?),
        SYM8 | SYM32 => Atom::Symbol(read_text(src, code == SYM32)?),
        LIST0 => return Ok(Node::List(Vec::new())),
        LIST8 | LIST32 => {
            let children = read_compound(src, code == LIST32, depth, max_depth)?;
            return Ok(Node::List(children));
        }
        MAP8 | MAP32 => {
            let children = read_compound(src, code == MAP32, depth, max_depth)?;
            if children.len() % 2 != 0 {
                return Err(DataError::OddMapCount(children.len()));
            }
            return Ok(Node::Map(children));
        }
        other => return Err(DataError::InvalidConstructor(other)),
    };

    Ok(Node::Atom(atom))
}

// Walks one value by its encoded size, copying the bytes into `sink` when set.
fn pass_encoded(
    src: &mut impl Buf,
    mut sink: Option<&mut BytesMut>,
    depth: usize,
    max_depth: usize,
) -> Result<()> {
    ensure(src, 1)?;
    let code = src.get_u8();
    if let Some(dst) = sink.as_deref_mut() {
        dst.put_u8(code);
    }
    pass_payload(code, src, sink, depth, max_depth)
}

fn pass_payload(
    code: u8,
    src: &mut impl Buf,
    mut sink: Option<&mut BytesMut>,
    depth: usize,
    max_depth: usize,
) -> Result<()> {
    if code == DESCRIBED {
        if depth >= max_depth {
            return Err(DataError::DepthExceeded(max_depth));
        }
        pass_encoded(src, sink.as_deref_mut(), depth + 1, max_depth)?;
        return pass_encoded(src, sink, depth + 1, max_depth);
    }

    // The high nibble of a constructor fixes the width of what follows.
    let len = match code >> 4 {
        0x4 => 0,
        0x5 => 1,
        0x6 => 2,
        0x7 => 4,
        0x8 => 8,
        0x9 => 16,
        0xa | 0xc | 0xe => {
            ensure(src, 1)?;
            let size = src.get_u8();
            if let Some(dst) = sink.as_deref_mut() {
                dst.put_u8(size);
            }
            usize::from(size)
        }
        0xb | 0xd | 0xf => {
            ensure(src, 4)?;
            let size = src.get_u32();
            if let Some(dst) = sink.as_deref_mut() {
                dst.put_u32(size);
            }
            size as usize
        }
        _ => return Err(DataError::InvalidConstructor(code)),
    };

    ensure(src, len)?;
    match sink {
        Some(dst) => dst.put_slice(&src.copy_to_bytes(len)),
        None => src.advance(len),
    }
    Ok(())
}

fn read_width(src: &mut impl Buf, wide: bool) -> Result<usize> {
    if wide {
        ensure(src, 4)?;
        Ok(src.get_u32() as usize)
    } else {
        ensure(src, 1)?;
        Ok(usize::from(src.get_u8()))
    }
}

fn read_variable(src: &mut impl Buf, wide: bool) -> Result<Bytes> {
    let len = read_width(src, wide)?;
    ensure(src, len)?;
    Ok(src.copy_to_bytes(len))
}

fn read_text(src: &mut impl Buf, wide: bool) -> Result<String> {
    let bytes = read_variable(src, wide)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| DataError::InvalidUtf8)
}

fn read_compound(
    src: &mut impl Buf,
    wide: bool,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<Node>> {
    if depth >= max_depth {
        return Err(DataError::DepthExceeded(max_depth));
    }

    let size = read_width(src, wide)?;
    ensure(src, size)?;
    let mut body = src.copy_to_bytes(size);
    let count = read_width(&mut body, wide)?;

    // Every element takes at least one byte.
    if count > body.remaining() {
        return Err(DataError::Truncated {
            needed: count,
            available: body.remaining(),
        });
    }

    let mut children = Vec::with_capacity(count);
    for _ in 0..count {
        children.push(decode_node_at(&mut body, depth + 1, max_depth)?);
    }
    Ok(children)
}
