/// Errors that can occur while encoding or decoding a data stream.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The input ended before a complete value was read.
    #[error("truncated input (needed {needed} bytes, {available} available)")]
    Truncated { needed: usize, available: usize },

    /// The format code is not a supported AMQP constructor.
    #[error("invalid constructor 0x{0:02x}")]
    InvalidConstructor(u8),

    /// A string or symbol was not valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// A char value is not a Unicode scalar value.
    #[error("invalid char code point 0x{0:x}")]
    InvalidChar(u32),

    /// A map carries an odd number of children.
    #[error("map has an odd number of elements ({0})")]
    OddMapCount(usize),

    /// The value exceeds the size limit.
    #[error("value too large ({size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },

    /// Containers are nested deeper than allowed.
    #[error("nesting depth exceeds {0}")]
    DepthExceeded(usize),
}

pub type Result<T> = std::result::Result<T, DataError>;
