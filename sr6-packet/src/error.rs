//! Shared error type for the codecs and the chain builder.

use std::io;

/// Errors reported by header decoding, encoding, and chain assembly.
///
/// Truncation carries the byte counts so that callers decoding a sequence of
/// headers can tell "not enough bytes" apart from a malformed fixed field.
#[derive(Debug)]
pub enum PacketError {
    /// The decode buffer is shorter than the minimum required for the
    /// header shape being parsed.
    TruncatedInput { needed: usize, available: usize },
    /// A configured address string failed to parse into its numeric form.
    InvalidAddress(String),
    /// The destination buffer could not be sized or written during encode.
    BufferError(io::Error),
}

impl std::fmt::Display for PacketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PacketError::TruncatedInput { needed, available } => {
                write!(f, "truncated input: need {needed} bytes, have {available}")
            }
            PacketError::InvalidAddress(addr) => {
                write!(f, "invalid address: {addr:?}")
            }
            PacketError::BufferError(e) => {
                write!(f, "buffer error: {e}")
            }
        }
    }
}

impl std::error::Error for PacketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PacketError::BufferError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PacketError {
    fn from(e: io::Error) -> Self {
        PacketError::BufferError(e)
    }
}
