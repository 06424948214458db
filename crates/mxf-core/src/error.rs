//! Error kinds shared across the MXF codec stack.
//!
//! This enum covers the six error kinds named in the design: Structural,
//! Dictionary, Semantic, Wrapping, Index and I/O. Downstream crates either
//! return this type directly or `#[from]`-convert their own local errors
//! into it at the crate boundary.

use std::fmt;

/// Result alias used throughout the MXF crates.
pub type Result<T> = std::result::Result<T, Error>;

/// A byte offset paired with the stream or file it was read from, used to
/// render the `0xHHHHHHHH in <stream-or-file>` location string required of
/// every surfaced error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub offset: u64,
    pub source: String,
}

impl Location {
    pub fn new(offset: u64, source: impl Into<String>) -> Self {
        Self {
            offset,
            source: source.into(),
        }
    }

    pub fn unknown() -> Self {
        Self {
            offset: 0,
            source: "<unknown>".to_string(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X} in {}", self.offset, self.source)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// KLV truncated, partition offset inconsistent, RIP malformed, index
    /// segment unparseable.
    #[error("structural error at {location}: {message}")]
    Structural { location: Location, message: String },

    /// Unknown UL, undefined base type, circular class hierarchy.
    #[error("dictionary error: {message}")]
    Dictionary { message: String },

    /// Required child missing, distinguished-value-where-real-value-expected,
    /// type-size mismatch.
    #[error("semantic error at {location}: {message}")]
    Semantic { location: Location, message: String },

    /// No wrapping option available, edit-rate mismatch, OP constraint
    /// violated.
    #[error("wrapping error: {message}")]
    Wrapping { message: String },

    /// Index segment size cap exceeded, or a lookup could not be resolved.
    #[error("index error: {message}")]
    Index { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn structural(location: Location, message: impl Into<String>) -> Self {
        Error::Structural {
            location,
            message: message.into(),
        }
    }

    pub fn dictionary(message: impl Into<String>) -> Self {
        Error::Dictionary {
            message: message.into(),
        }
    }

    pub fn semantic(location: Location, message: impl Into<String>) -> Self {
        Error::Semantic {
            location,
            message: message.into(),
        }
    }

    pub fn wrapping(message: impl Into<String>) -> Self {
        Error::Wrapping {
            message: message.into(),
        }
    }

    pub fn index(message: impl Into<String>) -> Self {
        Error::Index {
            message: message.into(),
        }
    }
}
