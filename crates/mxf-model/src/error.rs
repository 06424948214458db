//! Errors specific to building and resolving the structural-metadata
//! object graph. Converts into [`mxf_core::Error`] at this crate's
//! boundary so callers only ever match on one error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ClassDef '{0}' is not a Set or Pack container")]
    NotAContainer(String),

    #[error("local tag {0:#06x} is not present in the Primer")]
    UnknownTag(u16),

    #[error("unknown ClassDef '{0}'")]
    UnknownClass(String),

    #[error("required item '{0}' is missing")]
    MissingRequiredItem(String),

    #[error("dangling reference to InstanceUID {0} (no matching object in the set)")]
    DanglingReference(uuid::Uuid),

    #[error("local tag space exhausted: no tags left between {first:#06x} and {last:#06x}")]
    PrimerExhausted { first: u16, last: u16 },

    #[error(transparent)]
    Core(#[from] mxf_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for mxf_core::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Core(inner) => inner,
            other => mxf_core::Error::semantic(mxf_core::Location::unknown(), other.to_string()),
        }
    }
}
