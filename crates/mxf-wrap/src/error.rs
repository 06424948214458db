//! Errors raised by the wrapping orchestrator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no wrapping option matched stream {0} for the requested Operational Pattern")]
    NoWrappingOption(u32),

    #[error("edit rate mismatch across ganged inputs: {0} vs {1}")]
    EditRateMismatch(mxf_core::Rational, mxf_core::Rational),

    #[error("OP-Atom requires exactly one essence container, got {0}")]
    OpAtomMultipleContainers(usize),

    #[error(transparent)]
    Container(#[from] mxf_container::Error),

    #[error(transparent)]
    Essence(#[from] mxf_essence::Error),

    #[error(transparent)]
    Model(#[from] mxf_model::Error),

    #[error(transparent)]
    Core(#[from] mxf_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
