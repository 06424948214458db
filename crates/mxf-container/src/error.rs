//! Errors raised while multiplexing or partitioning a Generic Container.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Essence(#[from] mxf_essence::Error),

    #[error(transparent)]
    Core(#[from] mxf_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
