//! Errors specific to pulling or sniffing essence data.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("essence source refused VBR index mode")]
    VbrIndexModeRefused,

    #[error("no sniffer recognised the stream header")]
    UnrecognisedFormat,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] mxf_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
