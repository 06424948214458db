//! Generic Container element keying ([`generic`]) and the body writer
//! that multiplexes essence streams into it under a partition-boundary
//! and metadata-sharing policy ([`body`]).

pub mod body;
pub mod error;
pub mod generic;

pub use body::{BodyWriter, PartitionBoundary, SharingPolicy, WrapType};
pub use error::{Error, Result};
pub use generic::{GenericContainerWriter, ItemType, StreamId};
