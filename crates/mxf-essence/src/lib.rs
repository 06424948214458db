//! Essence source abstraction: a pull interface over picture, sound and
//! data streams ([`source`], [`raw`]), plus format auto-detection for
//! external codec crates to plug sub-parsers into ([`sniffer`]).
//!
//! This crate ships no concrete essence codecs; it defines the seams
//! a wrapping pipeline pulls through.

pub mod error;
pub mod raw;
pub mod sniffer;
pub mod source;

pub use error::{Error, Result};
pub use raw::RawEssenceSource;
pub use sniffer::{FormatSniffer, SnifferRegistry};
pub use source::{Chunk, EssenceSource};
