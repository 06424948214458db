//! Primitive codec for SMPTE 377M (MXF).
//!
//! This crate provides the byte-level building blocks every other MXF
//! crate is built on:
//!
//! - [`Ul`] / [`Umid`] - 16- and 32-byte identifiers
//! - [`Tag`] - 2-byte local tags
//! - [`Rational`] / [`Timestamp`] - compound value types
//! - [`ber`] - BER length encode/decode
//! - [`primitives::Reader`] - bounds-checked big-endian byte reader
//!
//! All multi-byte integers are big-endian on the wire; unlike TIFF/EXIF
//! there is no byte-order marker to track.

pub mod ber;
mod error;
pub mod primitives;
mod rational;
mod tag;
mod timestamp;
mod ul;
mod umid;
mod uuid;

pub use error::{Error, Location, Result};
pub use rational::Rational;
pub use tag::Tag;
pub use timestamp::Timestamp;
pub use ul::Ul;
pub use umid::Umid;
pub use uuid::{new_instance_uid, Uuid};
