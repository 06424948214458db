//! KLV (Key-Length-Value) framing for MXF.
//!
//! Two framing shapes are used throughout an MXF file: top-level KLVs keyed
//! by a full 16-byte UL ([`klv`]), and local-set/pack children keyed by a
//! configurable-width tag ([`local_set`]). [`fill`] provides KAG-alignment
//! padding items.

pub mod fill;
pub mod klv;
pub mod local_set;

pub use fill::{align, fill_key, KLV_FILL_V1, KLV_FILL_V2};
pub use klv::{read_klv, write_klv, write_klv_sized, Klv};
pub use local_set::{read_local_tl, write_local_tl, KeyFormat, LenFormat};
