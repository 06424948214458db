//! 16-byte instance identifiers.
//!
//! MXF's `InstanceUID` is a plain 16-byte UUID; we reuse the `uuid` crate's
//! type directly rather than re-inventing generation and formatting.

pub use uuid::Uuid;

/// Generate a fresh `InstanceUID` for a newly constructed metadata object.
pub fn new_instance_uid() -> Uuid {
    Uuid::new_v4()
}
