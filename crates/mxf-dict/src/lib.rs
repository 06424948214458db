//! Dictionary of TypeDefs and ClassDefs, keyed by name and by UL.
//!
//! A [`Dictionary`] is built from a baseline (the compiled-in structural
//! metadata classes, see [`baseline`]) merged with any caller-supplied
//! extension records, using the same deferred-resolution pass either way:
//! records may reference each other out of order, and a derived ClassDef's
//! child list is produced by splicing its own children into its parent's,
//! replacing any base child of the same name in place.

pub mod baseline;
pub mod classdef;
pub mod registry;
pub mod traits;
pub mod typedef;

pub use classdef::{ClassDef, ClassDefRecord, ContainerType, RefKind, Usage};
pub use mxf_core::{Error, Result};
pub use registry::Dictionary;
pub use traits::TraitKind;
pub use typedef::{ArrayClass, CompoundMember, EnumValue, TypeDef, TypeDefRecord};
