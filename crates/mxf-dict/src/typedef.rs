//! TypeDef: the universe of basic, interpretation, array, compound and enum
//! value types.

use mxf_core::Ul;

/// Sub-classes of array types (mirrors mxflib's `MDArrayClass`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayClass {
    /// No explicit count; the element count is implied by the value length.
    Implicit,
    /// An 8-byte header (count, element-size) precedes the elements.
    Explicit,
    /// A string; carries the same shape as an implicit array but is
    /// distinguished for the metadictionary and for trait binding.
    StringLike,
}

/// A named member of a Compound TypeDef.
#[derive(Debug, Clone)]
pub struct CompoundMember {
    pub name: String,
    pub type_name: String,
}

/// A named value of an Enum TypeDef.
#[derive(Debug, Clone)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone)]
pub enum TypeDef {
    /// An indivisible type with a fixed or variable byte size, bound to one
    /// of the built-in [`crate::traits::TraitKind`]s.
    Basic {
        name: String,
        ul: Option<Ul>,
        /// 0 means variable length.
        size: usize,
        trait_kind: crate::traits::TraitKind,
    },
    /// An alias for another type, inheriting its size unless overridden.
    Interpretation {
        name: String,
        ul: Option<Ul>,
        base: String,
        size_override: Option<usize>,
    },
    /// An array of `element` type.
    Array {
        name: String,
        ul: Option<Ul>,
        element: String,
        class: ArrayClass,
        fixed_count: Option<usize>,
    },
    /// A fixed sequence of named members packed at consecutive byte
    /// offsets, each with its own type.
    Compound {
        name: String,
        ul: Option<Ul>,
        members: Vec<CompoundMember>,
    },
    /// A named-value restriction of an underlying type.
    Enum {
        name: String,
        ul: Option<Ul>,
        base: String,
        values: Vec<EnumValue>,
    },
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Basic { name, .. }
            | TypeDef::Interpretation { name, .. }
            | TypeDef::Array { name, .. }
            | TypeDef::Compound { name, .. }
            | TypeDef::Enum { name, .. } => name,
        }
    }

    pub fn ul(&self) -> Option<Ul> {
        match self {
            TypeDef::Basic { ul, .. }
            | TypeDef::Interpretation { ul, .. }
            | TypeDef::Array { ul, .. }
            | TypeDef::Compound { ul, .. }
            | TypeDef::Enum { ul, .. } => *ul,
        }
    }

    /// Name of another TypeDef this one references, if any (used by the
    /// dictionary's deferred-resolution pass to detect readiness).
    pub fn depends_on(&self) -> Option<&str> {
        match self {
            TypeDef::Interpretation { base, .. } => Some(base),
            TypeDef::Array { element, .. } => Some(element),
            TypeDef::Enum { base, .. } => Some(base),
            TypeDef::Basic { .. } | TypeDef::Compound { .. } => None,
        }
    }
}

/// A raw, unresolved TypeDef record as read from a dictionary input stream
/// (see §6: "an abstract record stream" of TypeDef/ClassDef records).
pub type TypeDefRecord = TypeDef;
