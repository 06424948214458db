//! ClassDef: the universe of container/item shapes that make up the
//! structural-metadata object model.

use mxf_core::Ul;
use mxf_klv::{KeyFormat, LenFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerType {
    /// Not a container - a simple Item.
    None,
    /// A SMPTE-336M Set: Tag/Length/Value children in any order.
    Set,
    /// A SMPTE-336M Pack: children in declared order, fixed lengths.
    Pack,
    /// An ordered or unordered batch/vector of one child type.
    Vector,
    /// A fixed-size array of one child type.
    Array,
}

/// Usage requirement for a child Item within its parent ClassDef.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Required,
    EncoderRequired,
    DecoderRequired,
    Optional,
    BestEffort,
    Dark,
    Toxic,
}

/// The kind of reference a ClassDef's value represents, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    None,
    /// Ownership-carrying; the source is responsible for the target's
    /// lifetime and cycles are forbidden.
    Strong,
    /// Lookup-only; may close a cycle, never owns.
    Weak,
    /// Like Weak, but denotes a specific named target rather than a
    /// same-kind peer (mxflib's `ClassRefTarget`).
    Target,
}

#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub ul: Option<Ul>,
    pub parent: Option<String>,
    pub container: ContainerType,
    /// For an Item: the TypeDef it carries. Unused for containers.
    pub type_name: Option<String>,
    /// Effective, ordered list of child ClassDef names, after inheritance
    /// has been applied (derived replaces base child of the same name, in
    /// place).
    pub children: Vec<String>,
    pub key_format: KeyFormat,
    pub len_format: LenFormat,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub usage: Usage,
    pub default: Option<Vec<u8>>,
    /// The "Distinguished Value" byte pattern meaning "not present".
    pub dvalue: Option<Vec<u8>>,
    pub ref_kind: RefKind,
    pub ref_target: Option<String>,
}

impl ClassDef {
    pub fn is_container(&self) -> bool {
        self.container != ContainerType::None
    }
}

/// A raw, unresolved ClassDef record before inheritance is applied.
#[derive(Debug, Clone)]
pub struct ClassDefRecord {
    pub name: String,
    pub ul: Option<Ul>,
    pub parent: Option<String>,
    pub container: ContainerType,
    pub type_name: Option<String>,
    /// Own (not inherited) children, in declaration order.
    pub own_children: Vec<String>,
    pub key_format: KeyFormat,
    pub len_format: LenFormat,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub usage: Usage,
    pub default: Option<Vec<u8>>,
    pub dvalue: Option<Vec<u8>>,
    pub ref_kind: RefKind,
    pub ref_target: Option<String>,
}

impl ClassDefRecord {
    /// A root (no-parent) record with commonly-defaulted framing options.
    pub fn item(name: impl Into<String>, ul: Option<Ul>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ul,
            parent: None,
            container: ContainerType::None,
            type_name: Some(type_name.into()),
            own_children: Vec::new(),
            key_format: KeyFormat::TwoByte,
            len_format: LenFormat::Ber,
            min_length: None,
            max_length: None,
            usage: Usage::Optional,
            default: None,
            dvalue: None,
            ref_kind: RefKind::None,
            ref_target: None,
        }
    }

    pub fn set(name: impl Into<String>, ul: Option<Ul>, children: Vec<String>) -> Self {
        Self {
            name: name.into(),
            ul,
            parent: None,
            container: ContainerType::Set,
            type_name: None,
            own_children: children,
            key_format: KeyFormat::TwoByte,
            len_format: LenFormat::Ber,
            min_length: None,
            max_length: None,
            usage: Usage::Optional,
            default: None,
            dvalue: None,
            ref_kind: RefKind::None,
            ref_target: None,
        }
    }

    pub fn pack(name: impl Into<String>, ul: Option<Ul>, children: Vec<String>) -> Self {
        Self {
            container: ContainerType::Pack,
            ..Self::set(name, ul, children)
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_ref(mut self, kind: RefKind, target: impl Into<String>) -> Self {
        self.ref_kind = kind;
        self.ref_target = Some(target.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_dvalue(mut self, dvalue: Vec<u8>) -> Self {
        self.dvalue = Some(dvalue);
        self
    }
}
