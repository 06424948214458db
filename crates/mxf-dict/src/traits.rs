//! TraitKind: the fixed set of built-in value traits that every Basic
//! TypeDef binds to. Replaces a polymorphic trait-object hierarchy with a
//! tagged sum, since the set of traits is closed and small.

use mxf_core::{Rational, Timestamp, Ul, Umid};

/// One of the built-in value behaviours a Basic TypeDef can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitKind {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    /// ISO 646 (7-bit ASCII) character, one byte per element.
    Iso7Char,
    /// UTF-16BE character, two bytes per element.
    Utf16Char,
    /// Opaque byte, no numeric or string interpretation.
    RawByte,
    /// An array whose elements are themselves arrays (nested Explicit
    /// array), e.g. `IndexEntryArray`.
    RawArrayOfArrays,
    /// A Compound's encoding is delegated to its member TypeDefs; this
    /// variant marks the binding point rather than doing the work itself.
    BasicCompound,
    Rational,
    TimeStamp,
    Uuid,
    Label,
    Umid,
}

impl TraitKind {
    /// Whether values of this trait are containers whose bytes must be
    /// further decoded via a Compound's member list, rather than read
    /// directly.
    pub fn handles_subdata(self) -> bool {
        matches!(self, TraitKind::BasicCompound)
    }

    /// Fixed wire size in bytes, or `None` if the trait is variable-length
    /// (strings and raw arrays).
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            TraitKind::Int8 | TraitKind::Uint8 | TraitKind::RawByte => Some(1),
            TraitKind::Int16 | TraitKind::Uint16 => Some(2),
            TraitKind::Int32 | TraitKind::Uint32 => Some(4),
            TraitKind::Int64 | TraitKind::Uint64 => Some(8),
            TraitKind::Rational => Some(8),
            TraitKind::TimeStamp => Some(Timestamp::WIRE_SIZE),
            TraitKind::Uuid | TraitKind::Label => Some(16),
            TraitKind::Umid => Some(32),
            TraitKind::Iso7Char
            | TraitKind::Utf16Char
            | TraitKind::RawArrayOfArrays
            | TraitKind::BasicCompound => None,
        }
    }
}

/// Render a raw value byte slice through its trait's `to_string` form, for
/// diagnostic dump only; not the wire encoding.
pub fn to_display_string(kind: TraitKind, bytes: &[u8]) -> String {
    match kind {
        TraitKind::Int8 => bytes.first().map(|b| (*b as i8).to_string()).unwrap_or_default(),
        TraitKind::Uint8 | TraitKind::RawByte => bytes.first().map(|b| b.to_string()).unwrap_or_default(),
        TraitKind::Int16 => bytes
            .get(..2)
            .map(|b| i16::from_be_bytes([b[0], b[1]]).to_string())
            .unwrap_or_default(),
        TraitKind::Uint16 => bytes
            .get(..2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]).to_string())
            .unwrap_or_default(),
        TraitKind::Int32 => bytes
            .get(..4)
            .map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]).to_string())
            .unwrap_or_default(),
        TraitKind::Uint32 => bytes
            .get(..4)
            .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]).to_string())
            .unwrap_or_default(),
        TraitKind::Int64 => bytes
            .get(..8)
            .map(|b| i64::from_be_bytes(b.try_into().unwrap()).to_string())
            .unwrap_or_default(),
        TraitKind::Uint64 => bytes
            .get(..8)
            .map(|b| u64::from_be_bytes(b.try_into().unwrap()).to_string())
            .unwrap_or_default(),
        TraitKind::Iso7Char => bytes.iter().map(|&b| b as char).collect(),
        TraitKind::Utf16Char => {
            let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
            String::from_utf16_lossy(&units)
        }
        TraitKind::RawArrayOfArrays | TraitKind::BasicCompound => format!("{bytes:02x?}"),
        TraitKind::Rational => bytes
            .get(..8)
            .map(|b| {
                let num = i32::from_be_bytes([b[0], b[1], b[2], b[3]]);
                let den = i32::from_be_bytes([b[4], b[5], b[6], b[7]]);
                Rational::new(num, den).to_string()
            })
            .unwrap_or_default(),
        TraitKind::TimeStamp => Timestamp::read(&mut mxf_core::primitives::Reader::new(bytes, "timestamp"))
            .map(|t| t.to_string())
            .unwrap_or_default(),
        TraitKind::Uuid | TraitKind::Label => bytes
            .get(..16)
            .map(|b| Ul::new(b.try_into().unwrap()).to_string())
            .unwrap_or_default(),
        TraitKind::Umid => bytes
            .get(..32)
            .map(|b| Umid::new(b.try_into().unwrap()).to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_is_the_only_subdata_trait() {
        assert!(TraitKind::BasicCompound.handles_subdata());
        assert!(!TraitKind::Uint32.handles_subdata());
        assert!(!TraitKind::Iso7Char.handles_subdata());
    }

    #[test]
    fn fixed_size_matches_wire_widths() {
        assert_eq!(TraitKind::Uint64.fixed_size(), Some(8));
        assert_eq!(TraitKind::Umid.fixed_size(), Some(32));
        assert_eq!(TraitKind::Iso7Char.fixed_size(), None);
    }

    #[test]
    fn display_round_trips_integers() {
        assert_eq!(to_display_string(TraitKind::Uint16, &300u16.to_be_bytes()), "300");
        assert_eq!(to_display_string(TraitKind::Iso7Char, b"OP1a"), "OP1a");
    }
}
