//! 16-byte Universal Labels.

use std::fmt;

/// A 16-byte Universal Label: both a KLV key and a type identifier.
///
/// A UL may also be read as a "swapped" UUID (see [`Ul::as_uuid_swapped`]);
/// the two share a byte layout but differ in which half-octet carries the
/// SMPTE registry designator, which is why they stay distinct types here
/// rather than one alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub struct Ul(pub [u8; 16]);

impl Ul {
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Equality that ignores the version byte (octet 7) and registry
    /// version/byte-13 used for keeping a family of related ULs distinct.
    /// Commonly used to compare a Partition Pack key against its family
    /// regardless of open/closed/complete variant.
    pub fn masked_eq(&self, other: &Ul, mask: &[u8; 16]) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .zip(mask.iter())
            .all(|((a, b), m)| (a & m) == (b & m))
    }

    /// Reinterpret this UL's bytes as a UUID, swapping the halves the way
    /// SMPTE's UL/UUID conversion does (octets 0-7 and 8-15 exchanged).
    pub fn as_uuid_swapped(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.0[8..]);
        out[8..].copy_from_slice(&self.0[..8]);
        out
    }
}

impl fmt::Display for Ul {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

impl From<[u8; 16]> for Ul {
    fn from(bytes: [u8; 16]) -> Self {
        Ul(bytes)
    }
}

/// Parse a UL written as a dotted-hex literal, e.g. `"06.0E.2B.34...01.00"`.
/// Intended for tests and baseline-dictionary construction, not hot paths.
#[macro_export]
macro_rules! ul {
    ($($byte:literal)*) => {
        $crate::Ul::new([$($byte),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_dotted_hex() {
        let ul = Ul::new([
            0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x02,
            0x01, 0x00,
        ]);
        assert_eq!(ul.to_string(), "06.0E.2B.34.02.05.01.01.0D.01.02.01.01.02.01.00");
    }

    #[test]
    fn masked_eq_ignores_masked_bytes() {
        let a = Ul::new([1; 16]);
        let mut b = [1; 16];
        b[13] = 0xFF;
        let b = Ul::new(b);
        let mut mask = [0xFFu8; 16];
        mask[13] = 0x00;
        assert!(a.masked_eq(&b, &mask));
        assert!(!a.masked_eq(&b, &[0xFF; 16]));
    }

    #[test]
    fn uuid_swap_round_trips() {
        let ul = Ul::new([
            1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16,
        ]);
        let swapped = ul.as_uuid_swapped();
        let back = Ul::new(swapped).as_uuid_swapped();
        assert_eq!(back, ul.0);
    }
}
