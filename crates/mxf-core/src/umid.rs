//! 32-byte Unique Material Identifiers for packages.

use std::fmt;

/// A UMID: a 12-byte Universal Label prefix identifying the value as a UMID,
/// a 1-byte length field, a 3-byte instance number, and a 16-byte material
/// number. Stored opaquely since nothing in this crate mints UMIDs from
/// machine/node identity; callers that need one supply the 32 bytes
/// directly (e.g. generated externally, or copied from a parsed file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub struct Umid(pub [u8; 32]);

impl Umid {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The 3-byte instance number at octets 13-15.
    pub fn instance_number(&self) -> [u8; 3] {
        [self.0[13], self.0[14], self.0[15]]
    }

    /// The 16-byte material number at octets 16-31.
    pub fn material_number(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out.copy_from_slice(&self.0[16..]);
        out
    }
}

impl fmt::Display for Umid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for Umid {
    fn from(bytes: [u8; 32]) -> Self {
        Umid(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_and_material_number_slices() {
        let mut bytes = [0u8; 32];
        bytes[13] = 1;
        bytes[14] = 2;
        bytes[15] = 3;
        bytes[16] = 0xAA;
        let umid = Umid::new(bytes);
        assert_eq!(umid.instance_number(), [1, 2, 3]);
        assert_eq!(umid.material_number()[0], 0xAA);
    }
}
