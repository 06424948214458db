//! Random Index Pack: the trailing directory of partition offsets that
//! lets a reader seek straight to any partition without a linear scan.

use mxf_core::primitives::{write_u32, write_u64, Reader};
use mxf_core::{Error, Location, Result, Ul};
use mxf_klv::{read_klv, write_klv};

/// `06.0E.2B.34.02.05.01.01.0D.01.02.01.01.11.01.00`.
pub const RIP_UL: Ul = Ul::new([
    0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x11, 0x01, 0x00,
]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RipEntry {
    pub body_sid: u32,
    pub byte_offset: u64,
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct RandomIndexPack {
    pub entries: Vec<RipEntry>,
}

impl RandomIndexPack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, body_sid: u32, byte_offset: u64) {
        self.entries.push(RipEntry { body_sid, byte_offset });
    }

    /// Parse a RIP body (the value of its KLV, i.e. the entry array plus
    /// the trailing `Length:UInt32`). The trailing length is cross-checked
    /// against `klv_total_len` (key + BER length-of-length + value) and
    /// any mismatch is reported rather than silently ignored, since a
    /// wrong `Length` is the signature of a truncated or corrupted file.
    pub fn parse(body: &[u8], klv_total_len: u64, source: &str) -> Result<Self> {
        if body.len() < 4 || (body.len() - 4) % 12 != 0 {
            return Err(Error::structural(
                Location::new(0, source.to_string()),
                format!("RIP body length {} is not entries*12 + 4", body.len()),
            ));
        }
        let mut r = Reader::new(body, source);
        let entry_count = (body.len() - 4) / 12;
        let mut entries = Vec::with_capacity(entry_count);
        for _ in 0..entry_count {
            let body_sid = r.u32()?;
            let byte_offset = r.u64()?;
            entries.push(RipEntry { body_sid, byte_offset });
        }
        let declared_length = r.u32()? as u64;
        if declared_length != klv_total_len {
            return Err(Error::structural(
                Location::new(r.position() as u64, source.to_string()),
                format!("RIP declared Length {declared_length} != actual KLV length {klv_total_len}"),
            ));
        }
        Ok(Self { entries })
    }

    /// Emit the full KLV. The trailing `Length` field is computed from
    /// the emitted bytes, so callers never have to pre-compute it.
    pub fn to_klv(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for e in &self.entries {
            write_u32(&mut body, e.body_sid);
            write_u64(&mut body, e.byte_offset);
        }
        // Placeholder; patched below once the total KLV length is known.
        write_u32(&mut body, 0);

        let mut buf = Vec::new();
        write_klv(&mut buf, &RIP_UL, &body);
        let total_len = buf.len() as u32;
        let tail = &mut buf[buf.len() - 4..];
        tail.copy_from_slice(&total_len.to_be_bytes());
        buf
    }

    /// Locate and parse the RIP at the end of a complete byte buffer (a
    /// whole file read into memory, or an in-memory stand-in for one).
    /// Real file-backed readers seek the last 4 bytes first; this helper
    /// assumes the caller already has the trailing region available.
    pub fn locate(file: &[u8], source: &str) -> Result<Self> {
        if file.len() < 4 {
            return Err(Error::structural(
                Location::new(0, source.to_string()),
                "file too short to contain a RIP".to_string(),
            ));
        }
        let total_len = u32::from_be_bytes(file[file.len() - 4..].try_into().unwrap()) as usize;
        if total_len > file.len() {
            return Err(Error::structural(
                Location::new((file.len() - 4) as u64, source.to_string()),
                format!("RIP length {total_len} exceeds file size {}", file.len()),
            ));
        }
        let rip_start = file.len() - total_len;
        let mut r = Reader::new(&file[rip_start..], source);
        let klv = read_klv(&mut r)?;
        if klv.key != RIP_UL {
            return Err(Error::structural(
                Location::new(rip_start as u64, source.to_string()),
                "trailing KLV at the computed RIP offset is not a Random Index Pack".to_string(),
            ));
        }
        Self::parse(klv.value, total_len as u64, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut rip = RandomIndexPack::new();
        rip.push(0, 0);
        rip.push(1, 1024);
        rip.push(0, 4096);
        let bytes = rip.to_klv();
        let klv_total_len = bytes.len() as u64;
        let mut r = Reader::new(&bytes, "test");
        let klv = read_klv(&mut r).unwrap();
        let parsed = RandomIndexPack::parse(klv.value, klv_total_len, "test").unwrap();
        assert_eq!(parsed.entries, rip.entries);
    }

    #[test]
    fn locate_from_trailing_bytes() {
        let mut rip = RandomIndexPack::new();
        rip.push(0, 0);
        let rip_bytes = rip.to_klv();
        let mut file = vec![0xAAu8; 100];
        file.extend_from_slice(&rip_bytes);
        let found = RandomIndexPack::locate(&file, "test").unwrap();
        assert_eq!(found.entries, rip.entries);
    }

    #[test]
    fn mismatched_length_is_rejected() {
        let mut rip = RandomIndexPack::new();
        rip.push(0, 0);
        let bytes = rip.to_klv();
        let mut r = Reader::new(&bytes, "test");
        let klv = read_klv(&mut r).unwrap();
        assert!(RandomIndexPack::parse(klv.value, klv.value.len() as u64 + 1, "test").is_err());
    }
}
