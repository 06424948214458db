//! Partition Pack: the Fixed Pack that opens every partition (header,
//! body, footer) and carries the byte-offset bookkeeping a reader needs to
//! navigate the file without reading it sequentially.

use mxf_core::primitives::{write_u32, write_u64, Reader};
use mxf_core::{Error, Location, Result, Ul};
use mxf_klv::{read_klv, write_klv, Klv};

/// Which of the three partition slots this pack opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    Header,
    Body,
    Footer,
}

/// Whether the partition's metadata/index is still being appended to
/// (Open) or finished (Closed), and whether it is fully written
/// (Complete) or was abandoned mid-write (Incomplete).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStatus {
    OpenIncomplete,
    ClosedIncomplete,
    OpenComplete,
    ClosedComplete,
}

const UL_PREFIX: [u8; 13] = [
    0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01,
];

fn kind_byte(kind: PartitionKind) -> u8 {
    match kind {
        PartitionKind::Header => 0x02,
        PartitionKind::Body => 0x03,
        PartitionKind::Footer => 0x04,
    }
}

fn status_byte(status: PartitionStatus) -> u8 {
    match status {
        PartitionStatus::OpenIncomplete => 0x01,
        PartitionStatus::ClosedIncomplete => 0x02,
        PartitionStatus::OpenComplete => 0x03,
        PartitionStatus::ClosedComplete => 0x04,
    }
}

/// Build the 16-byte key identifying a Partition Pack of the given kind
/// and status.
pub fn partition_ul(kind: PartitionKind, status: PartitionStatus) -> Ul {
    let mut bytes = [0u8; 16];
    bytes[..13].copy_from_slice(&UL_PREFIX);
    bytes[13] = kind_byte(kind);
    bytes[14] = status_byte(status);
    bytes[15] = 0x00;
    Ul::new(bytes)
}

/// Recover `(kind, status)` from a key, or `None` if it isn't a Partition
/// Pack key at all.
pub fn classify_ul(ul: &Ul) -> Option<(PartitionKind, PartitionStatus)> {
    let b = ul.as_bytes();
    if b[..13] != UL_PREFIX || b[15] != 0x00 {
        return None;
    }
    let kind = match b[13] {
        0x02 => PartitionKind::Header,
        0x03 => PartitionKind::Body,
        0x04 => PartitionKind::Footer,
        _ => return None,
    };
    let status = match b[14] {
        0x01 => PartitionStatus::OpenIncomplete,
        0x02 => PartitionStatus::ClosedIncomplete,
        0x03 => PartitionStatus::OpenComplete,
        0x04 => PartitionStatus::ClosedComplete,
        _ => return None,
    };
    Some((kind, status))
}

#[derive(Debug, Clone)]
#[must_use]
pub struct PartitionPack {
    pub kind: PartitionKind,
    pub status: PartitionStatus,
    pub major_version: u16,
    pub minor_version: u16,
    pub kag_size: u32,
    pub this_partition: u64,
    pub previous_partition: u64,
    pub footer_partition: u64,
    pub header_byte_count: u64,
    pub index_byte_count: u64,
    pub index_sid: u32,
    pub body_offset: u64,
    pub body_sid: u32,
    pub operational_pattern: Ul,
    pub essence_containers: Vec<Ul>,
}

impl PartitionPack {
    pub fn new(kind: PartitionKind, status: PartitionStatus, operational_pattern: Ul) -> Self {
        Self {
            kind,
            status,
            major_version: 1,
            minor_version: 3,
            kag_size: 1,
            this_partition: 0,
            previous_partition: 0,
            footer_partition: 0,
            header_byte_count: 0,
            index_byte_count: 0,
            index_sid: 0,
            body_offset: 0,
            body_sid: 0,
            operational_pattern,
            essence_containers: Vec::new(),
        }
    }

    /// Parse a Partition Pack from an already-framed KLV (see
    /// [`mxf_klv::read_klv`]); returns `None` if the key isn't a
    /// Partition Pack at all, letting the caller treat it as "not a
    /// partition" rather than a structural error.
    pub fn from_klv(klv: &Klv, source: &str) -> Result<Option<Self>> {
        let Some((kind, status)) = classify_ul(&klv.key) else {
            return Ok(None);
        };
        let mut r = Reader::new(klv.value, source);
        let major_version = r.u16()?;
        let minor_version = r.u16()?;
        let kag_size = r.u32()?;
        let this_partition = r.u64()?;
        let previous_partition = r.u64()?;
        let footer_partition = r.u64()?;
        let header_byte_count = r.u64()?;
        let index_byte_count = r.u64()?;
        let index_sid = r.u32()?;
        let body_offset = r.u64()?;
        let body_sid = r.u32()?;
        let operational_pattern = Ul::new(r.array16()?);
        let count = r.u32()?;
        let item_size = r.u32()?;
        if count > 0 && item_size != 16 {
            return Err(Error::structural(
                Location::new(r.position() as u64, source.to_string()),
                format!("EssenceContainers batch item size {item_size} != 16"),
            ));
        }
        let mut essence_containers = Vec::with_capacity(count as usize);
        for _ in 0..count {
            essence_containers.push(Ul::new(r.array16()?));
        }
        Ok(Some(Self {
            kind,
            status,
            major_version,
            minor_version,
            kag_size,
            this_partition,
            previous_partition,
            footer_partition,
            header_byte_count,
            index_byte_count,
            index_sid,
            body_offset,
            body_sid,
            operational_pattern,
            essence_containers,
        }))
    }

    /// Emit the full KLV (key + BER length + value).
    pub fn to_klv(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&self.major_version.to_be_bytes());
        body.extend_from_slice(&self.minor_version.to_be_bytes());
        write_u32(&mut body, self.kag_size);
        write_u64(&mut body, self.this_partition);
        write_u64(&mut body, self.previous_partition);
        write_u64(&mut body, self.footer_partition);
        write_u64(&mut body, self.header_byte_count);
        write_u64(&mut body, self.index_byte_count);
        write_u32(&mut body, self.index_sid);
        write_u64(&mut body, self.body_offset);
        write_u32(&mut body, self.body_sid);
        body.extend_from_slice(self.operational_pattern.as_bytes());
        write_u32(&mut body, self.essence_containers.len() as u32);
        write_u32(&mut body, 16);
        for ec in &self.essence_containers {
            body.extend_from_slice(ec.as_bytes());
        }
        let key = partition_ul(self.kind, self.status);
        let mut buf = Vec::new();
        write_klv(&mut buf, &key, &body);
        buf
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, PartitionStatus::OpenIncomplete | PartitionStatus::OpenComplete)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.status, PartitionStatus::OpenComplete | PartitionStatus::ClosedComplete)
    }
}

/// Read one KLV and try to interpret it as a Partition Pack in one step;
/// convenience wrapper over [`read_klv`] + [`PartitionPack::from_klv`].
pub fn read_partition(r: &mut Reader, source: &str) -> Result<Option<PartitionPack>> {
    let klv = read_klv(r)?;
    PartitionPack::from_klv(&klv, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PartitionPack {
        let op = Ul::new([
            0x06, 0x0E, 0x2B, 0x34, 0x04, 0x01, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x01, 0x01, 0x00,
        ]);
        let mut p = PartitionPack::new(PartitionKind::Header, PartitionStatus::ClosedComplete, op);
        p.this_partition = 0;
        p.essence_containers.push(op);
        p
    }

    #[test]
    fn round_trip() {
        let p = sample();
        let bytes = p.to_klv();
        let mut r = Reader::new(&bytes, "test");
        let parsed = read_partition(&mut r, "test").unwrap().unwrap();
        assert_eq!(parsed.kind, PartitionKind::Header);
        assert_eq!(parsed.status, PartitionStatus::ClosedComplete);
        assert_eq!(parsed.essence_containers.len(), 1);
    }

    #[test]
    fn classify_rejects_non_partition_keys() {
        let not_a_partition = Ul::new([0u8; 16]);
        assert!(classify_ul(&not_a_partition).is_none());
    }

    #[test]
    fn status_predicates() {
        let mut p = sample();
        assert!(p.is_complete());
        assert!(!p.is_open());
        p.status = PartitionStatus::OpenIncomplete;
        assert!(p.is_open());
        assert!(!p.is_complete());
    }
}
