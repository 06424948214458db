//! IndexTableSegment: the per-edit-unit-range pack describing how to
//! convert an edit unit and logical stream number into a byte offset
//! within a Generic Container.
//!
//! Two wire shapes exist. The current (v11) shape carries a signed
//! `PosTableIndex` per [`DeltaEntry`] and a `PosTableArray` per
//! [`IndexEntry`] for subsample-accurate audio alignment. An older (v10)
//! shape carries a boolean `Reorder` flag instead of `PosTableIndex` and
//! has no PosTableArray at all. Both parse into the same in-memory
//! [`DeltaEntry`]/[`IndexEntry`], mapping v10's `Reorder = true` onto
//! `PosTableIndex = -1` (temporal reordering applies) and `false` onto `0`
//! (no fractional offset) - lookup logic downstream never needs to know
//! which shape a segment was read from.

use mxf_core::primitives::{write_i32, write_u32, write_u64, Reader};
use mxf_core::{Error, Location, Rational, Result, Ul};

/// Current (v11) IndexTableSegment key.
pub const INDEX_TABLE_SEGMENT_UL_V11: Ul = Ul::new([
    0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x10, 0x01, 0x00,
]);

/// Legacy (v10) IndexTableSegment key, predating PosTableIndex/PosTableArray.
pub const INDEX_TABLE_SEGMENT_UL_V10: Ul = Ul::new([
    0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x0F, 0x01, 0x00,
]);

/// Which wire shape to emit; a reader accepts both transparently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireVersion {
    #[default]
    V11,
    V10,
}

/// One logical stream's positioning within a Generic Container element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaEntry {
    /// `-1` flags temporal reordering for this stream; `0` means no
    /// fractional offset; `> 0` indexes a [`IndexEntry::pos_table`] entry.
    pub pos_table_index: i8,
    pub slice_number: u8,
    pub element_delta: u32,
}

/// One edit unit's explicit VBR index entry.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub temporal_offset: i8,
    pub key_frame_offset: i8,
    pub flags: u8,
    pub stream_offset: u64,
    /// NSL entries: byte offset from `stream_offset` to the start of each
    /// slice beyond slice 0.
    pub slice_offsets: Vec<u32>,
    /// NPE entries: fractional sample offsets for subsample-accurate
    /// audio alignment.
    pub pos_table: Vec<Rational>,
}

impl IndexEntry {
    /// `11 + 4*NSL + 8*NPE`, the wire size this entry occupies.
    pub fn wire_size(&self) -> usize {
        11 + 4 * self.slice_offsets.len() + 8 * self.pos_table.len()
    }
}

#[derive(Debug, Clone)]
#[must_use]
pub struct IndexTableSegment {
    pub index_edit_rate: Rational,
    pub index_start_position: i64,
    pub index_duration: i64,
    /// `0` signals VBR (explicit `index_entries`); `> 0` is the CBR
    /// per-edit-unit byte count.
    pub edit_unit_byte_count: u32,
    pub index_sid: u32,
    pub body_sid: u32,
    pub slice_count: u8,
    pub pos_table_count: u8,
    pub delta_entries: Vec<DeltaEntry>,
    pub index_entries: Vec<IndexEntry>,
}

/// Largest a serialised segment's local-set body may be: a 2-byte local
/// tag length field caps any one item at 65,535 bytes.
pub const MAX_LOCAL_SET_ITEM_LEN: usize = 65_535;

impl IndexTableSegment {
    pub fn is_cbr(&self) -> bool {
        self.edit_unit_byte_count > 0
    }

    /// Size the `IndexEntryArray` item would occupy if serialised now;
    /// callers use this to decide when to roll over to a new segment (see
    /// [`MAX_LOCAL_SET_ITEM_LEN`]).
    pub fn index_entry_array_len(&self) -> usize {
        let entry_size = self
            .index_entries
            .first()
            .map(IndexEntry::wire_size)
            .unwrap_or(11 + 4 * self.slice_count as usize + 8 * self.pos_table_count as usize);
        8 + self.index_entries.len() * entry_size
    }

    /// Detect the wire shape from a Partition-pack-adjacent key, then
    /// parse the pack body.
    pub fn parse(key: &Ul, body: &[u8], source: &str) -> Result<Self> {
        let version = if *key == INDEX_TABLE_SEGMENT_UL_V10 {
            WireVersion::V10
        } else if *key == INDEX_TABLE_SEGMENT_UL_V11 {
            WireVersion::V11
        } else {
            return Err(Error::structural(
                Location::unknown(),
                "key is not a known IndexTableSegment UL".to_string(),
            ));
        };
        Self::parse_with_version(body, version, source)
    }

    pub fn parse_with_version(body: &[u8], version: WireVersion, source: &str) -> Result<Self> {
        let mut r = Reader::new(body, source);
        let num = r.i32()?;
        let den = r.i32()?;
        let index_edit_rate = Rational::new(num, den);
        let index_start_position = r.u64()? as i64;
        let index_duration = r.u64()? as i64;
        let edit_unit_byte_count = r.u32()?;
        let index_sid = r.u32()?;
        let body_sid = r.u32()?;
        let slice_count = r.u8()?;
        let pos_table_count = if version == WireVersion::V11 { r.u8()? } else { 0 };

        let delta_count = r.u32()?;
        let delta_item_size = r.u32()? as usize;
        if delta_count > 0 && delta_item_size != 6 {
            return Err(Error::structural(
                Location::new(r.position() as u64, source.to_string()),
                format!("DeltaEntryArray item size {delta_item_size} != 6"),
            ));
        }
        let mut delta_entries = Vec::with_capacity(delta_count as usize);
        for _ in 0..delta_count {
            let pos_table_index = match version {
                WireVersion::V11 => r.i8()?,
                WireVersion::V10 => {
                    let reorder = r.u8()? != 0;
                    if reorder {
                        -1
                    } else {
                        0
                    }
                }
            };
            let slice_number = r.u8()?;
            let element_delta = r.u32()?;
            delta_entries.push(DeltaEntry {
                pos_table_index,
                slice_number,
                element_delta,
            });
        }

        let entry_count = r.u32()?;
        let entry_item_size = r.u32()? as usize;
        let nsl = slice_count as usize;
        let npe = if version == WireVersion::V11 { pos_table_count as usize } else { 0 };
        let expected_item_size = 11 + 4 * nsl + 8 * npe;
        if entry_count > 0 && entry_item_size != expected_item_size {
            return Err(Error::structural(
                Location::new(r.position() as u64, source.to_string()),
                format!("IndexEntryArray item size {entry_item_size} != {expected_item_size}"),
            ));
        }
        let mut index_entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            let temporal_offset = r.i8()?;
            let key_frame_offset = r.i8()?;
            let flags = r.u8()?;
            let stream_offset = r.u64()?;
            let mut slice_offsets = Vec::with_capacity(nsl);
            for _ in 0..nsl {
                slice_offsets.push(r.u32()?);
            }
            let mut pos_table = Vec::with_capacity(npe);
            for _ in 0..npe {
                let n = r.i32()?;
                let d = r.i32()?;
                pos_table.push(Rational::new(n, d));
            }
            index_entries.push(IndexEntry {
                temporal_offset,
                key_frame_offset,
                flags,
                stream_offset,
                slice_offsets,
                pos_table,
            });
        }

        Ok(Self {
            index_edit_rate,
            index_start_position,
            index_duration,
            edit_unit_byte_count,
            index_sid,
            body_sid,
            slice_count,
            pos_table_count,
            delta_entries,
            index_entries,
        })
    }

    /// Emit the pack body for the given wire shape. The caller is
    /// responsible for framing this as a KLV/local-set pack with the
    /// matching key ([`INDEX_TABLE_SEGMENT_UL_V11`] /
    /// [`INDEX_TABLE_SEGMENT_UL_V10`]).
    pub fn write(&self, version: WireVersion) -> Vec<u8> {
        let mut buf = Vec::new();
        write_i32(&mut buf, self.index_edit_rate.numerator);
        write_i32(&mut buf, self.index_edit_rate.denominator);
        write_u64(&mut buf, self.index_start_position as u64);
        write_u64(&mut buf, self.index_duration as u64);
        write_u32(&mut buf, self.edit_unit_byte_count);
        write_u32(&mut buf, self.index_sid);
        write_u32(&mut buf, self.body_sid);
        buf.push(self.slice_count);
        if version == WireVersion::V11 {
            buf.push(self.pos_table_count);
        }

        write_u32(&mut buf, self.delta_entries.len() as u32);
        write_u32(&mut buf, 6);
        for d in &self.delta_entries {
            match version {
                WireVersion::V11 => buf.push(d.pos_table_index as u8),
                WireVersion::V10 => buf.push(u8::from(d.pos_table_index < 0)),
            }
            buf.push(d.slice_number);
            write_u32(&mut buf, d.element_delta);
        }

        let nsl = self.slice_count as usize;
        let npe = if version == WireVersion::V11 { self.pos_table_count as usize } else { 0 };
        let item_size = 11 + 4 * nsl + 8 * npe;
        write_u32(&mut buf, self.index_entries.len() as u32);
        write_u32(&mut buf, item_size as u32);
        for e in &self.index_entries {
            buf.push(e.temporal_offset as u8);
            buf.push(e.key_frame_offset as u8);
            buf.push(e.flags);
            write_u64(&mut buf, e.stream_offset);
            for s in &e.slice_offsets {
                write_u32(&mut buf, *s);
            }
            if version == WireVersion::V11 {
                for p in &e.pos_table {
                    write_i32(&mut buf, p.numerator);
                    write_i32(&mut buf, p.denominator);
                }
            }
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cbr() -> IndexTableSegment {
        IndexTableSegment {
            index_edit_rate: Rational::new(25, 1),
            index_start_position: 0,
            index_duration: 10,
            edit_unit_byte_count: 4096,
            index_sid: 1,
            body_sid: 1,
            slice_count: 0,
            pos_table_count: 0,
            delta_entries: vec![DeltaEntry {
                pos_table_index: 0,
                slice_number: 0,
                element_delta: 0,
            }],
            index_entries: Vec::new(),
        }
    }

    fn sample_vbr() -> IndexTableSegment {
        IndexTableSegment {
            index_entries: vec![IndexEntry {
                temporal_offset: -1,
                key_frame_offset: 0,
                flags: 0x80,
                stream_offset: 512,
                slice_offsets: vec![64],
                pos_table: vec![Rational::new(1, 2)],
            }],
            slice_count: 1,
            pos_table_count: 1,
            ..sample_cbr()
        }
    }

    #[test]
    fn v11_round_trip_cbr() {
        let seg = sample_cbr();
        let body = seg.write(WireVersion::V11);
        let parsed = IndexTableSegment::parse(&INDEX_TABLE_SEGMENT_UL_V11, &body, "test").unwrap();
        assert!(parsed.is_cbr());
        assert_eq!(parsed.delta_entries, seg.delta_entries);
    }

    #[test]
    fn v11_round_trip_vbr_with_pos_table() {
        let seg = sample_vbr();
        let body = seg.write(WireVersion::V11);
        let parsed = IndexTableSegment::parse(&INDEX_TABLE_SEGMENT_UL_V11, &body, "test").unwrap();
        assert_eq!(parsed.index_entries, seg.index_entries);
    }

    #[test]
    fn v10_reorder_flag_maps_to_pos_table_index() {
        let mut seg = sample_cbr();
        seg.delta_entries[0].pos_table_index = -1;
        let body = seg.write(WireVersion::V10);
        let parsed = IndexTableSegment::parse(&INDEX_TABLE_SEGMENT_UL_V10, &body, "test").unwrap();
        assert_eq!(parsed.delta_entries[0].pos_table_index, -1);

        seg.delta_entries[0].pos_table_index = 0;
        let body = seg.write(WireVersion::V10);
        let parsed = IndexTableSegment::parse(&INDEX_TABLE_SEGMENT_UL_V10, &body, "test").unwrap();
        assert_eq!(parsed.delta_entries[0].pos_table_index, 0);
    }

    #[test]
    fn wire_size_matches_formula() {
        let entry = &sample_vbr().index_entries[0];
        assert_eq!(entry.wire_size(), 11 + 4 * 1 + 8 * 1);
    }
}
