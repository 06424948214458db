//! Edit-unit -> byte-offset lookup, for both CBR and VBR segments.

use mxf_core::{Error, Location, Rational, Result};

use crate::segment::IndexTableSegment;

/// The result of a successful lookup: a byte location within the Generic
/// Container, plus an optional fractional sample offset for subsample
/// audio alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location377 {
    pub byte_offset: u64,
    pub fractional_offset: Option<Rational>,
    /// Set when the requested edit unit fell after the last segment's
    /// range and this location is the nearest-preceding segment's final
    /// entry rather than an exact hit.
    pub approximate: bool,
}

/// An ordered table of [`IndexTableSegment`]s for one (BodySID, IndexSID)
/// pair, covering step 1 of the lookup procedure: select the segment whose
/// range covers a given edit unit before dispatching into its per-segment
/// lookup.
#[derive(Debug, Clone, Default)]
pub struct IndexTable {
    segments: Vec<IndexTableSegment>,
}

impl IndexTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a segment, keeping the table ordered by `index_start_position`.
    pub fn insert(&mut self, segment: IndexTableSegment) {
        let pos = self
            .segments
            .partition_point(|s| s.index_start_position <= segment.index_start_position);
        self.segments.insert(pos, segment);
    }

    pub fn segments(&self) -> &[IndexTableSegment] {
        &self.segments
    }

    /// Find the segment whose `[index_start_position, index_start_position
    /// + index_duration)` range covers `edit_unit`.
    fn covering_segment(&self, edit_unit: i64) -> Option<&IndexTableSegment> {
        self.segments.iter().find(|s| {
            edit_unit >= s.index_start_position && edit_unit < s.index_start_position + s.index_duration
        })
    }

    /// The segment whose range starts closest at or before `edit_unit`,
    /// used for the nearest-preceding fallback when no segment covers it.
    fn nearest_preceding_segment(&self, edit_unit: i64) -> Option<&IndexTableSegment> {
        self.segments
            .iter()
            .filter(|s| s.index_start_position <= edit_unit)
            .max_by_key(|s| s.index_start_position)
    }

    /// Resolve edit unit `edit_unit`, stream `stream`: find the covering
    /// segment and dispatch into its lookup; if none covers it, return the
    /// nearest-preceding segment's final entry with `approximate` set.
    pub fn lookup(&self, edit_unit: i64, stream: usize, reorder: bool, source: &str) -> Result<Location377> {
        if let Some(segment) = self.covering_segment(edit_unit) {
            return segment.lookup(edit_unit, stream, reorder, source);
        }

        let segment = self.nearest_preceding_segment(edit_unit).ok_or_else(|| {
            Error::index(format!("edit unit {edit_unit} precedes every segment in this table"))
        })?;
        let last = segment.index_start_position + segment.index_duration - 1;
        let mut location = segment.lookup(last, stream, reorder, source)?;
        location.approximate = true;
        Ok(location)
    }
}

impl IndexTableSegment {
    /// Look up edit unit `edit_unit`, stream `stream`, applying temporal
    /// reordering when `reorder` is true and the stream's DeltaEntry
    /// flags it (`PosTableIndex < 0`).
    pub fn lookup(&self, edit_unit: i64, stream: usize, reorder: bool, source: &str) -> Result<Location377> {
        let delta = self.delta_entries.get(stream).ok_or_else(|| {
            Error::index(format!("stream {stream} has no DeltaEntry in this segment"))
        })?;

        if self.is_cbr() {
            let byte_offset = edit_unit as u64 * self.edit_unit_byte_count as u64 + delta.element_delta as u64;
            return Ok(Location377 {
                byte_offset,
                fractional_offset: None,
                approximate: false,
            });
        }

        let idx = edit_unit - self.index_start_position;
        if idx < 0 || idx >= self.index_duration {
            return Err(Error::structural(
                Location::new(0, source.to_string()),
                format!(
                    "edit unit {edit_unit} outside segment range [{}, {})",
                    self.index_start_position,
                    self.index_start_position + self.index_duration
                ),
            ));
        }
        let entry = self
            .index_entries
            .get(idx as usize)
            .ok_or_else(|| Error::index(format!("no IndexEntry recorded for edit unit {edit_unit}")))?;

        if reorder && delta.pos_table_index < 0 && entry.temporal_offset != 0 {
            return self.lookup(edit_unit + entry.temporal_offset as i64, stream, false, source);
        }

        let slice = delta.slice_number as usize;
        let slice_contribution = if slice > 0 {
            *entry
                .slice_offsets
                .get(slice - 1)
                .ok_or_else(|| Error::index(format!("slice {slice} has no SliceOffsetArray entry")))?
                as u64
        } else {
            0
        };

        let byte_offset = entry.stream_offset + slice_contribution + delta.element_delta as u64;
        let fractional_offset = if delta.pos_table_index > 0 {
            entry.pos_table.get(delta.pos_table_index as usize - 1).copied()
        } else {
            None
        };

        Ok(Location377 {
            byte_offset,
            fractional_offset,
            approximate: false,
        })
    }

    /// Locate the nearest key frame at or before `edit_unit`. Returns
    /// `Ok(None)` ("unknown key location") rather than an error when the
    /// computed offset falls outside this segment - the caller is
    /// expected to widen the search to an earlier segment rather than
    /// treat this as fatal.
    pub fn key_frame_location(&self, edit_unit: i64, stream: usize, source: &str) -> Result<Option<Location377>> {
        let idx = edit_unit - self.index_start_position;
        if idx < 0 || idx >= self.index_duration {
            return Ok(None);
        }
        let Some(entry) = self.index_entries.get(idx as usize) else {
            return Ok(None);
        };
        let key_edit_unit = edit_unit + entry.key_frame_offset as i64;
        if key_edit_unit < self.index_start_position
            || key_edit_unit >= self.index_start_position + self.index_duration
        {
            return Ok(None);
        }
        self.lookup(key_edit_unit, stream, false, source).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{DeltaEntry, IndexEntry};

    fn cbr_segment() -> IndexTableSegment {
        IndexTableSegment {
            index_edit_rate: Rational::new(25, 1),
            index_start_position: 0,
            index_duration: 100,
            edit_unit_byte_count: 4096,
            index_sid: 1,
            body_sid: 1,
            slice_count: 0,
            pos_table_count: 0,
            delta_entries: vec![DeltaEntry {
                pos_table_index: 0,
                slice_number: 0,
                element_delta: 16,
            }],
            index_entries: Vec::new(),
        }
    }

    #[test]
    fn cbr_is_exact() {
        let seg = cbr_segment();
        let loc = seg.lookup(3, 0, true, "test").unwrap();
        assert_eq!(loc.byte_offset, 3 * 4096 + 16);
    }

    #[test]
    fn vbr_without_reorder_reads_stream_offset_directly() {
        let seg = IndexTableSegment {
            edit_unit_byte_count: 0,
            index_duration: 2,
            delta_entries: vec![DeltaEntry {
                pos_table_index: 0,
                slice_number: 0,
                element_delta: 4,
            }],
            index_entries: vec![
                IndexEntry {
                    temporal_offset: 0,
                    key_frame_offset: 0,
                    flags: 0,
                    stream_offset: 1000,
                    slice_offsets: vec![],
                    pos_table: vec![],
                },
                IndexEntry {
                    temporal_offset: 0,
                    key_frame_offset: -1,
                    flags: 0,
                    stream_offset: 2000,
                    slice_offsets: vec![],
                    pos_table: vec![],
                },
            ],
            ..cbr_segment()
        };
        let loc = seg.lookup(1, 0, true, "test").unwrap();
        assert_eq!(loc.byte_offset, 2000 + 4);
    }

    #[test]
    fn vbr_reorder_follows_temporal_offset_once() {
        let seg = IndexTableSegment {
            edit_unit_byte_count: 0,
            index_duration: 2,
            delta_entries: vec![DeltaEntry {
                pos_table_index: -1,
                slice_number: 0,
                element_delta: 0,
            }],
            index_entries: vec![
                IndexEntry {
                    temporal_offset: 1,
                    key_frame_offset: 0,
                    flags: 0,
                    stream_offset: 1000,
                    slice_offsets: vec![],
                    pos_table: vec![],
                },
                IndexEntry {
                    temporal_offset: 0,
                    key_frame_offset: 0,
                    flags: 0,
                    stream_offset: 2000,
                    slice_offsets: vec![],
                    pos_table: vec![],
                },
            ],
            ..cbr_segment()
        };
        let with_reorder = seg.lookup(0, 0, true, "test").unwrap();
        let without = seg.lookup(0, 0, false, "test").unwrap();
        assert_eq!(with_reorder.byte_offset, 2000);
        assert_eq!(without.byte_offset, 1000);
    }

    #[test]
    fn index_table_dispatches_to_covering_segment() {
        let mut first = cbr_segment();
        first.index_start_position = 0;
        first.index_duration = 10;
        let mut second = cbr_segment();
        second.index_start_position = 10;
        second.index_duration = 10;

        let mut table = IndexTable::new();
        table.insert(second.clone());
        table.insert(first.clone());

        let loc = table.lookup(12, 0, true, "test").unwrap();
        assert!(!loc.approximate);
        assert_eq!(loc.byte_offset, 2 * 4096 + 16);
    }

    #[test]
    fn index_table_falls_back_to_nearest_preceding_segment() {
        let mut seg = cbr_segment();
        seg.index_start_position = 0;
        seg.index_duration = 10;
        let mut table = IndexTable::new();
        table.insert(seg);

        let loc = table.lookup(50, 0, true, "test").unwrap();
        assert!(loc.approximate);
        assert_eq!(loc.byte_offset, 9 * 4096 + 16);
    }

    #[test]
    fn index_table_errors_before_every_segment() {
        let mut seg = cbr_segment();
        seg.index_start_position = 10;
        seg.index_duration = 10;
        let mut table = IndexTable::new();
        table.insert(seg);

        assert!(table.lookup(5, 0, true, "test").is_err());
    }

    #[test]
    fn key_frame_outside_segment_is_unknown_not_an_error() {
        let seg = IndexTableSegment {
            edit_unit_byte_count: 0,
            index_duration: 1,
            delta_entries: vec![DeltaEntry {
                pos_table_index: 0,
                slice_number: 0,
                element_delta: 0,
            }],
            index_entries: vec![IndexEntry {
                temporal_offset: 0,
                key_frame_offset: -5,
                flags: 0,
                stream_offset: 0,
                slice_offsets: vec![],
                pos_table: vec![],
            }],
            ..cbr_segment()
        };
        assert_eq!(seg.key_frame_location(0, 0, "test").unwrap(), None);
    }
}
