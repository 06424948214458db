//! ReorderIndex: a write-time staging buffer for VBR index entries.
//!
//! A GOP-structured codec can only assign `TemporalOffset` once it knows
//! where an edit unit lands in display order relative to its neighbours,
//! which may not be known until a later edit unit has been seen. This
//! buffer accepts entries out of order by edit unit and lets the writer
//! mark one "resolved" once its `TemporalOffset` is final; [`commit`]
//! drains the longest complete, contiguous prefix (in edit-unit order)
//! that still fits one segment.

use crate::segment::{IndexEntry, MAX_LOCAL_SET_ITEM_LEN};

struct Pending {
    edit_unit: i64,
    entry: IndexEntry,
    resolved: bool,
}

#[derive(Default)]
pub struct ReorderIndex {
    entries: Vec<Pending>,
}

impl ReorderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an entry for `edit_unit`. Entries may arrive in any order;
    /// this keeps the buffer sorted by edit unit so a later, earlier-dated
    /// insertion shifts existing entries rather than appending out of
    /// order.
    pub fn insert(&mut self, edit_unit: i64, entry: IndexEntry, resolved: bool) {
        let pos = self.entries.partition_point(|p| p.edit_unit < edit_unit);
        self.entries.insert(
            pos,
            Pending {
                edit_unit,
                entry,
                resolved,
            },
        );
    }

    /// Finalize a previously-staged entry's `TemporalOffset`, e.g. once a
    /// later edit unit reveals display order.
    pub fn resolve(&mut self, edit_unit: i64, temporal_offset: i8) -> bool {
        if let Some(p) = self.entries.iter_mut().find(|p| p.edit_unit == edit_unit) {
            p.entry.temporal_offset = temporal_offset;
            p.resolved = true;
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain the longest prefix of resolved entries (in edit-unit order,
    /// starting from the lowest) whose combined `IndexEntryArray` wire
    /// size stays within [`MAX_LOCAL_SET_ITEM_LEN`]. Stops at the first
    /// unresolved entry or once the size cap would be exceeded. Returns
    /// `(start_edit_unit, entries)`, or `None` if nothing is ready.
    pub fn commit(&mut self) -> Option<(i64, Vec<IndexEntry>)> {
        if self.entries.is_empty() || !self.entries[0].resolved {
            return None;
        }
        let mut total = 8usize; // batch header: count + item size
        let mut take = 0;
        for p in &self.entries {
            if !p.resolved {
                break;
            }
            let size = p.entry.wire_size();
            if take > 0 && total + size > MAX_LOCAL_SET_ITEM_LEN {
                break;
            }
            total += size;
            take += 1;
        }
        if take == 0 {
            return None;
        }
        let start = self.entries[0].edit_unit;
        let drained: Vec<IndexEntry> = self.entries.drain(..take).map(|p| p.entry).collect();
        Some((start, drained))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxf_core::Rational;

    fn entry(stream_offset: u64) -> IndexEntry {
        IndexEntry {
            temporal_offset: 0,
            key_frame_offset: 0,
            flags: 0,
            stream_offset,
            slice_offsets: vec![],
            pos_table: vec![],
        }
    }

    #[test]
    fn retrospective_insert_keeps_edit_unit_order() {
        let mut idx = ReorderIndex::new();
        idx.insert(2, entry(200), true);
        idx.insert(0, entry(0), true);
        idx.insert(1, entry(100), true);
        let (start, committed) = idx.commit().unwrap();
        assert_eq!(start, 0);
        assert_eq!(
            committed.iter().map(|e| e.stream_offset).collect::<Vec<_>>(),
            vec![0, 100, 200]
        );
    }

    #[test]
    fn commit_stops_at_first_unresolved() {
        let mut idx = ReorderIndex::new();
        idx.insert(0, entry(0), true);
        idx.insert(1, entry(100), false);
        idx.insert(2, entry(200), true);
        let (start, committed) = idx.commit().unwrap();
        assert_eq!(start, 0);
        assert_eq!(committed.len(), 1);
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn resolve_updates_temporal_offset() {
        let mut idx = ReorderIndex::new();
        idx.insert(0, entry(0), false);
        assert!(idx.resolve(0, -2));
        let (_, committed) = idx.commit().unwrap();
        assert_eq!(committed[0].temporal_offset, -2);
    }

    #[test]
    fn nothing_ready_returns_none() {
        let mut idx = ReorderIndex::new();
        idx.insert(0, entry(0), false);
        assert!(idx.commit().is_none());
    }

    #[test]
    #[allow(unused)]
    fn uses_rational_for_pos_table_in_real_entries() {
        let e = IndexEntry {
            pos_table: vec![Rational::new(1, 2)],
            ..entry(0)
        };
        assert_eq!(e.pos_table.len(), 1);
    }
}
