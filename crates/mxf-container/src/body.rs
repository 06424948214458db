//! Body writer: partition boundary policy, metadata/index sharing, and
//! per-stream VBR index staging.

use std::collections::HashMap;

use mxf_core::Rational;
use mxf_essence::EssenceSource;
use mxf_index::{IndexEntry, IndexTableSegment, ReorderIndex, WireVersion};

use crate::generic::StreamId;

/// How essence is framed within a Generic Container element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapType {
    /// One edit unit per content package.
    Frame,
    /// The whole stream in one element (no per-edit-unit framing).
    Clip,
    Other,
}

/// When a new body partition is forced, independent of essence content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionBoundary {
    /// `Body_None`: one partition per stream boundary only.
    None,
    /// `Body_Duration`: force a new partition every `edit_units` edit
    /// units, optionally snapped to the next GOP boundary.
    Duration { edit_units: u64, edit_align: bool },
    /// `Body_Size`: force a new partition once the current body exceeds
    /// `bytes`.
    Size { bytes: u64 },
}

/// Whether index segments and essence may share a partition with header
/// metadata. `Isolated`/`VeryIsolated` placement (see the index engine)
/// is derived from these two booleans rather than stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharingPolicy {
    pub index_may_share_with_metadata: bool,
    pub essence_may_share_with_metadata: bool,
}

impl SharingPolicy {
    pub fn isolated(&self) -> bool {
        !self.essence_may_share_with_metadata
    }

    pub fn very_isolated(&self) -> bool {
        !self.essence_may_share_with_metadata && !self.index_may_share_with_metadata
    }
}

impl Default for SharingPolicy {
    fn default() -> Self {
        Self {
            index_may_share_with_metadata: true,
            essence_may_share_with_metadata: true,
        }
    }
}

struct BodyStream {
    id: StreamId,
    source: Box<dyn EssenceSource>,
    wrap_type: WrapType,
    body_sid: u32,
    index_sid: Option<u32>,
    next_edit_unit: i64,
    stream_offset: u64,
}

/// Drives a set of essence sources through a Generic Container,
/// deciding when a new body partition is required and staging VBR
/// index entries for each indexed stream.
///
/// Each indexed stream owns a [`ReorderIndex`]; it must outlive any
/// [`IndexTableSegment`] it feeds, so it lives here as part of the
/// writer rather than being threaded through as a loose value. Segments
/// are produced by value only once [`ReorderIndex::commit`] says a
/// contiguous run is ready.
pub struct BodyWriter {
    streams: Vec<BodyStream>,
    reorder: HashMap<StreamId, ReorderIndex>,
    boundary: PartitionBoundary,
    sharing: SharingPolicy,
    edit_units_since_partition: u64,
    bytes_since_partition: u64,
    wire_version: WireVersion,
}

impl BodyWriter {
    pub fn new(boundary: PartitionBoundary, sharing: SharingPolicy) -> Self {
        Self::with_wire_version(boundary, sharing, WireVersion::V11)
    }

    /// As [`Self::new`], but writing IndexTableSegments in `wire_version`'s
    /// shape. A writer picks one shape for the whole file; readers accept
    /// either regardless of what a given writer chose.
    pub fn with_wire_version(boundary: PartitionBoundary, sharing: SharingPolicy, wire_version: WireVersion) -> Self {
        Self {
            streams: Vec::new(),
            reorder: HashMap::new(),
            boundary,
            sharing,
            edit_units_since_partition: 0,
            bytes_since_partition: 0,
            wire_version,
        }
    }

    pub fn add_stream(
        &mut self,
        id: StreamId,
        source: Box<dyn EssenceSource>,
        wrap_type: WrapType,
        body_sid: u32,
        indexed: bool,
    ) {
        let index_sid = indexed.then(|| body_sid + 128);
        if indexed {
            self.reorder.insert(id, ReorderIndex::new());
        }
        self.streams.push(BodyStream {
            id,
            source,
            wrap_type,
            body_sid,
            index_sid,
            next_edit_unit: 0,
            stream_offset: 0,
        });
    }

    fn stream_mut(&mut self, id: StreamId) -> &mut BodyStream {
        self.streams
            .iter_mut()
            .find(|s| s.id == id)
            .expect("unregistered stream")
    }

    /// Pull the next edit unit's bytes from a stream's essence source,
    /// stage an index entry if the stream is indexed, and account it
    /// against the partition-boundary policy. Returns `None` once the
    /// source is exhausted.
    pub fn pull_edit_unit(&mut self, id: StreamId, min_size: usize, max_size: usize) -> crate::Result<Option<Vec<u8>>> {
        let edit_unit;
        let body_sid;
        let index_sid;
        let stream_offset;
        let bytes = {
            let stream = self.stream_mut(id);
            match stream.source.next_chunk(min_size, max_size)? {
                mxf_essence::Chunk::End => return Ok(None),
                mxf_essence::Chunk::Empty => return Ok(Some(Vec::new())),
                mxf_essence::Chunk::Bytes(b) => {
                    edit_unit = stream.next_edit_unit;
                    body_sid = stream.body_sid;
                    index_sid = stream.index_sid;
                    stream_offset = stream.stream_offset;
                    stream.next_edit_unit += 1;
                    stream.stream_offset += b.len() as u64;
                    b
                }
            }
        };

        if index_sid.is_some() {
            let entry = IndexEntry {
                temporal_offset: 0,
                key_frame_offset: 0,
                flags: 0,
                stream_offset,
                slice_offsets: Vec::new(),
                pos_table: Vec::new(),
            };
            if let Some(r) = self.reorder.get_mut(&id) {
                r.insert(edit_unit, entry, true);
            }
        }
        let _ = body_sid;

        self.edit_units_since_partition += 1;
        self.bytes_since_partition += bytes.len() as u64;
        Ok(Some(bytes))
    }

    /// Whether a new body partition must be started before the next
    /// content package, per the configured boundary policy.
    pub fn needs_new_partition(&self) -> bool {
        match self.boundary {
            PartitionBoundary::None => false,
            PartitionBoundary::Duration { edit_units, .. } => self.edit_units_since_partition >= edit_units,
            PartitionBoundary::Size { bytes } => self.bytes_since_partition >= bytes,
        }
    }

    pub fn start_new_partition(&mut self) {
        self.edit_units_since_partition = 0;
        self.bytes_since_partition = 0;
    }

    pub fn sharing(&self) -> SharingPolicy {
        self.sharing
    }

    /// Drain every stream's [`ReorderIndex`] of any contiguous-from-front
    /// run ready to commit, producing one [`IndexTableSegment`] per
    /// drained run.
    pub fn take_ready_segments(&mut self, index_edit_rate: Rational) -> Vec<IndexTableSegment> {
        let mut segments = Vec::new();
        for stream in &self.streams {
            let Some(index_sid) = stream.index_sid else { continue };
            let Some(reorder) = self.reorder.get_mut(&stream.id) else { continue };
            while let Some((start, entries)) = reorder.commit() {
                segments.push(IndexTableSegment {
                    index_edit_rate,
                    index_start_position: start,
                    index_duration: entries.len() as i64,
                    edit_unit_byte_count: 0,
                    index_sid,
                    body_sid: stream.body_sid,
                    slice_count: 0,
                    pos_table_count: 0,
                    delta_entries: Vec::new(),
                    index_entries: entries,
                });
            }
        }
        segments
    }

    pub fn wire_version(&self) -> WireVersion {
        self.wire_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxf_essence::RawEssenceSource;
    use std::io::Cursor;

    #[test]
    fn duration_boundary_trips_after_n_edit_units() {
        let mut bw = BodyWriter::new(
            PartitionBoundary::Duration { edit_units: 2, edit_align: false },
            SharingPolicy::default(),
        );
        let src = RawEssenceSource::cbr(Cursor::new(vec![0u8; 12]), Rational::new(25, 1), 4);
        bw.add_stream(StreamId(1), Box::new(src), WrapType::Frame, 1, true);

        assert!(!bw.needs_new_partition());
        bw.pull_edit_unit(StreamId(1), 0, 0).unwrap();
        assert!(!bw.needs_new_partition());
        bw.pull_edit_unit(StreamId(1), 0, 0).unwrap();
        assert!(bw.needs_new_partition());
    }

    #[test]
    fn sharing_policy_derives_isolation() {
        let isolated = SharingPolicy {
            index_may_share_with_metadata: true,
            essence_may_share_with_metadata: false,
        };
        assert!(isolated.isolated());
        assert!(!isolated.very_isolated());

        let very = SharingPolicy {
            index_may_share_with_metadata: false,
            essence_may_share_with_metadata: false,
        };
        assert!(very.very_isolated());
    }

    #[test]
    fn ready_segments_drain_once_resolved() {
        let mut bw = BodyWriter::new(PartitionBoundary::None, SharingPolicy::default());
        let src = RawEssenceSource::cbr(Cursor::new(vec![0u8; 8]), Rational::new(25, 1), 4);
        bw.add_stream(StreamId(1), Box::new(src), WrapType::Frame, 1, true);
        bw.pull_edit_unit(StreamId(1), 0, 0).unwrap();
        bw.pull_edit_unit(StreamId(1), 0, 0).unwrap();

        let segments = bw.take_ready_segments(Rational::new(25, 1));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].index_entries.len(), 2);
        assert_eq!(segments[0].index_sid, 1 + 128);
    }
}
