//! [`EssenceSource`]: the pull interface every picture/sound/data stream
//! is consumed through by the Generic Container writer.

use mxf_core::Rational;

use crate::error::Result;

/// One pull from an [`EssenceSource`].
#[derive(Debug)]
pub enum Chunk {
    /// Exactly the requested (or best-effort, between `min_size` and
    /// `max_size`) bytes of essence data.
    Bytes(Vec<u8>),
    /// More data is coming but isn't available yet - a suspension point
    /// for streaming callers, distinct from [`Chunk::End`].
    Empty,
    /// The stream is exhausted; no further chunks will be produced.
    End,
}

/// A pull source of essence bytes, sliced into chunks the caller can
/// frame as Generic Container KLVs.
pub trait EssenceSource {
    /// Request the next chunk, sized between `min_size` and `max_size`
    /// bytes where the source can choose (an already-framed source, e.g.
    /// one edit unit per call, may ignore these bounds).
    fn next_chunk(&mut self, min_size: usize, max_size: usize) -> Result<Chunk>;

    /// Fixed per-edit-unit byte count for CBR essence; `0` for VBR.
    fn bytes_per_edit_unit(&self) -> u32;

    /// Whether this source can supply the information an Index Table
    /// needs (key frame positions, temporal offsets).
    fn can_index(&self) -> bool;

    /// Ask the source to start tracking VBR index metadata per edit unit.
    /// Returns `false` if the source cannot comply (e.g. `can_index()` is
    /// false, or it has already started emitting without tracking).
    fn enable_vbr_index_mode(&mut self) -> bool;

    /// The sample/frame rate this source is wrapped at.
    fn edit_rate(&self) -> Rational;

    /// Bytes of leading, non-indexed data preceding the first indexed
    /// edit unit (audio precharge for sample-rate-converted sources).
    fn precharge_size(&self) -> Option<u32> {
        None
    }
}
