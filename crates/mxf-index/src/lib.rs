//! Index Table Segment codec ([`segment`]), edit-unit lookup
//! ([`lookup`]), and the write-time reorder staging buffer ([`reorder`]).

pub mod lookup;
pub mod reorder;
pub mod segment;

pub use lookup::{IndexTable, Location377};
pub use reorder::ReorderIndex;
pub use segment::{
    DeltaEntry, IndexEntry, IndexTableSegment, WireVersion, INDEX_TABLE_SEGMENT_UL_V10,
    INDEX_TABLE_SEGMENT_UL_V11, MAX_LOCAL_SET_ITEM_LEN,
};
