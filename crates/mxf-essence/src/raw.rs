//! [`RawEssenceSource`]: treats an arbitrary [`Read`] as one
//! undifferentiated CBR or VBR stream, sliced at caller-specified
//! boundaries. Useful for tests and for essence that arrives already
//! framed by an upstream process.

use std::collections::VecDeque;
use std::io::Read;

use mxf_core::Rational;

use crate::error::Result;
use crate::source::{Chunk, EssenceSource};

enum Mode {
    /// Fixed-size edit units; `next_chunk` ignores `min_size`/`max_size`
    /// and always reads exactly this many bytes.
    Cbr(u32),
    /// A caller-supplied queue of edit-unit byte sizes, consumed in
    /// order. VBR index tracking is meaningful here: each popped size
    /// corresponds to one edit unit's `StreamOffset`.
    Vbr(VecDeque<usize>),
}

pub struct RawEssenceSource<R> {
    reader: R,
    edit_rate: Rational,
    mode: Mode,
    vbr_tracking: bool,
}

impl<R: Read> RawEssenceSource<R> {
    pub fn cbr(reader: R, edit_rate: Rational, bytes_per_edit_unit: u32) -> Self {
        Self {
            reader,
            edit_rate,
            mode: Mode::Cbr(bytes_per_edit_unit),
            vbr_tracking: false,
        }
    }

    pub fn vbr(reader: R, edit_rate: Rational, edit_unit_sizes: impl IntoIterator<Item = usize>) -> Self {
        Self {
            reader,
            edit_rate,
            mode: Mode::Vbr(edit_unit_sizes.into_iter().collect()),
            vbr_tracking: false,
        }
    }

    fn read_exact_or_end(&mut self, size: usize) -> Result<Chunk> {
        if size == 0 {
            return Ok(Chunk::End);
        }
        let mut buf = vec![0u8; size];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => Ok(Chunk::Bytes(buf)),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(Chunk::End),
            Err(e) => Err(e.into()),
        }
    }
}

impl<R: Read> EssenceSource for RawEssenceSource<R> {
    fn next_chunk(&mut self, _min_size: usize, _max_size: usize) -> Result<Chunk> {
        match &mut self.mode {
            Mode::Cbr(size) => {
                let size = *size as usize;
                self.read_exact_or_end(size)
            }
            Mode::Vbr(sizes) => match sizes.pop_front() {
                Some(size) => self.read_exact_or_end(size),
                None => Ok(Chunk::End),
            },
        }
    }

    fn bytes_per_edit_unit(&self) -> u32 {
        match self.mode {
            Mode::Cbr(size) => size,
            Mode::Vbr(_) => 0,
        }
    }

    fn can_index(&self) -> bool {
        true
    }

    fn enable_vbr_index_mode(&mut self) -> bool {
        match self.mode {
            Mode::Vbr(_) => {
                self.vbr_tracking = true;
                true
            }
            Mode::Cbr(_) => false,
        }
    }

    fn edit_rate(&self) -> Rational {
        self.edit_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn cbr_reads_fixed_chunks_then_ends() {
        let data = vec![1u8, 2, 3, 4, 5, 6];
        let mut src = RawEssenceSource::cbr(Cursor::new(data), Rational::new(25, 1), 3);
        match src.next_chunk(0, 0).unwrap() {
            Chunk::Bytes(b) => assert_eq!(b, vec![1, 2, 3]),
            other => panic!("expected bytes, got {other:?}"),
        }
        match src.next_chunk(0, 0).unwrap() {
            Chunk::Bytes(b) => assert_eq!(b, vec![4, 5, 6]),
            other => panic!("expected bytes, got {other:?}"),
        }
        assert!(matches!(src.next_chunk(0, 0).unwrap(), Chunk::End));
    }

    #[test]
    fn vbr_follows_caller_supplied_sizes() {
        let data = vec![1u8, 2, 3, 4, 5];
        let mut src = RawEssenceSource::vbr(Cursor::new(data), Rational::new(25, 1), vec![2, 3]);
        assert!(src.enable_vbr_index_mode());
        match src.next_chunk(0, 0).unwrap() {
            Chunk::Bytes(b) => assert_eq!(b, vec![1, 2]),
            other => panic!("expected bytes, got {other:?}"),
        }
        match src.next_chunk(0, 0).unwrap() {
            Chunk::Bytes(b) => assert_eq!(b, vec![3, 4, 5]),
            other => panic!("expected bytes, got {other:?}"),
        }
        assert!(matches!(src.next_chunk(0, 0).unwrap(), Chunk::End));
    }

    #[test]
    fn cbr_refuses_vbr_index_mode() {
        let mut src = RawEssenceSource::cbr(Cursor::new(vec![0u8; 4]), Rational::new(25, 1), 4);
        assert!(!src.enable_vbr_index_mode());
    }
}
