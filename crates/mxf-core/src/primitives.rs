//! Big-endian primitive reads/writes with explicit bounds checking.
//!
//! MXF is big-endian only on the wire (unlike TIFF/EXIF, which carries an
//! explicit byte-order marker), so there is no [`ByteOrder`]-style enum
//! here — just a small bounds-checked [`Reader`] over a byte slice, in the
//! same spirit as an IFD reader but with one fixed endianness.

use crate::error::{Error, Location, Result};

/// A cursor over a borrowed byte slice that fails loudly (with an offset)
/// instead of panicking on out-of-bounds access.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    source: String,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8], source: impl Into<String>) -> Self {
        Self {
            data,
            pos: 0,
            source: source.into(),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn location(&self) -> Location {
        Location::new(self.pos as u64, self.source.clone())
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::structural(
                self.location(),
                format!("need {n} bytes, have {}", self.remaining()),
            ));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(u64::from_be_bytes(arr))
    }

    pub fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    pub fn i16(&mut self) -> Result<i16> {
        Ok(self.u16()? as i16)
    }

    pub fn i32(&mut self) -> Result<i32> {
        Ok(self.u32()? as i32)
    }

    pub fn array16(&mut self) -> Result<[u8; 16]> {
        let b = self.take(16)?;
        let mut arr = [0u8; 16];
        arr.copy_from_slice(b);
        Ok(arr)
    }

    pub fn array32(&mut self) -> Result<[u8; 32]> {
        let b = self.take(32)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(b);
        Ok(arr)
    }
}

pub fn write_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn write_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn write_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian() {
        let data = [0x00, 0x01, 0x00, 0x00, 0x00, 0x02];
        let mut r = Reader::new(&data, "test");
        assert_eq!(r.u16().unwrap(), 1);
        assert_eq!(r.u32().unwrap(), 2);
    }

    #[test]
    fn take_past_end_errors_with_offset() {
        let data = [0x00];
        let mut r = Reader::new(&data, "test");
        let _ = r.u8().unwrap();
        let err = r.u8().unwrap_err();
        assert!(err.to_string().contains("0x00000001"));
    }
}
