//! Top-level KLV triples: 16-byte UL key + BER length + value.

use mxf_core::ber::{read_ber, write_ber_sized};
use mxf_core::primitives::Reader;
use mxf_core::{Error, Location, Result, Ul};

/// A parsed KLV triple. `value` borrows from the reader's backing slice so
/// callers that only need the key (e.g. to decide whether to skip) avoid a
/// copy.
#[derive(Debug, Clone, Copy)]
pub struct Klv<'a> {
    pub key: Ul,
    pub offset: u64,
    pub value: &'a [u8],
}

/// Read one KLV: 16-byte key, BER length, then exactly that many value
/// bytes. A length that would run past the end of `r`'s backing slice is a
/// structural error carrying the offset where the KLV began.
pub fn read_klv<'a>(r: &mut Reader<'a>) -> Result<Klv<'a>> {
    let offset = r.position() as u64;
    let key = Ul::new(r.array16()?);
    let len = read_ber(r)? as usize;
    if r.remaining() < len {
        return Err(Error::structural(
            Location::new(offset, String::new()),
            format!(
                "KLV value length {len} exceeds remaining bytes {}",
                r.remaining()
            ),
        ));
    }
    let value = r.take(len)?;
    Ok(Klv { key, offset, value })
}

/// Emit a KLV with the shortest valid BER length encoding.
pub fn write_klv(buf: &mut Vec<u8>, key: &Ul, value: &[u8]) {
    write_klv_sized(buf, key, value, 0)
}

/// Emit a KLV forcing the BER length field to `len_size` bytes (0 = shortest
/// valid form). Used when the value will be patched in place later and the
/// length field must not change size.
pub fn write_klv_sized(buf: &mut Vec<u8>, key: &Ul, value: &[u8], len_size: usize) {
    buf.extend_from_slice(key.as_bytes());
    write_ber_sized(buf, value.len() as u64, len_size);
    buf.extend_from_slice(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ul() -> Ul {
        Ul::new([
            0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x02,
            0x01, 0x00,
        ])
    }

    #[test]
    fn round_trip() {
        let key = sample_ul();
        let mut buf = Vec::new();
        write_klv(&mut buf, &key, b"hello");
        let mut r = Reader::new(&buf, "test");
        let klv = read_klv(&mut r).unwrap();
        assert_eq!(klv.key, key);
        assert_eq!(klv.value, b"hello");
        assert_eq!(klv.offset, 0);
    }

    #[test]
    fn truncated_length_is_structural_error() {
        let key = sample_ul();
        let mut buf = Vec::new();
        buf.extend_from_slice(key.as_bytes());
        buf.push(10); // claims 10 bytes of value
        buf.extend_from_slice(b"abc"); // only 3 present
        let mut r = Reader::new(&buf, "test");
        let err = read_klv(&mut r).unwrap_err();
        assert!(err.to_string().contains("0x00000000"));
    }
}
