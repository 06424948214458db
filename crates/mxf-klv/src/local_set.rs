//! Local-set entry framing: `{Tag, Length, Value}` headers whose key and
//! length widths are configurable per ClassDef (mirrors mxflib's
//! `DictKeyFormat`/`DictLenFormat`).

use mxf_core::ber::{read_ber, write_ber};
use mxf_core::primitives::{write_u16, write_u32, Reader};
use mxf_core::{Error, Location, Result, Tag};

/// Width/encoding of a local-set child's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    OneByte,
    TwoByte,
    FourByte,
}

/// Width/encoding of a local-set child's length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LenFormat {
    OneByte,
    TwoByte,
    Ber,
    FourByte,
}

/// Read one `{Tag, Length}` header from a local set/pack body. Returns the
/// tag and the declared value length; the caller consumes that many bytes
/// next.
pub fn read_local_tl(r: &mut Reader, key_format: KeyFormat, len_format: LenFormat) -> Result<(Tag, usize)> {
    let offset = r.position() as u64;
    let tag = match key_format {
        KeyFormat::OneByte => Tag(r.u8()? as u16),
        KeyFormat::TwoByte => Tag(r.u16()?),
        KeyFormat::FourByte => Tag((r.u32()? & 0xFFFF) as u16),
    };
    let len = match len_format {
        LenFormat::OneByte => r.u8()? as usize,
        LenFormat::TwoByte => r.u16()? as usize,
        LenFormat::Ber => read_ber(r)? as usize,
        LenFormat::FourByte => r.u32()? as usize,
    };
    if r.remaining() < len {
        return Err(Error::structural(
            Location::new(offset, String::new()),
            format!(
                "local-set entry length {len} exceeds remaining bytes {}",
                r.remaining()
            ),
        ));
    }
    Ok((tag, len))
}

/// Emit a `{Tag, Length}` header for a local-set child.
pub fn write_local_tl(buf: &mut Vec<u8>, tag: Tag, len: usize, key_format: KeyFormat, len_format: LenFormat) {
    match key_format {
        KeyFormat::OneByte => buf.push(tag.0 as u8),
        KeyFormat::TwoByte => write_u16(buf, tag.0),
        KeyFormat::FourByte => write_u32(buf, tag.0 as u32),
    }
    match len_format {
        LenFormat::OneByte => buf.push(len as u8),
        LenFormat::TwoByte => write_u16(buf, len as u16),
        LenFormat::Ber => write_ber(buf, len as u64),
        LenFormat::FourByte => write_u32(buf, len as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_byte_ber_round_trip() {
        let mut buf = Vec::new();
        write_local_tl(&mut buf, Tag(0x0102), 5, KeyFormat::TwoByte, LenFormat::Ber);
        buf.extend_from_slice(b"hello");
        let mut r = Reader::new(&buf, "test");
        let (tag, len) = read_local_tl(&mut r, KeyFormat::TwoByte, LenFormat::Ber).unwrap();
        assert_eq!(tag, Tag(0x0102));
        assert_eq!(len, 5);
        assert_eq!(r.take(len).unwrap(), b"hello");
    }

    #[test]
    fn one_byte_key_one_byte_len() {
        let mut buf = Vec::new();
        write_local_tl(&mut buf, Tag(0x0A), 2, KeyFormat::OneByte, LenFormat::OneByte);
        assert_eq!(buf, vec![0x0A, 2]);
    }
}
