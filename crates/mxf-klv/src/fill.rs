//! KLVFill items: alignment padding to a KAG (KLV Alignment Grid) boundary.

use crate::klv::write_klv_sized;
use mxf_core::Ul;

/// KLVFill v2, the modern key. Used unless legacy compatibility is
/// requested.
pub const KLV_FILL_V2: Ul = Ul::new([
    0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x01, 0x03, 0x01, 0x02, 0x10, 0x01, 0x00, 0x00, 0x00,
]);

/// KLVFill v1, the legacy key selected by the `-1` CLI flag / feature flag.
pub const KLV_FILL_V1: Ul = Ul::new([
    0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x02, 0x03, 0x01, 0x02, 0x10, 0x01, 0x00, 0x00, 0x00,
]);

/// Select the KLVFill key for a given legacy mode.
pub fn fill_key(legacy: bool) -> Ul {
    if legacy {
        KLV_FILL_V1
    } else {
        KLV_FILL_V2
    }
}

/// Smallest KLV length (key + BER length-of-length + value) that a filler
/// with `value_len` bytes of padding would occupy, given whether the BER
/// length is forced to 4 bytes.
fn fill_klv_size(value_len: usize, force_four_byte_len: bool) -> usize {
    16 + if force_four_byte_len { 5 } else { mxf_core::ber::ber_len(value_len as u64) } + value_len
}

/// Compute and append a KLVFill sized so that, once written at `current_pos`,
/// the *next* KLV begins on a multiple of `kag` bytes. Returns `0` padding
/// (no filler written) if already aligned or `kag <= 1`.
///
/// Per the design, a filler that must remain patchable (because the
/// partition may be rewritten) forces its BER length field to 4 bytes even
/// when a shorter form would fit.
pub fn align(buf: &mut Vec<u8>, current_pos: u64, kag: u32, legacy: bool, force_four_byte_len: bool) -> u64 {
    if kag <= 1 {
        return 0;
    }
    let kag = kag as u64;

    // Solve for the smallest non-negative `value_len` such that
    // current_pos + fill_klv_size(value_len) is a multiple of kag.
    // fill_klv_size grows by exactly 1 per unit of value_len once the BER
    // form is fixed, so iterate the handful of candidate header sizes.
    let key = fill_key(legacy);
    let header_fixed = 16 + if force_four_byte_len { 5 } else { 1 };
    let mut value_len = {
        let target = kag - ((current_pos + header_fixed as u64) % kag);
        if target == kag { 0 } else { target }
    };

    // If growing the BER length field (short->long form, non-forced case)
    // pushed the total over by exactly enough to need one more byte,
    // recompute once; this only ever needs a single correction because a
    // long-form header is at most 9 bytes vs. 1 for short form.
    loop {
        let total = fill_klv_size(value_len as usize, force_four_byte_len);
        let end = current_pos + total as u64;
        if end % kag == 0 {
            break;
        }
        value_len += kag - (end % kag);
    }

    if value_len == 0 {
        return 0;
    }

    let value = vec![0u8; value_len as usize];
    let len_size = if force_four_byte_len { 5 } else { 0 };
    write_klv_sized(buf, &key, &value, len_size);
    fill_klv_size(value_len as usize, force_four_byte_len) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxf_core::ber::read_ber;
    use mxf_core::primitives::Reader;

    #[test]
    fn aligns_to_kag_boundary() {
        let mut buf = Vec::new();
        let written = align(&mut buf, 500, 512, false, false);
        assert_eq!(buf.len() as u64, written);
        assert_eq!((500 + written) % 512, 0);
    }

    #[test]
    fn already_aligned_writes_nothing() {
        let mut buf = Vec::new();
        let written = align(&mut buf, 1024, 512, false, false);
        assert_eq!(written, 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn forced_four_byte_length_field() {
        let mut buf = Vec::new();
        let written = align(&mut buf, 0, 16, false, true);
        assert!(written > 0);
        let mut r = Reader::new(&buf, "test");
        let _key = r.take(16).unwrap();
        let first = r.take(1).unwrap()[0];
        assert_eq!(first & 0x80, 0x80, "length must use long form");
        assert_eq!(first & 0x7F, 4, "forced to 4 length-of-length bytes");
        let mut r2 = Reader::new(&buf[16..], "test");
        let _ = read_ber(&mut r2).unwrap();
    }
}
