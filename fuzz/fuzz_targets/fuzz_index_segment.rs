#![no_main]

use libfuzzer_sys::fuzz_target;
use mxf_index::{IndexTableSegment, WireVersion};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let version = if data[0] & 1 == 0 { WireVersion::V11 } else { WireVersion::V10 };
    let _ = IndexTableSegment::parse_with_version(&data[1..], version, "fuzz");
});
