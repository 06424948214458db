#![no_main]

use libfuzzer_sys::fuzz_target;
use mxf_core::primitives::Reader;
use mxf_klv::read_klv;

fuzz_target!(|data: &[u8]| {
    let mut r = Reader::new(data, "fuzz");
    let _ = read_klv(&mut r);
});
