#![no_main]

use libfuzzer_sys::fuzz_target;
use mxf_core::primitives::Reader;
use mxf_klv::read_klv;
use mxf_partition::PartitionPack;

fuzz_target!(|data: &[u8]| {
    let mut r = Reader::new(data, "fuzz");
    if let Ok(klv) = read_klv(&mut r) {
        let _ = PartitionPack::from_klv(&klv, "fuzz");
    }
});
