#![no_main]

use libfuzzer_sys::fuzz_target;
use mxf_partition::RandomIndexPack;

fuzz_target!(|data: &[u8]| {
    let _ = RandomIndexPack::locate(data, "fuzz");
});
