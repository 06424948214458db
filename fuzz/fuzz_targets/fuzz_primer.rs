#![no_main]

use libfuzzer_sys::fuzz_target;
use mxf_model::Primer;

fuzz_target!(|data: &[u8]| {
    let _ = Primer::parse(data, "fuzz");
});
