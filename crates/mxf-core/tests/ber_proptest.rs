use mxf_core::ber::{read_ber, write_ber, write_ber_sized};
use mxf_core::primitives::Reader;
use proptest::prelude::*;

proptest! {
    #[test]
    fn ber_round_trips_any_length(len in any::<u64>()) {
        let mut buf = Vec::new();
        write_ber(&mut buf, len);
        let mut r = Reader::new(&buf, "proptest");
        prop_assert_eq!(read_ber(&mut r).unwrap(), len);
    }

    #[test]
    fn forced_size_round_trips(len in 0u64..1_000_000, size in 1usize..10) {
        let mut buf = Vec::new();
        write_ber_sized(&mut buf, len, size);
        if buf.len() == size {
            let mut r = Reader::new(&buf, "proptest");
            prop_assert_eq!(read_ber(&mut r).unwrap(), len);
        }
    }
}
