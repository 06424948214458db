//! Format auto-detection over a leading slice of essence bytes.
//!
//! No concrete sniffers ship in this crate; downstream codec crates
//! register their own against a stream's first bytes.

use crate::source::EssenceSource;

/// Recognises a specific essence wire format from its leading bytes and
/// wraps a reader into the matching [`EssenceSource`].
pub trait FormatSniffer {
    /// Whether `header` (the stream's first bytes, at least as many as
    /// this sniffer needs) is recognised.
    fn can_parse(&self, header: &[u8]) -> bool;

    /// A short identifier for diagnostics (e.g. the essence coding name).
    fn name(&self) -> &str;

    /// Build an [`EssenceSource`] over `reader`, having already confirmed
    /// `can_parse` on its leading bytes.
    fn open(&self, reader: Box<dyn std::io::Read + Send>) -> crate::error::Result<Box<dyn EssenceSource>>;
}

/// Tries each registered sniffer in order, returning the first match.
#[derive(Default)]
pub struct SnifferRegistry {
    sniffers: Vec<Box<dyn FormatSniffer>>,
}

impl SnifferRegistry {
    pub fn new() -> Self {
        Self { sniffers: Vec::new() }
    }

    pub fn register(&mut self, sniffer: Box<dyn FormatSniffer>) {
        self.sniffers.push(sniffer);
    }

    pub fn find(&self, header: &[u8]) -> Option<&dyn FormatSniffer> {
        self.sniffers
            .iter()
            .map(|s| s.as_ref())
            .find(|s| s.can_parse(header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::source::Chunk;
    use mxf_core::Rational;

    struct FourCcSniffer(&'static [u8; 4]);

    struct StubSource;
    impl EssenceSource for StubSource {
        fn next_chunk(&mut self, _min_size: usize, _max_size: usize) -> Result<Chunk> {
            Ok(Chunk::End)
        }
        fn bytes_per_edit_unit(&self) -> u32 {
            0
        }
        fn can_index(&self) -> bool {
            false
        }
        fn enable_vbr_index_mode(&mut self) -> bool {
            false
        }
        fn edit_rate(&self) -> Rational {
            Rational::new(25, 1)
        }
    }

    impl FormatSniffer for FourCcSniffer {
        fn can_parse(&self, header: &[u8]) -> bool {
            header.starts_with(self.0)
        }
        fn name(&self) -> &str {
            "fourcc-stub"
        }
        fn open(&self, _reader: Box<dyn std::io::Read + Send>) -> Result<Box<dyn EssenceSource>> {
            Ok(Box::new(StubSource))
        }
    }

    #[test]
    fn registry_finds_matching_sniffer() {
        let mut reg = SnifferRegistry::new();
        reg.register(Box::new(FourCcSniffer(b"RIFF")));
        reg.register(Box::new(FourCcSniffer(b"FLAC")));

        assert_eq!(reg.find(b"FLAC....").unwrap().name(), "fourcc-stub");
        assert!(reg.find(b"nope").is_none());
    }
}
