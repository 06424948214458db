//! Wrapping options: the knobs the CLI surface (`-a`, `-ka=N`, `-pd=N`,
//! `-hp=N`, `-fr=N/D`, ...) ultimately set on the orchestrator.

use mxf_core::{Rational, Ul};
use mxf_index::WireVersion;

/// Target Operational Pattern. OP-Atom is written with an OP1a label
/// until the final header rewrite relabels it, so in-progress files
/// still parse as valid OP1a.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationalPattern {
    Atom,
    Op1a,
    Op1b,
    Op2a,
    Op2b,
}

impl OperationalPattern {
    /// The label to advertise in the partition pack while writing is in
    /// progress; [`Self::Atom`] downgrades to OP1a until relabelled.
    pub fn in_progress_label(self) -> Ul {
        match self {
            OperationalPattern::Atom | OperationalPattern::Op1a => OP1A_LABEL,
            OperationalPattern::Op1b => OP1B_LABEL,
            OperationalPattern::Op2a => OP2A_LABEL,
            OperationalPattern::Op2b => OP2B_LABEL,
        }
    }

    /// The label to finalize the header with once writing completes.
    pub fn final_label(self) -> Ul {
        match self {
            OperationalPattern::Atom => OP_ATOM_LABEL,
            other => other.in_progress_label(),
        }
    }
}

const fn op_label(qualifier: u8, item_complexity: u8, package_complexity: u8) -> Ul {
    Ul::new([
        0x06, 0x0E, 0x2B, 0x34, 0x04, 0x01, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, qualifier, item_complexity, package_complexity, 0x00,
    ])
}

pub const OP1A_LABEL: Ul = op_label(0x01, 0x01, 0x01);
pub const OP1B_LABEL: Ul = op_label(0x01, 0x01, 0x02);
pub const OP2A_LABEL: Ul = op_label(0x01, 0x02, 0x01);
pub const OP2B_LABEL: Ul = op_label(0x01, 0x02, 0x02);
/// OP-Atom reuses the OP1a qualifier byte but flags "atom" in the
/// package-complexity byte (0x10).
pub const OP_ATOM_LABEL: Ul = op_label(0x10, 0x01, 0x01);

/// Index placement flags, set from the `-i`/`-ip`/`-is`/`-ii`/`-ii2` CLI
/// switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexFlags {
    pub in_header: bool,
    pub sparse: bool,
    pub sprinkled: bool,
    pub isolated: bool,
    pub very_isolated: bool,
}

/// Body partition boundary mode, set from `-pd=N` / `-ps=N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPartitionMode {
    None,
    Duration(u64),
    Size(u64),
}

#[derive(Debug, Clone)]
pub struct WrapOptions {
    pub op: OperationalPattern,
    pub kag_size: u32,
    pub header_padding: u32,
    pub header_size_floor: u32,
    pub body_partition: BodyPartitionMode,
    pub index: IndexFlags,
    pub edit_rate_override: Option<Rational>,
    pub infer_drop_frame: bool,
    pub rewrite_header_after_footer: bool,
    pub edit_align_partitions: bool,
    pub legacy_klv_fill: bool,
    /// IndexTableSegment wire shape. Readers accept both V10 and V11; this
    /// picks the one this writer emits, defaulting to the current V11
    /// shape with V10 available for interop testing against older readers.
    pub index_wire_version: WireVersion,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            op: OperationalPattern::Op1a,
            kag_size: 1,
            header_padding: 0,
            header_size_floor: 0,
            body_partition: BodyPartitionMode::None,
            index: IndexFlags::default(),
            edit_rate_override: None,
            infer_drop_frame: false,
            rewrite_header_after_footer: false,
            edit_align_partitions: false,
            legacy_klv_fill: false,
            index_wire_version: WireVersion::V11,
        }
    }
}

impl WrapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_op(mut self, op: OperationalPattern) -> Self {
        self.op = op;
        self
    }

    pub fn with_kag_size(mut self, kag_size: u32) -> Self {
        self.kag_size = kag_size;
        self
    }

    pub fn with_body_partition(mut self, mode: BodyPartitionMode) -> Self {
        self.body_partition = mode;
        self
    }

    pub fn with_edit_rate_override(mut self, rate: Rational) -> Self {
        self.edit_rate_override = Some(rate);
        self
    }

    pub fn with_index_wire_version(mut self, version: WireVersion) -> Self {
        self.index_wire_version = version;
        self
    }
}

/// Infer the nominal (rounded-up) integer frame rate and whether the
/// rate implies drop-frame timecode (non-integer rates such as
/// 30000/1001).
pub fn infer_frame_rate(edit_rate: Rational) -> (u32, bool) {
    if edit_rate.denominator == 0 {
        return (0, false);
    }
    let frame_rate = edit_rate.numerator.unsigned_abs() as u64;
    let denom = edit_rate.denominator.unsigned_abs() as u64;
    let nominal = frame_rate.div_ceil(denom.max(1)) as u32;
    let drop_frame = denom > 1;
    (nominal, drop_frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_atom_downgrades_to_op1a_label_while_in_progress() {
        let atom = OperationalPattern::Atom;
        assert_eq!(atom.in_progress_label(), OP1A_LABEL);
        assert_eq!(atom.final_label(), OP_ATOM_LABEL);
        assert_ne!(atom.final_label(), atom.in_progress_label());
    }

    #[test]
    fn infer_frame_rate_flags_drop_frame_for_non_integer_rates() {
        let (rate, drop) = infer_frame_rate(Rational::new(30000, 1001));
        assert_eq!(rate, 30);
        assert!(drop);

        let (rate, drop) = infer_frame_rate(Rational::new(25, 1));
        assert_eq!(rate, 25);
        assert!(!drop);
    }
}
