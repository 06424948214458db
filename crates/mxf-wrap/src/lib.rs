//! Wrapping orchestrator: builds the structural metadata graph for a
//! set of essence inputs, then drives header, body and footer
//! partitions (plus the trailing Random Index Pack) out to a writer.

pub mod error;
pub mod graph;
pub mod options;
pub mod orchestrator;

pub use error::{Error, Result};
pub use graph::{build_file_package, build_material_package, make_link, TrackSpec};
pub use options::{infer_frame_rate, BodyPartitionMode, IndexFlags, OperationalPattern, WrapOptions};
pub use orchestrator::{Wrapper, WrappingOption};
