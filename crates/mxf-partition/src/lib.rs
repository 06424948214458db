//! Partition Pack codec ([`partition`]) and Random Index Pack traversal
//! ([`rip`]).

pub mod partition;
pub mod rip;

pub use partition::{classify_ul, partition_ul, read_partition, PartitionKind, PartitionPack, PartitionStatus};
pub use rip::{RandomIndexPack, RipEntry, RIP_UL};
