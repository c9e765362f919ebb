mod entry;
pub(crate) mod lossy_path;
mod result;
mod stats;

pub use entry::{Category, Entry};
pub use result::{FailedEntry, FailureReason, OperationKind, OperationResult, ScanResult};
pub use stats::ScanStats;
