//! Filesystem scanning with per-file classification, plus best-effort batch
//! delete (to trash) and copy.

pub mod classify;
pub mod error;
pub mod model;
pub mod ops;
pub mod report;
pub mod scanner;
pub mod size;

pub use classify::{classify, classify_extension, extension_of};
pub use error::{Result, SiftError};
pub use model::{
    Category, Entry, FailedEntry, FailureReason, OperationKind, OperationResult, ScanResult,
    ScanStats,
};
pub use ops::{OperationConfig, OperationExecutor, SystemTrash, Trash};
pub use report::{ReportHeader, is_report_stale, load_report, report_path_for, save_report};
pub use scanner::{
    CancellationToken, ProgressSender, ProgressSubscription, ScanConfig, ScanHandle, ScanProgress,
    Scanner, progress_channel,
};
pub use size::{format_count, format_duration_ms, format_size, percentage};
