use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::Entry;
use super::stats::ScanStats;

/// Why a single item could not be scanned or operated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    PermissionDenied,
    /// Held open or locked by another process
    FileLocked,
    PathNotFound,
    /// Destination name already taken; copies never overwrite
    FileExists,
    InsufficientSpace,
    /// Copying a directory into its own subtree
    TargetInsideSource,
    /// Directory copy while directory copies are disabled
    Unsupported,
    Unknown,
}

impl FailureReason {
    /// Classify an I/O error by its kind
    pub fn from_io_error(err: &io::Error) -> Self {
        #[cfg(windows)]
        {
            // ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
            if matches!(err.raw_os_error(), Some(32) | Some(33)) {
                return FailureReason::FileLocked;
            }
        }

        match err.kind() {
            io::ErrorKind::NotFound => FailureReason::PathNotFound,
            io::ErrorKind::PermissionDenied => FailureReason::PermissionDenied,
            io::ErrorKind::AlreadyExists => FailureReason::FileExists,
            io::ErrorKind::StorageFull => FailureReason::InsufficientSpace,
            io::ErrorKind::ResourceBusy => FailureReason::FileLocked,
            io::ErrorKind::Unsupported => FailureReason::Unsupported,
            _ => FailureReason::Unknown,
        }
    }

    /// Boundary code in a scan context
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::PermissionDenied => "PERMISSION_DENIED",
            FailureReason::FileLocked => "FILE_LOCKED",
            FailureReason::PathNotFound => "PATH_NOT_FOUND",
            FailureReason::FileExists => "FILE_EXISTS",
            FailureReason::InsufficientSpace => "INSUFFICIENT_SPACE",
            FailureReason::TargetInsideSource => "TARGET_INSIDE_SOURCE",
            FailureReason::Unsupported => "UNSUPPORTED",
            FailureReason::Unknown => "UNKNOWN",
        }
    }

    /// Boundary code in the context of a batch operation
    pub fn code_for(&self, operation: OperationKind) -> &'static str {
        match (self, operation) {
            (FailureReason::PathNotFound, OperationKind::Delete) => "FILE_NOT_FOUND",
            (FailureReason::PathNotFound, OperationKind::Copy) => "SOURCE_NOT_FOUND",
            (FailureReason::FileLocked, _) => "FILE_IN_USE",
            (reason, _) => reason.code(),
        }
    }
}

/// A path that could not be stat'd, read, or operated on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedEntry {
    #[serde(with = "crate::model::lossy_path")]
    pub path: PathBuf,
    pub reason: FailureReason,
    pub error_message: String,
}

impl FailedEntry {
    pub fn new(path: impl Into<PathBuf>, reason: FailureReason, error_message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason,
            error_message: error_message.into(),
        }
    }

    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        Self::new(path, FailureReason::from_io_error(err), err.to_string())
    }
}

/// Everything a single `scan` call produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Canonicalized root; not itself part of `entries`
    #[serde(with = "crate::model::lossy_path")]
    pub root_path: PathBuf,
    pub entries: Vec<Entry>,
    pub stats: ScanStats,
    pub failed_entries: Vec<FailedEntry>,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
    /// Set when a cancellation token cut the walk short
    pub cancelled: bool,
}

impl ScanResult {
    pub(crate) fn empty(root_path: PathBuf) -> Self {
        Self {
            root_path,
            entries: Vec::new(),
            stats: ScanStats::new(),
            failed_entries: Vec::new(),
            duration_ms: 0,
            completed_at: DateTime::<Utc>::UNIX_EPOCH,
            cancelled: false,
        }
    }

    pub(crate) fn push_entry(&mut self, entry: Entry) {
        self.stats.record(&entry);
        self.entries.push(entry);
    }

    pub(crate) fn push_failure(&mut self, failure: FailedEntry) {
        self.failed_entries.push(failure);
    }

    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| !e.is_directory)
    }

    pub fn folders(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_directory)
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Delete,
    Copy,
}

/// Outcome of one delete or copy batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub operation: OperationKind,
    pub success_count: usize,
    pub failed_count: usize,
    pub failed_entries: Vec<FailedEntry>,
    pub duration_ms: u64,
    pub cancelled: bool,
}

impl OperationResult {
    pub(crate) fn new(operation: OperationKind) -> Self {
        Self {
            operation,
            success_count: 0,
            failed_count: 0,
            failed_entries: Vec::new(),
            duration_ms: 0,
            cancelled: false,
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub(crate) fn record_failure(&mut self, failure: FailedEntry) {
        self.failed_count += 1;
        self.failed_entries.push(failure);
    }

    /// Number of input paths this result accounts for
    pub fn processed(&self) -> usize {
        self.success_count + self.failed_count
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed_count == 0 && !self.cancelled
    }

    /// Boundary code for one of this result's failures
    pub fn code_of(&self, failure: &FailedEntry) -> &'static str {
        failure.reason.code_for(self.operation)
    }
}
