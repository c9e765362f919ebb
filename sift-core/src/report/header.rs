use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ScanResult;

/// Current report format version - increment when the layout or any persisted type changes
pub const REPORT_VERSION: u32 = 1;

/// Magic bytes identifying a sift report file
pub const REPORT_MAGIC: [u8; 4] = *b"SIFT";

/// Summary stored ahead of the result, readable without decoding every entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportHeader {
    pub version: u32,
    /// Canonical root the report describes
    #[serde(with = "crate::model::lossy_path")]
    pub root_path: PathBuf,
    pub saved_at: DateTime<Utc>,
    /// Root directory mtime when the report was saved
    pub root_modified: Option<DateTime<Utc>>,
    pub entry_count: u64,
    pub failure_count: u64,
    pub total_size: u64,
    pub cancelled: bool,
}

impl ReportHeader {
    pub fn for_result(result: &ScanResult) -> Self {
        Self {
            version: REPORT_VERSION,
            root_path: result.root_path.clone(),
            saved_at: Utc::now(),
            root_modified: super::root_mtime(&result.root_path),
            entry_count: result.entries.len() as u64,
            failure_count: result.failed_entries.len() as u64,
            total_size: result.stats.total_size,
            cancelled: result.cancelled,
        }
    }
}
