mod ops;
mod report;
mod scan;

pub use ops::{CopyArgs, DeleteArgs, copy, delete};
pub use report::{ReportArgs, report};
pub use scan::{ScanArgs, scan};

use std::path::{Path, PathBuf};

use color_eyre::{Result, eyre::eyre};
use serde_json::{Value, json};
use sift_core::{FailedEntry, OperationResult, ScanResult};

/// How a command ended, mapped to the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything requested was done
    Complete,
    /// The call ran but some items failed or it was cancelled
    Partial,
    /// Nothing ran
    Failed,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Complete => 0,
            Outcome::Failed => 1,
            Outcome::Partial => 2,
        }
    }

    fn partial_if(incomplete: bool) -> Self {
        if incomplete {
            Outcome::Partial
        } else {
            Outcome::Complete
        }
    }
}

/// Where saved reports live: `--report-dir`, else the user cache directory
fn report_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(dir.to_path_buf()),
        None => dirs::cache_dir()
            .map(|dir| dir.join("sift"))
            .ok_or_else(|| eyre!("No cache directory on this platform; pass --report-dir")),
    }
}

pub fn error_json(code: &str, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}

/// Scan result as JSON, with each failure carrying its boundary code
fn scan_json(result: &ScanResult) -> Result<Value> {
    let mut value = serde_json::to_value(result)?;
    add_codes(&mut value, &result.failed_entries, |f| f.reason.code());
    Ok(value)
}

/// Operation result as JSON, with each failure carrying its boundary code
fn operation_json(result: &OperationResult) -> Result<Value> {
    let mut value = serde_json::to_value(result)?;
    add_codes(&mut value, &result.failed_entries, |f| result.code_of(f));
    Ok(value)
}

fn add_codes(value: &mut Value, failures: &[FailedEntry], code: impl Fn(&FailedEntry) -> &'static str) {
    if let Some(entries) = value["failedEntries"].as_array_mut() {
        for (entry, failure) in entries.iter_mut().zip(failures) {
            entry["code"] = json!(code(failure));
        }
    }
}
