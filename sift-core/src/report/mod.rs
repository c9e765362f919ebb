//! Persisting a finished scan so it can be inspected later without rescanning.

mod header;

pub use header::{REPORT_MAGIC, REPORT_VERSION, ReportHeader};

use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Result, SiftError};
use crate::model::ScanResult;

/// Report file location for a scan root inside `report_dir`
pub fn report_path_for(root: &Path, report_dir: &Path) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    root.hash(&mut hasher);
    report_dir.join(format!("{:016x}.sift", hasher.finish()))
}

/// Save a scan result with its header.
///
/// File format:
/// [4B] Magic "SIFT"
/// [4B] Version (u32 LE)
/// [4B] Header length (u32 LE)
/// [NB] Header (postcard)
/// [4B] Result length (u32 LE)
/// [MB] Result (postcard)
/// [4B] CRC32 of all preceding bytes
pub fn save_report(path: &Path, result: &ScanResult) -> Result<ReportHeader> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let header = ReportHeader::for_result(result);

    let mut data = Vec::new();
    data.extend_from_slice(&REPORT_MAGIC);
    data.extend_from_slice(&REPORT_VERSION.to_le_bytes());
    push_section(&mut data, &header, "header")?;
    push_section(&mut data, result, "result")?;
    let checksum = crc32fast::hash(&data);
    data.extend_from_slice(&checksum.to_le_bytes());

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;
    file.write_all(&data)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&temp_path, path)?;

    debug!(path = %path.display(), bytes = data.len(), "report saved");
    Ok(header)
}

/// Load a report written by [`save_report`]
pub fn load_report(path: &Path) -> Result<(ReportHeader, ScanResult)> {
    let mut data = Vec::new();
    File::open(path)?.read_to_end(&mut data)?;

    // magic + version + two length prefixes + checksum
    if data.len() < 20 {
        return Err(report_error("Report file too small"));
    }

    let (body, stored) = data.split_at(data.len() - 4);
    let stored = u32::from_le_bytes([stored[0], stored[1], stored[2], stored[3]]);
    if stored != crc32fast::hash(body) {
        return Err(report_error("Report checksum mismatch"));
    }

    let mut reader = Sections { data: body, offset: 0 };

    if reader.take(4)? != REPORT_MAGIC {
        return Err(report_error("Invalid report magic"));
    }
    let version = reader.read_u32()?;
    if version != REPORT_VERSION {
        return Err(report_error(format!(
            "Report version mismatch: expected {REPORT_VERSION}, got {version}"
        )));
    }

    let header: ReportHeader = reader.read_section("header")?;
    let result: ScanResult = reader.read_section("result")?;
    Ok((header, result))
}

/// Whether the root directory changed (or vanished) since the report was saved.
///
/// Only the root's own mtime is checked, so changes deep in the tree go unnoticed.
pub fn is_report_stale(header: &ReportHeader) -> bool {
    match (root_mtime(&header.root_path), header.root_modified) {
        (Some(now), Some(then)) => now != then,
        _ => true,
    }
}

pub(crate) fn root_mtime(root: &Path) -> Option<DateTime<Utc>> {
    let modified = fs::metadata(root).ok()?.modified().ok()?;
    Some(modified.into())
}

fn push_section<T: serde::Serialize + ?Sized>(data: &mut Vec<u8>, value: &T, what: &str) -> Result<()> {
    let bytes = postcard::to_allocvec(value)
        .map_err(|e| report_error(format!("Failed to serialize {what}: {e}")))?;
    let len = u32::try_from(bytes.len())
        .map_err(|_| report_error(format!("Report {what} too large")))?;
    data.extend_from_slice(&len.to_le_bytes());
    data.extend_from_slice(&bytes);
    Ok(())
}

struct Sections<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Sections<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| report_error("Invalid section length"))?;
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_section<T: serde::de::DeserializeOwned>(&mut self, what: &str) -> Result<T> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        postcard::from_bytes(bytes)
            .map_err(|e| report_error(format!("Failed to deserialize {what}: {e}")))
    }
}

fn report_error(message: impl Into<String>) -> SiftError {
    SiftError::Report(message.into())
}
