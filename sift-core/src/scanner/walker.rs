use std::collections::HashSet;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use chrono::{DateTime, Utc};
use jwalk::WalkDir;
use tracing::{debug, info, warn};

use super::progress::{ProgressSender, ProgressSubscription, ScanProgress, progress_channel};
use crate::error::{Result, SiftError};
use crate::model::{Entry, FailedEntry, FailureReason, ScanResult};

/// Scanner configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
    /// Maximum entry depth to report (None = unlimited)
    pub max_depth: Option<usize>,
    /// Stay on same filesystem (don't cross mount points)
    pub same_filesystem: bool,
    /// Number of parallel directory readers (0 = auto)
    pub num_threads: usize,
    /// Minimum time between progress snapshots
    pub progress_interval: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            max_depth: None,
            same_filesystem: false,
            num_threads: 0, // auto
            progress_interval: Duration::from_millis(100),
        }
    }
}

/// Cancellation token shared between a caller and a running scan or batch
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a scan running on its own thread
#[derive(Debug)]
pub struct ScanHandle {
    inner: JoinHandle<Result<ScanResult>>,
}

impl ScanHandle {
    /// Wait for the scan and take its result
    pub fn join(self) -> Result<ScanResult> {
        self.inner.join().map_err(|_| SiftError::WorkerPanicked)?
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

/// Filesystem scanner
#[derive(Debug, Default)]
pub struct Scanner {
    config: ScanConfig,
    cancel_token: CancellationToken,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan a directory on a background thread.
    /// Returns the progress subscription and a handle that yields the result.
    pub fn scan(self, root_path: PathBuf) -> (ProgressSubscription, ScanHandle) {
        let (tx, rx) = progress_channel();

        let inner = std::thread::spawn(move || self.scan_blocking(&root_path, Some(&tx)));

        (rx, ScanHandle { inner })
    }

    /// Scan on the calling thread
    pub fn scan_blocking(
        &self,
        root_path: &Path,
        progress: Option<&ProgressSender>,
    ) -> Result<ScanResult> {
        let root_path = validate_root(root_path)?;
        info!(root = %root_path.display(), "scan started");

        let mut walk = Walk::new(&self.config, &self.cancel_token, progress, root_path);
        walk.run();
        let result = walk.finish();

        info!(
            root = %result.root_path.display(),
            entries = result.entries.len(),
            failures = result.failed_entries.len(),
            duration_ms = result.duration_ms,
            cancelled = result.cancelled,
            "scan finished"
        );
        Ok(result)
    }
}

/// Fail fast on a root that cannot be walked at all
fn validate_root(root_path: &Path) -> Result<PathBuf> {
    let metadata = std::fs::metadata(root_path).map_err(|e| root_error(root_path, e))?;
    if !metadata.is_dir() {
        return Err(SiftError::NotADirectory(root_path.to_path_buf()));
    }

    // Listing is what the walk needs; metadata alone can succeed without it
    std::fs::read_dir(root_path).map_err(|e| root_error(root_path, e))?;

    Ok(root_path
        .canonicalize()
        .unwrap_or_else(|_| root_path.to_path_buf()))
}

fn root_error(root_path: &Path, err: io::Error) -> SiftError {
    warn!(root = %root_path.display(), "cannot scan root: {err}");
    match err.kind() {
        io::ErrorKind::NotFound => SiftError::PathNotFound(root_path.to_path_buf()),
        io::ErrorKind::PermissionDenied => SiftError::PermissionDenied(root_path.to_path_buf()),
        _ => SiftError::Io(err),
    }
}

/// State of one walk. Owns the result under construction.
struct Walk<'a> {
    config: &'a ScanConfig,
    cancel_token: &'a CancellationToken,
    progress: Option<&'a ProgressSender>,
    result: ScanResult,
    /// Directories that made it into `entries`; children of anything else are dropped
    known_dirs: HashSet<PathBuf>,
    scanned: u64,
    started: Instant,
    last_progress: Instant,
}

impl<'a> Walk<'a> {
    fn new(
        config: &'a ScanConfig,
        cancel_token: &'a CancellationToken,
        progress: Option<&'a ProgressSender>,
        root_path: PathBuf,
    ) -> Self {
        let mut known_dirs = HashSet::new();
        known_dirs.insert(root_path.clone());
        let now = Instant::now();

        Self {
            config,
            cancel_token,
            progress,
            result: ScanResult::empty(root_path),
            known_dirs,
            scanned: 0,
            started: now,
            last_progress: now,
        }
    }

    fn run(&mut self) {
        let root_path = self.result.root_path.clone();
        self.publish(root_path.clone());

        let root_dev = std::fs::metadata(&root_path)
            .map(|m| get_device_id(&m))
            .unwrap_or(0);

        let same_fs = self.config.same_filesystem;
        let walker = WalkDir::new(&root_path)
            .skip_hidden(false)
            .follow_links(self.config.follow_symlinks)
            .sort(true)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                if same_fs {
                    // Drop mount points so the walk never reads across them
                    children.retain(|entry| match entry {
                        Ok(e) if e.file_type.is_dir() => e
                            .metadata()
                            .map(|meta| get_device_id(&meta) == root_dev)
                            .unwrap_or(true),
                        _ => true,
                    });
                }
            });

        let walker = if let Some(depth) = self.config.max_depth {
            walker.max_depth(depth)
        } else {
            walker
        };

        let walker = if self.config.num_threads > 0 {
            walker.parallelism(jwalk::Parallelism::RayonNewPool(self.config.num_threads))
        } else {
            walker
        };

        self.started = Instant::now();

        for entry_result in walker {
            if self.cancel_token.is_cancelled() {
                info!("scan cancelled after {} items", self.scanned);
                self.result.cancelled = true;
                break;
            }

            let mut dir_entry = match entry_result {
                Ok(e) => e,
                Err(e) => {
                    let failure = walk_failure(&e, &root_path);
                    self.fail(failure);
                    continue;
                }
            };

            let path = dir_entry.path();

            // Directories that could not be listed keep their entry; the listing error
            // is recorded separately and the walk carries on with siblings
            if let Some(err) = dir_entry.read_children_error.take() {
                let failure = walk_failure(&err, &path);
                self.fail(failure);
            }

            // Root itself is not an entry
            if dir_entry.depth == 0 {
                continue;
            }

            let parent_path = dir_entry.parent_path.to_path_buf();
            if !self.known_dirs.contains(&parent_path) {
                debug!(path = %path.display(), "skipping child of unrecorded directory");
                continue;
            }

            let metadata = match dir_entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    let failure = walk_failure(&e, &path);
                    self.fail(failure);
                    continue;
                }
            };

            // A followed symlink reports its target's type; otherwise links stay file-like
            let is_directory = metadata.is_dir();
            let modified_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
            let depth = u32::try_from(dir_entry.depth).unwrap_or(u32::MAX);

            let entry = Entry::new(path.clone(), is_directory, metadata.len(), modified_at, depth);

            if is_directory {
                self.known_dirs.insert(path.clone());
            }
            self.result.push_entry(entry);
            self.scanned += 1;
            self.maybe_publish(path);
        }
    }

    fn fail(&mut self, failure: FailedEntry) {
        debug!(
            path = %failure.path.display(),
            reason = ?failure.reason,
            "{}",
            failure.error_message
        );
        let path = failure.path.clone();
        self.result.push_failure(failure);
        self.scanned += 1;
        self.maybe_publish(path);
    }

    fn maybe_publish(&mut self, current: PathBuf) {
        if self.last_progress.elapsed() >= self.config.progress_interval {
            self.publish(current);
        }
    }

    fn publish(&mut self, current: PathBuf) {
        if let Some(tx) = self.progress {
            tx.publish(ScanProgress::new(self.scanned, current));
        }
        self.last_progress = Instant::now();
    }

    fn finish(mut self) -> ScanResult {
        self.result.duration_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.result.completed_at = Utc::now();

        let root_path = self.result.root_path.clone();
        self.publish(root_path);

        self.result
    }
}

/// Turn a walker error into a per-item failure, attributed to the path it names
fn walk_failure(err: &jwalk::Error, fallback: &Path) -> FailedEntry {
    let path = err.path().unwrap_or(fallback).to_path_buf();

    if let Some(ancestor) = err.loop_ancestor() {
        return FailedEntry::new(
            path,
            FailureReason::Unknown,
            format!("Symlink loop back to {}", ancestor.display()),
        );
    }

    let reason = err
        .io_error()
        .map(FailureReason::from_io_error)
        .unwrap_or(FailureReason::Unknown);
    FailedEntry::new(path, reason, err.to_string())
}

/// Get device ID for same-filesystem checks
#[cfg(unix)]
fn get_device_id(metadata: &Metadata) -> u64 {
    metadata.dev()
}

/// Get device ID (non-Unix: not supported, every path looks local)
#[cfg(not(unix))]
fn get_device_id(_metadata: &Metadata) -> u64 {
    0
}
