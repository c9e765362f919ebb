use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use super::copy::{copy_file, copy_symlink, copy_tree, not_a_regular_file};
use super::trash::{SystemTrash, Trash};
use crate::error::{Result, SiftError};
use crate::model::{FailedEntry, FailureReason, OperationKind, OperationResult};
use crate::scanner::CancellationToken;

/// Batch operation configuration
#[derive(Debug, Clone)]
pub struct OperationConfig {
    /// Copy directory sources recursively; when false they fail with `Unsupported`
    pub copy_directories: bool,
    /// Carry the source modification time over to copies
    pub preserve_modified_time: bool,
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            copy_directories: true,
            preserve_modified_time: true,
        }
    }
}

/// Best-effort batch delete (to trash) and copy.
///
/// Each path is handled on its own: a failure is recorded in the result and
/// the batch moves on. Only precondition violations fail the whole call.
#[derive(Debug)]
pub struct OperationExecutor<T: Trash = SystemTrash> {
    config: OperationConfig,
    trash: T,
    cancel_token: CancellationToken,
}

impl OperationExecutor<SystemTrash> {
    pub fn new(config: OperationConfig) -> Self {
        Self::with_trash(config, SystemTrash)
    }
}

impl Default for OperationExecutor<SystemTrash> {
    fn default() -> Self {
        Self::new(OperationConfig::default())
    }
}

impl<T: Trash> OperationExecutor<T> {
    pub fn with_trash(config: OperationConfig, trash: T) -> Self {
        Self {
            config,
            trash,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// Move every path to the trash
    pub fn delete<P: AsRef<Path>>(&self, paths: &[P]) -> Result<OperationResult> {
        if paths.is_empty() {
            return Err(SiftError::EmptyInput);
        }

        let started = Instant::now();
        let mut result = OperationResult::new(OperationKind::Delete);
        info!(count = paths.len(), "delete started");

        for path in paths {
            if self.cancel_token.is_cancelled() {
                result.cancelled = true;
                break;
            }

            let path = path.as_ref();
            match self.delete_one(path) {
                Ok(()) => {
                    debug!(path = %path.display(), "moved to trash");
                    result.record_success();
                }
                Err(failure) => {
                    debug!(path = %path.display(), reason = ?failure.reason, "delete failed");
                    result.record_failure(failure);
                }
            }
        }

        finish(&mut result, started);
        Ok(result)
    }

    fn delete_one(&self, path: &Path) -> std::result::Result<(), FailedEntry> {
        // symlink_metadata: a dangling link is still something to delete
        if let Err(e) = fs::symlink_metadata(path) {
            return Err(if e.kind() == io::ErrorKind::NotFound {
                FailedEntry::new(
                    path,
                    FailureReason::PathNotFound,
                    format!("File not found: {}", path.display()),
                )
            } else {
                FailedEntry::from_io(path, &e)
            });
        }

        self.trash
            .trash(path)
            .map_err(|e| FailedEntry::from_io(path, &e))
    }

    /// Copy every source into `target_folder`, keeping file names
    pub fn copy<P: AsRef<Path>>(&self, sources: &[P], target_folder: &Path) -> Result<OperationResult> {
        if sources.is_empty() {
            return Err(SiftError::EmptyInput);
        }
        let target = validate_copy(sources, target_folder)?;

        let started = Instant::now();
        let mut result = OperationResult::new(OperationKind::Copy);
        info!(count = sources.len(), target = %target.display(), "copy started");

        for source in sources {
            if self.cancel_token.is_cancelled() {
                result.cancelled = true;
                break;
            }

            let source = source.as_ref();
            match self.copy_one(source, &target) {
                Ok(bytes) => {
                    debug!(source = %source.display(), bytes, "copied");
                    result.record_success();
                }
                Err(failure) => {
                    debug!(source = %source.display(), reason = ?failure.reason, "copy failed");
                    result.record_failure(failure);
                }
            }
        }

        finish(&mut result, started);
        Ok(result)
    }

    fn copy_one(&self, source: &Path, target: &Path) -> std::result::Result<u64, FailedEntry> {
        let metadata = fs::symlink_metadata(source).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                FailedEntry::new(
                    source,
                    FailureReason::PathNotFound,
                    format!("Source not found: {}", source.display()),
                )
            } else {
                FailedEntry::from_io(source, &e)
            }
        })?;

        let Some(file_name) = source.file_name() else {
            return Err(FailedEntry::new(
                source,
                FailureReason::Unknown,
                "Could not determine file name",
            ));
        };
        let dest = target.join(file_name);

        if fs::symlink_metadata(&dest).is_ok() {
            return Err(FailedEntry::new(
                source,
                FailureReason::FileExists,
                format!("File already exists: {}", dest.display()),
            ));
        }

        let copied = if metadata.is_dir() {
            if !self.config.copy_directories {
                return Err(FailedEntry::new(
                    source,
                    FailureReason::Unsupported,
                    format!("{} is a directory and directory copies are disabled", source.display()),
                ));
            }
            let canonical = source.canonicalize().unwrap_or_else(|_| source.to_path_buf());
            if target.starts_with(&canonical) {
                return Err(FailedEntry::new(
                    source,
                    FailureReason::TargetInsideSource,
                    format!("Cannot copy {} into itself", source.display()),
                ));
            }
            copy_tree(source, &dest, self.config.preserve_modified_time)
        } else if metadata.file_type().is_symlink() {
            copy_symlink(source, &dest).map(|()| 0)
        } else if metadata.is_file() {
            copy_file(source, &dest, self.config.preserve_modified_time)
        } else {
            Err(not_a_regular_file())
        };

        copied.map_err(|e| FailedEntry::from_io(source, &e))
    }
}

/// Call-level checks for copy, done before any file is touched.
/// Returns the canonical target folder.
fn validate_copy<P: AsRef<Path>>(sources: &[P], target_folder: &Path) -> Result<PathBuf> {
    match fs::metadata(target_folder) {
        Ok(meta) if meta.is_dir() => {}
        _ => return Err(SiftError::TargetNotFound(target_folder.to_path_buf())),
    }
    let target = target_folder
        .canonicalize()
        .unwrap_or_else(|_| target_folder.to_path_buf());

    for source in sources {
        let source = source.as_ref();
        if parent_folder(source).is_some_and(|parent| parent == target) {
            return Err(SiftError::SameFolder {
                source_path: source.to_path_buf(),
                target,
            });
        }
    }

    Ok(target)
}

/// Canonical parent of a path; the link itself is not resolved
fn parent_folder(path: &Path) -> Option<PathBuf> {
    let parent = path.parent()?;
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    Some(parent.canonicalize().unwrap_or_else(|_| parent.to_path_buf()))
}

fn finish(result: &mut OperationResult, started: Instant) {
    result.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
        operation = ?result.operation,
        succeeded = result.success_count,
        failed = result.failed_count,
        cancelled = result.cancelled,
        duration_ms = result.duration_ms,
        "batch finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Moves "trashed" paths into a holding folder so tests never touch the real trash
    struct HoldingTrash {
        bin: PathBuf,
        seen: Mutex<usize>,
    }

    impl HoldingTrash {
        fn new(bin: PathBuf) -> Self {
            fs::create_dir_all(&bin).unwrap();
            Self {
                bin,
                seen: Mutex::new(0),
            }
        }
    }

    impl Trash for HoldingTrash {
        fn trash(&self, path: &Path) -> io::Result<()> {
            let mut seen = self.seen.lock().unwrap();
            *seen += 1;
            fs::rename(path, self.bin.join(seen.to_string()))
        }
    }

    /// Refuses everything as if another process held the file open
    struct BusyTrash;

    impl Trash for BusyTrash {
        fn trash(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::ResourceBusy, "file is in use"))
        }
    }

    fn executor(temp: &TempDir) -> OperationExecutor<HoldingTrash> {
        OperationExecutor::with_trash(
            OperationConfig::default(),
            HoldingTrash::new(temp.path().join(".bin")),
        )
    }

    #[test]
    fn test_delete_rejects_empty_input() {
        let temp = TempDir::new().unwrap();
        let none: [&Path; 0] = [];
        assert!(matches!(executor(&temp).delete(&none), Err(SiftError::EmptyInput)));
    }

    #[test]
    fn test_delete_partial_failure() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("a.txt");
        let missing = temp.path().join("missing.txt");
        fs::write(&present, "a").unwrap();

        let result = executor(&temp).delete(&[&present, &missing]).unwrap();

        assert_eq!(result.operation, OperationKind::Delete);
        assert_eq!(result.success_count, 1);
        assert_eq!(result.failed_count, 1);
        assert_eq!(result.failed_entries[0].path, missing);
        assert_eq!(result.failed_entries[0].reason, FailureReason::PathNotFound);
        assert_eq!(result.code_of(&result.failed_entries[0]), "FILE_NOT_FOUND");
        assert!(!present.exists());
        assert!(temp.path().join(".bin/1").exists());
    }

    #[test]
    fn test_delete_reports_locked_files() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("open.log");
        fs::write(&file, "busy").unwrap();

        let executor = OperationExecutor::with_trash(OperationConfig::default(), BusyTrash);
        let result = executor.delete(&[&file]).unwrap();

        assert_eq!(result.failed_count, 1);
        assert_eq!(result.failed_entries[0].reason, FailureReason::FileLocked);
        assert_eq!(result.code_of(&result.failed_entries[0]), "FILE_IN_USE");
        assert!(file.exists());
    }

    #[test]
    fn test_delete_counts_every_input() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        fs::write(&a, "").unwrap();
        // The duplicate is already gone by the time it is processed
        let paths = vec![a.clone(), a.clone(), temp.path().join("b")];

        let result = executor(&temp).delete(&paths).unwrap();
        assert_eq!(result.processed(), paths.len());
        assert_eq!(result.success_count, 1);
    }

    #[test]
    fn test_cancelled_delete_stops_early() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        fs::write(&a, "").unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let result = executor(&temp)
            .with_cancellation(token)
            .delete(&[&a])
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.processed(), 0);
        assert!(a.exists());
    }

    #[test]
    fn test_copy_target_not_found() {
        let temp = TempDir::new().unwrap();
        let result = executor(&temp).copy(&["/some/file.txt"], &temp.path().join("nowhere"));
        assert!(matches!(result, Err(SiftError::TargetNotFound(_))));
    }

    #[test]
    fn test_copy_same_folder_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let other = temp.path().join("other");
        fs::create_dir(&src).unwrap();
        fs::create_dir(&other).unwrap();
        fs::write(src.join("f.txt"), "f").unwrap();
        fs::write(other.join("g.txt"), "g").unwrap();

        // g.txt would be copyable, but the whole call is refused up front
        let result = executor(&temp).copy(&[other.join("g.txt"), src.join("f.txt")], &src);

        assert!(matches!(result, Err(SiftError::SameFolder { .. })));
        assert!(!src.join("g.txt").exists());
    }

    #[test]
    fn test_copy_success_and_existing_file() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dest = temp.path().join("dest");
        fs::create_dir(&src).unwrap();
        fs::create_dir(&dest).unwrap();
        fs::write(src.join("new.txt"), "new content").unwrap();
        fs::write(src.join("a.txt"), "source").unwrap();
        fs::write(dest.join("a.txt"), "existing").unwrap();

        let result = executor(&temp)
            .copy(&[src.join("new.txt"), src.join("a.txt"), src.join("gone.txt")], &dest)
            .unwrap();

        assert_eq!(result.operation, OperationKind::Copy);
        assert_eq!(result.success_count, 1);
        assert_eq!(result.failed_count, 2);
        assert_eq!(fs::read_to_string(dest.join("new.txt")).unwrap(), "new content");
        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "existing");

        let reasons: Vec<_> = result.failed_entries.iter().map(|f| f.reason).collect();
        assert_eq!(reasons, vec![FailureReason::FileExists, FailureReason::PathNotFound]);
        assert_eq!(result.code_of(&result.failed_entries[1]), "SOURCE_NOT_FOUND");
    }

    #[test]
    fn test_copy_directory_recursively() {
        let temp = TempDir::new().unwrap();
        let album = temp.path().join("library/album");
        let dest = temp.path().join("backup");
        fs::create_dir_all(album.join("disc1")).unwrap();
        fs::create_dir(&dest).unwrap();
        fs::write(album.join("disc1/track.flac"), "audio").unwrap();

        let result = executor(&temp).copy(&[&album], &dest).unwrap();

        assert_eq!(result.success_count, 1);
        assert_eq!(
            fs::read_to_string(dest.join("album/disc1/track.flac")).unwrap(),
            "audio"
        );
    }

    #[test]
    fn test_copy_directory_disabled() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("library/album");
        let dest = temp.path().join("backup");
        fs::create_dir_all(&dir).unwrap();
        fs::create_dir(&dest).unwrap();

        let config = OperationConfig {
            copy_directories: false,
            ..OperationConfig::default()
        };
        let executor = OperationExecutor::with_trash(config, BusyTrash);
        let result = executor.copy(&[&dir], &dest).unwrap();

        assert_eq!(result.failed_count, 1);
        assert_eq!(result.failed_entries[0].reason, FailureReason::Unsupported);
        assert!(!dest.join("album").exists());
    }

    #[test]
    fn test_copy_directory_into_itself() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("work");
        let inner = dir.join("nested");
        fs::create_dir_all(&inner).unwrap();

        let result = executor(&temp).copy(&[&dir], &inner).unwrap();

        assert_eq!(result.failed_count, 1);
        assert_eq!(
            result.failed_entries[0].reason,
            FailureReason::TargetInsideSource
        );
        assert!(!inner.join("work").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_skips_fifo_without_blocking() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dest = temp.path().join("dest");
        fs::create_dir(&src).unwrap();
        fs::create_dir(&dest).unwrap();
        let pipe = src.join("pipe");
        let made = std::process::Command::new("mkfifo").arg(&pipe).status();
        if !made.is_ok_and(|s| s.success()) {
            eprintln!("skipping: mkfifo unavailable");
            return;
        }
        fs::write(src.join("after.txt"), "after").unwrap();

        // Opening a FIFO for reading waits for a writer; the copy must never get that far
        let sources = vec![pipe.clone(), src.join("after.txt")];
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let executor = OperationExecutor::with_trash(OperationConfig::default(), BusyTrash);
            let _ = tx.send(executor.copy(&sources, &dest));
        });
        let result = rx
            .recv_timeout(std::time::Duration::from_secs(10))
            .expect("copy blocked on a FIFO")
            .unwrap();

        assert_eq!(result.success_count, 1);
        assert_eq!(result.failed_count, 1);
        assert_eq!(result.failed_entries[0].path, pipe);
        assert_eq!(result.failed_entries[0].reason, FailureReason::Unsupported);
        assert_eq!(
            fs::read_to_string(temp.path().join("dest/after.txt")).unwrap(),
            "after"
        );
        assert!(!temp.path().join("dest/pipe").exists());
    }

    #[test]
    fn test_bare_file_name_has_working_directory_as_parent() {
        let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
        assert_eq!(parent_folder(Path::new("Cargo.toml")), Some(cwd.clone()));
        assert_eq!(parent_folder(Path::new("./Cargo.toml")), Some(cwd));
    }

    #[test]
    fn test_relative_source_into_working_directory_is_same_folder() {
        let temp = TempDir::new().unwrap();
        // Test binaries run from the package root, where Cargo.toml lives
        let result = executor(&temp).copy(&["Cargo.toml"], Path::new("."));
        assert!(matches!(result, Err(SiftError::SameFolder { .. })));
    }
}
