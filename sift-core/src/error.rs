use std::path::PathBuf;
use thiserror::Error;

/// Call-level failures: a precondition was violated before any work started.
///
/// Per-item problems found during a walk or a batch are never reported
/// through this type; they end up as [`crate::FailedEntry`] values inside
/// the returned result.
#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Target folder does not exist or is not a directory: {0}")]
    TargetNotFound(PathBuf),

    #[error("Source {source_path} is already in target folder {target}")]
    SameFolder {
        source_path: PathBuf,
        target: PathBuf,
    },

    #[error("No paths were given")]
    EmptyInput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report error: {0}")]
    Report(String),

    #[error("Worker thread panicked")]
    WorkerPanicked,
}

impl SiftError {
    /// Stable code used when the error crosses the process boundary.
    pub fn code(&self) -> &'static str {
        match self {
            SiftError::PathNotFound(_) => "PATH_NOT_FOUND",
            SiftError::NotADirectory(_) => "NOT_A_DIRECTORY",
            SiftError::PermissionDenied(_) => "PERMISSION_DENIED",
            SiftError::TargetNotFound(_) => "TARGET_NOT_FOUND",
            SiftError::SameFolder { .. } => "SAME_FOLDER",
            SiftError::EmptyInput => "EMPTY_INPUT",
            SiftError::Io(_) => "IO_ERROR",
            SiftError::Report(_) => "REPORT_ERROR",
            SiftError::WorkerPanicked => "INTERNAL",
        }
    }
}

pub type Result<T> = std::result::Result<T, SiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(SiftError::EmptyInput.code(), "EMPTY_INPUT");
        assert_eq!(
            SiftError::SameFolder {
                source_path: PathBuf::from("/src/f.txt"),
                target: PathBuf::from("/src"),
            }
            .code(),
            "SAME_FOLDER"
        );
        assert_eq!(
            SiftError::NotADirectory(PathBuf::from("/a")).code(),
            "NOT_A_DIRECTORY"
        );
    }
}
