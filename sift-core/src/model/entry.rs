use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse file-type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Document,
    Image,
    Video,
    Audio,
    Folder,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Document,
        Category::Image,
        Category::Video,
        Category::Audio,
        Category::Folder,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Document => "document",
            Category::Image => "image",
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Folder => "folder",
            Category::Other => "other",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// One file or directory discovered during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Absolute path, unique within a result
    #[serde(with = "crate::model::lossy_path")]
    pub path: PathBuf,
    pub name: String,
    pub is_directory: bool,
    /// Bytes; always 0 for directories
    pub size: u64,
    pub modified_at: DateTime<Utc>,
    pub category: Category,
    /// Lowercase, without the dot; empty for directories
    pub extension: String,
    /// Children of the scan root have depth 1
    pub depth: u32,
    #[serde(with = "crate::model::lossy_path")]
    pub parent_path: PathBuf,
}

impl Entry {
    /// Build an entry, deriving extension and category from the name
    pub fn new(
        path: PathBuf,
        is_directory: bool,
        size: u64,
        modified_at: DateTime<Utc>,
        depth: u32,
    ) -> Self {
        let name = display_name(&path);
        let parent_path = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let extension = if is_directory {
            String::new()
        } else {
            crate::classify::extension_of(&name)
        };
        let category = crate::classify::classify(&name, is_directory);

        Self {
            path,
            name,
            is_directory,
            size: if is_directory { 0 } else { size },
            modified_at,
            category,
            extension,
            depth,
            parent_path,
        }
    }
}

/// Final path component as a lossy string, or the whole path for roots like `/`
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
