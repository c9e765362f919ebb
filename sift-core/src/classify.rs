//! File-type classification by extension.

use std::path::Path;

use crate::model::Category;

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "rtf", "csv",
    "md", "json", "xml", "html", "htm", "epub",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "ico", "tiff", "tif", "raw", "heic", "heif",
    "avif",
];

// "ts" is treated as MPEG transport stream, not TypeScript
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v", "mpeg", "mpg", "3gp", "ts",
];

const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "m4a", "wma", "aiff", "alac", "opus",
];

/// Map a name to its category. Directories are always [`Category::Folder`].
pub fn classify(name: &str, is_directory: bool) -> Category {
    if is_directory {
        return Category::Folder;
    }
    classify_extension(&extension_of(name))
}

/// Map a bare extension (no dot, any case) to its category
pub fn classify_extension(extension: &str) -> Category {
    let ext = extension.to_ascii_lowercase();
    let ext = ext.as_str();

    if DOCUMENT_EXTENSIONS.contains(&ext) {
        Category::Document
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        Category::Image
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        Category::Video
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        Category::Audio
    } else {
        Category::Other
    }
}

/// Lowercase extension without the dot. Dotfiles such as `.bashrc` have none.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(classify("report.PDF", false), Category::Document);
        assert_eq!(classify("PHOTO.JPG", false), Category::Image);
        assert_eq!(classify("photo.jpg", false), Category::Image);
        assert_eq!(classify("clip.mkv", false), Category::Video);
        assert_eq!(classify("song.Flac", false), Category::Audio);
        assert_eq!(classify("setup.exe", false), Category::Other);
        assert_eq!(classify("Makefile", false), Category::Other);
    }

    #[test]
    fn test_directories_are_folders() {
        assert_eq!(classify("photos.jpg", true), Category::Folder);
        assert_eq!(classify("music", true), Category::Folder);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("file.txt"), "txt");
        assert_eq!(extension_of("file.TXT"), "txt");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("file"), "");
        assert_eq!(extension_of("file."), "");
        assert_eq!(extension_of(".bashrc"), "");
    }

    proptest! {
        #[test]
        fn classification_ignores_case(stem in "[a-zA-Z0-9_]{1,12}", ext in "[a-zA-Z0-9]{1,5}") {
            let lower = format!("{stem}.{}", ext.to_lowercase());
            let upper = format!("{stem}.{}", ext.to_uppercase());
            prop_assert_eq!(classify(&lower, false), classify(&upper, false));
        }

        #[test]
        fn files_never_classify_as_folder(name in "\\PC{0,24}") {
            prop_assert_ne!(classify(&name, false), Category::Folder);
        }
    }
}
