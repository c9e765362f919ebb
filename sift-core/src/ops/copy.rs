//! Copy primitives. None of them ever overwrite an existing destination.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Copy one regular file to `dest`, which must not exist yet.
/// A partially written destination is removed on failure.
pub(crate) fn copy_file(source: &Path, dest: &Path, preserve_modified_time: bool) -> io::Result<u64> {
    let mut reader = File::open(source)?;
    let metadata = reader.metadata()?;
    let mut writer = OpenOptions::new().write(true).create_new(true).open(dest)?;

    let written = (|| -> io::Result<u64> {
        let bytes = io::copy(&mut reader, &mut writer)?;
        if preserve_modified_time && let Ok(mtime) = metadata.modified() {
            writer.set_modified(mtime)?;
        }
        writer.set_permissions(metadata.permissions())?;
        Ok(bytes)
    })();

    if written.is_err() {
        drop(writer);
        let _ = fs::remove_file(dest);
    }
    written
}

/// Recreate a symlink at `dest` pointing where `source` points
#[cfg(unix)]
pub(crate) fn copy_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    let target = fs::read_link(source)?;
    std::os::unix::fs::symlink(target, dest)
}

/// Non-Unix: symlinks need elevated rights to create, so copy what they point at
#[cfg(not(unix))]
pub(crate) fn copy_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    copy_file(source, dest, true).map(|_| ())
}

/// Copy a directory tree to `dest`, which must not exist yet.
///
/// Either the whole tree lands or nothing does: on any failure the
/// destination root is removed again. Errors name the inner path that failed.
pub(crate) fn copy_tree(source: &Path, dest: &Path, preserve_modified_time: bool) -> io::Result<u64> {
    fs::create_dir(dest)?;

    match copy_dir_contents(source, dest, preserve_modified_time) {
        Ok(bytes) => {
            copy_dir_permissions(source, dest);
            Ok(bytes)
        }
        Err(e) => {
            let _ = fs::remove_dir_all(dest);
            Err(e)
        }
    }
}

fn copy_dir_contents(source: &Path, dest: &Path, preserve_modified_time: bool) -> io::Result<u64> {
    let mut total = 0;

    for child in fs::read_dir(source).map_err(|e| at(source, e))? {
        let child = child.map_err(|e| at(source, e))?;
        let from = child.path();
        let to = dest.join(child.file_name());
        let file_type = child.file_type().map_err(|e| at(&from, e))?;

        if file_type.is_symlink() {
            copy_symlink(&from, &to).map_err(|e| at(&from, e))?;
        } else if file_type.is_dir() {
            fs::create_dir(&to).map_err(|e| at(&to, e))?;
            total += copy_dir_contents(&from, &to, preserve_modified_time)?;
            // After the contents, so a read-only source dir does not block its own copy
            copy_dir_permissions(&from, &to);
        } else if file_type.is_file() {
            total += copy_file(&from, &to, preserve_modified_time).map_err(|e| at(&from, e))?;
        } else {
            return Err(at(&from, not_a_regular_file()));
        }
    }

    Ok(total)
}

fn copy_dir_permissions(source: &Path, dest: &Path) {
    if let Ok(permissions) = fs::metadata(source).map(|m| m.permissions()) {
        let _ = fs::set_permissions(dest, permissions);
    }
}

/// FIFOs, sockets and devices: opening them can block or stream forever
pub(crate) fn not_a_regular_file() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "not a regular file")
}

/// Keep the error kind, prefix the message with the path involved
fn at(path: &Path, err: io::Error) -> io::Error {
    io::Error::new(err.kind(), format!("{}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_refuses_existing_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        let dst = temp.path().join("b.txt");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old").unwrap();

        let err = copy_file(&src, &dst, true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "old");
    }

    #[test]
    fn test_copy_file_preserves_mtime() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        let dst = temp.path().join("b.txt");
        fs::write(&src, "content").unwrap();
        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        File::options().write(true).open(&src).unwrap().set_modified(old).unwrap();

        assert_eq!(copy_file(&src, &dst, true).unwrap(), 7);
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), old);
    }

    #[test]
    fn test_copy_tree_preserves_structure() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("a/b")).unwrap();
        fs::write(src.join("top.txt"), "1").unwrap();
        fs::write(src.join("a/mid.txt"), "22").unwrap();
        fs::write(src.join("a/b/deep.txt"), "333").unwrap();
        fs::create_dir(src.join("empty")).unwrap();

        let dst = temp.path().join("dst");
        assert_eq!(copy_tree(&src, &dst, true).unwrap(), 6);

        assert_eq!(fs::read_to_string(dst.join("a/b/deep.txt")).unwrap(), "333");
        assert!(dst.join("empty").is_dir());
    }

    #[test]
    fn test_copy_tree_refuses_existing_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir(&src).unwrap();
        fs::create_dir(&dst).unwrap();
        fs::write(dst.join("keep.txt"), "keep").unwrap();

        let err = copy_tree(&src, &dst, true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(dst.join("keep.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_copies_nested_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("private/inner")).unwrap();
        fs::write(src.join("private/inner/key.txt"), "k").unwrap();
        fs::set_permissions(src.join("private"), fs::Permissions::from_mode(0o700)).unwrap();
        fs::set_permissions(src.join("private/inner"), fs::Permissions::from_mode(0o750)).unwrap();

        let dst = temp.path().join("dst");
        copy_tree(&src, &dst, true).unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&dst.join("private")), 0o700);
        assert_eq!(mode(&dst.join("private/inner")), 0o750);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_refuses_special_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("a.txt"), "a").unwrap();
        let _listener = std::os::unix::net::UnixListener::bind(src.join("agent.sock")).unwrap();

        let dst = temp.path().join("dst");
        let err = copy_tree(&src, &dst, true).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
        assert!(err.to_string().contains("agent.sock"));
        assert!(!dst.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_keeps_symlinks_as_links() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("real.txt"), "x").unwrap();
        std::os::unix::fs::symlink("real.txt", src.join("alias")).unwrap();

        let dst = temp.path().join("dst");
        copy_tree(&src, &dst, false).unwrap();

        let link = fs::symlink_metadata(dst.join("alias")).unwrap();
        assert!(link.file_type().is_symlink());
        assert_eq!(fs::read_link(dst.join("alias")).unwrap(), Path::new("real.txt"));
    }
}
