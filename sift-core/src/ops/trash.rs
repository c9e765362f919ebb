use std::io;
use std::path::Path;

/// Where deleted paths go. Deletion in sift is always recoverable, so
/// implementations move paths aside rather than unlinking them.
pub trait Trash: Send + Sync {
    fn trash(&self, path: &Path) -> io::Result<()>;
}

/// The platform trash / recycle bin
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTrash;

impl Trash for SystemTrash {
    fn trash(&self, path: &Path) -> io::Result<()> {
        ::trash::delete(path).map_err(into_io_error)
    }
}

/// Keep the underlying I/O error where the trash crate hands one over; otherwise
/// recover an error kind from the message so the executor can classify it like
/// any other I/O error.
fn into_io_error(err: ::trash::Error) -> io::Error {
    match err {
        #[cfg(all(
            unix,
            not(target_os = "macos"),
            not(target_os = "ios"),
            not(target_os = "android")
        ))]
        ::trash::Error::FileSystem { source, .. } => source,
        #[cfg(windows)]
        ::trash::Error::Os { code, description } => match win32_code(code) {
            Some(raw) => io::Error::from_raw_os_error(raw),
            None => from_message(description),
        },
        other => from_message(other.to_string()),
    }
}

fn from_message(message: String) -> io::Error {
    io::Error::new(kind_from_message(&message), message)
}

/// Win32 error code wrapped in an HRESULT (facility 7), if that is what `hresult` is
#[cfg(windows)]
fn win32_code(hresult: i32) -> Option<i32> {
    let bits = hresult as u32;
    (bits & 0xFFFF_0000 == 0x8007_0000).then_some((bits & 0xFFFF) as i32)
}

fn kind_from_message(message: &str) -> io::ErrorKind {
    let lower = message.to_lowercase();
    let mentions = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if mentions(&["permission", "denied", "not permitted"]) {
        io::ErrorKind::PermissionDenied
    } else if mentions(&["in use", "locked", "busy", "another process"]) {
        io::ErrorKind::ResourceBusy
    } else if mentions(&["not found", "no such file", "does not exist"]) {
        io::ErrorKind::NotFound
    } else if mentions(&["no space", "disk full"]) {
        io::ErrorKind::StorageFull
    } else {
        io::ErrorKind::Other
    }
}
