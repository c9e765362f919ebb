mod confirm;
mod progress;
mod summary;

pub use confirm::confirm;
pub use progress::ProgressLine;
pub use summary::{print_entries, print_operation_summary, print_report_header, print_scan_summary};

/// Shorten a string to `max` chars, keeping the tail, which is the part of a path that matters
pub fn truncate_start(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 3 {
        return ".".repeat(max);
    }
    let tail: String = s.chars().skip(len - (max - 3)).collect();
    format!("...{tail}")
}
