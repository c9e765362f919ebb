use sift_core::{
    Category, FailedEntry, OperationKind, OperationResult, ReportHeader, ScanResult, format_count,
    format_duration_ms, format_size, percentage,
};

/// Failures listed individually before the rest are summarized
const MAX_FAILURES_SHOWN: usize = 20;

pub fn print_scan_summary(result: &ScanResult) {
    let stats = &result.stats;
    println!("{}", result.root_path.display());
    println!(
        "  {} files, {} folders, {} in {}{}",
        format_count(stats.total_files),
        format_count(stats.total_folders),
        format_size(stats.total_size),
        format_duration_ms(result.duration_ms),
        if result.cancelled { " (cancelled)" } else { "" }
    );
    println!();

    for category in Category::ALL {
        if category == Category::Folder {
            continue;
        }
        let count = stats.count_for(category);
        println!(
            "  {:<10} {:>12}  {:>5.1}%",
            category.label(),
            format_count(count),
            percentage(count, stats.total_files)
        );
    }

    print_failures(&result.failed_entries, |f| f.reason.code());
}

/// One line per entry: size, category, path
pub fn print_entries(result: &ScanResult) {
    println!();
    for entry in &result.entries {
        let size = if entry.is_directory {
            "-".to_string()
        } else {
            format_size(entry.size)
        };
        println!("{size:>10}  {:<8}  {}", entry.category.label(), entry.path.display());
    }
}

pub fn print_operation_summary(result: &OperationResult) {
    let verb = match result.operation {
        OperationKind::Delete => "Moved to trash",
        OperationKind::Copy => "Copied",
    };
    println!(
        "{verb}: {} succeeded, {} failed in {}{}",
        format_count(result.success_count as u64),
        format_count(result.failed_count as u64),
        format_duration_ms(result.duration_ms),
        if result.cancelled { " (cancelled)" } else { "" }
    );
    print_failures(&result.failed_entries, |f| result.code_of(f));
}

pub fn print_report_header(header: &ReportHeader, stale: bool) {
    println!(
        "Report saved {} ({} entries, {} failures)",
        header.saved_at.format("%Y-%m-%d %H:%M:%S UTC"),
        format_count(header.entry_count),
        format_count(header.failure_count)
    );
    if stale {
        println!("  The directory has changed since; rescan for current numbers.");
    }
    println!();
}

fn print_failures(failures: &[FailedEntry], code: impl Fn(&FailedEntry) -> &'static str) {
    if failures.is_empty() {
        return;
    }

    println!();
    println!("  {} failed:", format_count(failures.len() as u64));
    for failure in failures.iter().take(MAX_FAILURES_SHOWN) {
        println!(
            "    {:<20} {}: {}",
            code(failure),
            failure.path.display(),
            failure.error_message
        );
    }
    if failures.len() > MAX_FAILURES_SHOWN {
        println!("    ... and {} more", failures.len() - MAX_FAILURES_SHOWN);
    }
}
