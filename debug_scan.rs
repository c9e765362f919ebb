// Run with: cargo run --example debug_scan -- /path/to/scan
// Registered in sift-core/Cargo.toml: [[example]] name = "debug_scan" path = "../debug_scan.rs"

use sift_core::{ScanConfig, Scanner};
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    println!("Scanning: {:?}", path);

    let scanner = Scanner::new(ScanConfig::default());
    let (progress, handle) = scanner.scan(path);

    let start = Instant::now();
    let mut last_print = Instant::now();
    let mut last_count = 0u64;
    let mut stuck_count = 0;

    for snapshot in progress {
        let now = Instant::now();

        // Same count across several snapshots usually means one slow directory
        if snapshot.scanned_count == last_count {
            stuck_count += 1;
        } else {
            stuck_count = 0;
        }
        last_count = snapshot.scanned_count;

        if now.duration_since(last_print) > Duration::from_secs(1) || stuck_count > 5 {
            println!(
                "[{:>6.1}s] scanned={:<8} stuck={} path={}",
                start.elapsed().as_secs_f64(),
                snapshot.scanned_count,
                stuck_count,
                snapshot.current_path.display()
            );
            last_print = now;
        }
    }

    match handle.join() {
        Ok(result) => {
            println!(
                "\n[{:>6.1}s] DONE: {} files, {} folders, {} total, {} failures{}",
                start.elapsed().as_secs_f64(),
                result.stats.total_files,
                result.stats.total_folders,
                sift_core::format_size(result.stats.total_size),
                result.failed_entries.len(),
                if result.cancelled { " (cancelled)" } else { "" }
            );
            for failure in result.failed_entries.iter().take(10) {
                println!("  {:?} {}: {}", failure.reason, failure.path.display(), failure.error_message);
            }
        }
        Err(e) => println!("\n[{:>6.1}s] ERROR [{}]: {}", start.elapsed().as_secs_f64(), e.code(), e),
    }
}
