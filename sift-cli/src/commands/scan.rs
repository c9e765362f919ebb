use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;
use sift_core::{ScanConfig, Scanner, report_path_for, save_report};
use tracing::info;

use super::{Outcome, report_dir, scan_json};
use crate::ui::{ProgressLine, print_entries, print_scan_summary};

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to scan (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Maximum depth to report; children of the root are depth 1
    #[arg(short, long)]
    pub max_depth: Option<usize>,

    /// Follow symbolic links
    #[arg(short, long)]
    pub follow_symlinks: bool,

    /// Stay on the root's filesystem
    #[arg(short = 'x', long)]
    pub one_file_system: bool,

    /// Parallel directory readers (0 = auto)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// List every entry after the summary
    #[arg(short, long)]
    pub list: bool,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Save the result as a report for `sift report`
    #[arg(long)]
    pub save: bool,

    /// Directory for saved reports
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

pub fn scan(args: &ScanArgs) -> Result<Outcome> {
    let config = ScanConfig {
        follow_symlinks: args.follow_symlinks,
        max_depth: args.max_depth,
        same_filesystem: args.one_file_system,
        num_threads: args.threads,
        ..ScanConfig::default()
    };

    let (progress, handle) = Scanner::new(config).scan(args.path.clone());

    let mut line = ProgressLine::new(!args.json && std::io::stderr().is_terminal());
    for snapshot in progress {
        line.update(&snapshot);
    }
    line.clear();

    let result = handle.join()?;

    if args.save {
        let dir = report_dir(args.report_dir.as_deref())?;
        let path = report_path_for(&result.root_path, &dir);
        save_report(&path, &result)?;
        info!(path = %path.display(), "report saved");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&scan_json(&result)?)?);
    } else {
        print_scan_summary(&result);
        if args.list {
            print_entries(&result);
        }
    }

    Ok(Outcome::partial_if(result.has_failures() || result.cancelled))
}
