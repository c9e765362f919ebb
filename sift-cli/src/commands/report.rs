use std::io;
use std::path::PathBuf;

use clap::Args;
use color_eyre::{Result, eyre::eyre};
use sift_core::{SiftError, is_report_stale, load_report, report_path_for};

use super::{Outcome, report_dir, scan_json};
use crate::ui::{print_entries, print_report_header, print_scan_summary};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Directory whose saved report to show
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Directory for saved reports
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// List every entry after the summary
    #[arg(short, long)]
    pub list: bool,

    /// Print the saved result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn report(args: &ReportArgs) -> Result<Outcome> {
    // Reports are keyed by the canonical root, as the scanner records it
    let root = args.root.canonicalize().unwrap_or_else(|_| args.root.clone());
    let path = report_path_for(&root, &report_dir(args.report_dir.as_deref())?);

    let (header, result) = match load_report(&path) {
        Ok(loaded) => loaded,
        Err(SiftError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            return Err(eyre!(
                "No saved report for {}; run `sift scan --save` first",
                root.display()
            ));
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&scan_json(&result)?)?);
    } else {
        print_report_header(&header, is_report_stale(&header));
        print_scan_summary(&result);
        if args.list {
            print_entries(&result);
        }
    }

    Ok(Outcome::Complete)
}
