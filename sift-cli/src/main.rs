mod commands;
mod logging;
mod ui;

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::Result;
use sift_core::SiftError;

use commands::{CopyArgs, DeleteArgs, Outcome, ReportArgs, ScanArgs};

/// SIFT - scan a folder, see what is in it, then trash or copy files in bulk
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(about = "Scan a directory tree, classify its files, and trash or copy them in bulk")]
#[command(version)]
struct Args {
    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recursively scan a directory
    Scan(ScanArgs),
    /// Move files or folders to the trash
    Delete(DeleteArgs),
    /// Copy files or folders into a target directory
    Copy(CopyArgs),
    /// Show the saved report for a previously scanned directory
    Report(ReportArgs),
}

impl Command {
    fn json(&self) -> bool {
        match self {
            Command::Scan(args) => args.json,
            Command::Delete(args) => args.json,
            Command::Copy(args) => args.json,
            Command::Report(args) => args.json,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    logging::init(args.verbose);

    let result = match &args.command {
        Command::Scan(scan) => commands::scan(scan),
        Command::Delete(delete) => commands::delete(delete),
        Command::Copy(copy) => commands::copy(copy),
        Command::Report(report) => commands::report(report),
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        // JSON consumers get the error on stdout, in the same shape as the results
        Err(report) if args.command.json() => {
            let body = match report.downcast_ref::<SiftError>() {
                Some(err) => commands::error_json(err.code(), &err.to_string()),
                None => commands::error_json("INTERNAL", &format!("{report:#}")),
            };
            println!("{body}");
            std::process::exit(Outcome::Failed.exit_code());
        }
        Err(report) => return Err(report),
    };

    std::process::exit(outcome.exit_code());
}
