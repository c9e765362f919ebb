use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;
use sift_core::{OperationConfig, OperationExecutor};

use super::{Outcome, operation_json};
use crate::ui::{confirm, print_operation_summary};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Files or folders to move to the trash
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CopyArgs {
    /// Files or folders to copy
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Existing directory to copy into
    #[arg(short, long = "to", value_name = "DIR")]
    pub target: PathBuf,

    /// Refuse folders instead of copying them recursively
    #[arg(long)]
    pub no_recursive: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn delete(args: &DeleteArgs) -> Result<Outcome> {
    if !args.yes && !confirm(&format!("Move {} item(s) to the trash?", args.paths.len()))? {
        eprintln!("Nothing deleted.");
        return Ok(Outcome::Complete);
    }

    let result = OperationExecutor::default().delete(&args.paths)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&operation_json(&result)?)?);
    } else {
        print_operation_summary(&result);
    }
    Ok(Outcome::partial_if(!result.is_complete_success()))
}

pub fn copy(args: &CopyArgs) -> Result<Outcome> {
    let config = OperationConfig {
        copy_directories: !args.no_recursive,
        ..OperationConfig::default()
    };
    let result = OperationExecutor::new(config).copy(&args.sources, &args.target)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&operation_json(&result)?)?);
    } else {
        print_operation_summary(&result);
    }
    Ok(Outcome::partial_if(!result.is_complete_success()))
}
