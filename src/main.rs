// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod accounts;
mod cli;
mod config;
mod error;
mod report;
mod types;
mod ui;

use clap::Parser;
use cli::{CliArgs, Command, MapAccountsArgs, ReportArgs};
use error::ToolError;
use log::{debug, info};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use types::{DataType, Resolution};

fn main() {
    init_logging();

    // Parse CLI arguments; usage errors exit 1 like every other failure
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let result = match &args.command {
        Command::MapAccounts(map_args) => run_map_accounts(map_args),
        Command::Report(report_args) => run_report(report_args),
    };

    if let Err(e) = result {
        ui::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// `[LEVEL] message` on stderr, `info` unless RUST_LOG says otherwise.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .target(env_logger::Target::Stderr)
        .init();
}

fn run_map_accounts(args: &MapAccountsArgs) -> Result<(), ToolError> {
    args.validate().map_err(ToolError::Config)?;

    // Step 1: Load the static mapping
    let mapping = config::load_account_mapping(&args.mappings)?;

    // Step 2: Resolve
    debug!("Changed files: {}", args.changed_files());
    let resolution = accounts::resolve_accounts(&mapping, &args.environment, args.changed_files())?;
    if let Resolution::NoMapping { directories } = &resolution {
        info!("Skipping workflow - no account mapping available (directories: {})", directories);
    }

    // Step 3: Emit step outputs
    let lines = resolution.output_lines();
    for line in &lines {
        println!("{}", line);
    }
    if let Some(path) = &args.github_output {
        append_step_outputs(path, &lines)?;
    }

    Ok(())
}

/// Append `key=value` lines to the GitHub Actions output file.
fn append_step_outputs(path: &Path, lines: &[String]) -> Result<(), ToolError> {
    debug!("Appending step outputs to {}", path.display());
    let mut file = OpenOptions::new().create(true).append(true).open(path).map_err(|e| ToolError::io(path, e))?;
    for line in lines {
        writeln!(file, "{}", line).map_err(|e| ToolError::io(path, e))?;
    }
    Ok(())
}

fn run_report(args: &ReportArgs) -> Result<(), ToolError> {
    args.validate().map_err(ToolError::Config)?;

    let data_type: DataType = args.data_type.parse()?;
    let theme = config::load_theme(args.theme.as_deref())?;
    let renderer = report::GripRenderer::new(args.renderer.trim());

    let mut request = report::ReportRequest::new(args.data(), data_type);
    request.output_name = args.output.trim().to_string();
    request.output_dir = args.output_dir.clone();
    request.title = args.title.clone();

    ui::status(&format!("Generating {} report", data_type));
    let path: PathBuf = report::generate_report(&request, &theme, &renderer, chrono::Utc::now())?;

    let kind = match data_type {
        DataType::Json => "PDF",
        DataType::Markdown => "HTML",
    };
    ui::print_success(&format!("Generated {} report: {}", kind, path.display()));
    Ok(())
}
