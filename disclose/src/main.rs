// disclose/src/main.rs
//! disclose entry point.
//!
//! Parses the command line, sets up logging and dispatches to a subcommand.
//! Exit codes: 0 on success, 1 on any error, 2 when `scan --enforce` finds a
//! match count outside the pattern's expected count.
//! License: MIT OR APACHE 2.0

use clap::Parser;
use log::{debug, LevelFilter};
use std::process::ExitCode;

use disclose::cli::{Cli, Commands};
use disclose::commands::{compile, patterns, scan, unwrap};
use disclose::logger;
use disclose::ui::output::error_msg;

const POLICY_VIOLATION: u8 = 2;

fn main() -> ExitCode {
    let args = Cli::parse();

    let level = if args.quiet {
        Some(LevelFilter::Off)
    } else if args.debug {
        Some(LevelFilter::Debug)
    } else {
        None
    };
    logger::init_logger(level);
    debug!("Parsed arguments: {:?}", args);

    let result = match &args.command {
        Commands::Scan(cmd) => scan::run_scan(cmd, args.quiet).map(|satisfied| {
            if cmd.enforce && !satisfied {
                ExitCode::from(POLICY_VIOLATION)
            } else {
                ExitCode::SUCCESS
            }
        }),
        Commands::Compile(cmd) => compile::run_compile(cmd, args.quiet).map(|_| ExitCode::SUCCESS),
        Commands::Patterns(cmd) => patterns::run_patterns(cmd).map(|_| ExitCode::SUCCESS),
        Commands::Unwrap(cmd) => unwrap::run_unwrap(cmd).map(|_| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error_msg(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
