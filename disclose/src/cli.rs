//! This file defines the command-line interface (CLI) for the disclose
//! application, including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "disclose",
    author = "Relay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Reveal only the captured spans of a raw email",
    long_about = "disclose scans a fixed-capacity message buffer (raw email headers or body) with a compiled byte pattern, counts the matches, and prints copies of the buffer in which only the bytes of named capture groups survive. Every other byte is replaced with zero.",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `disclose` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scans an input with one pattern and prints the outcome as JSON.
    #[command(about = "Scans an input with one pattern and prints the outcome as JSON.")]
    Scan(ScanCommand),

    /// Compiles one pattern and writes the table as an artifact.
    #[command(about = "Compiles one pattern and writes the table as an artifact.")]
    Compile(CompileCommand),

    /// Lists the available patterns.
    #[command(about = "Lists the available patterns.")]
    Patterns(PatternsCommand),

    /// Removes quoted-printable soft line breaks from an input.
    #[command(about = "Removes quoted-printable soft line breaks from an input.")]
    Unwrap(UnwrapCommand),
}

/// Arguments for the `scan` command.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Name of the pattern to scan with.
    #[arg(long, short = 'p', value_name = "NAME", help = "Name of the pattern to scan with.")]
    pub pattern: String,

    /// Path to a custom pattern configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", env = "DISCLOSE_CONFIG", help = "Path to a custom pattern configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input: Option<PathBuf>,

    /// Remove soft line breaks even if the pattern does not ask for it.
    #[arg(long, help = "Remove `=\\r\\n` soft line breaks before scanning.")]
    pub unwrap: bool,

    /// Insert a CR before every bare LF before scanning.
    #[arg(long = "normalize-crlf", help = "Insert a CR before every bare LF before scanning.")]
    pub normalize_crlf: bool,

    /// Only extract these groups (comma-separated or repeated).
    #[arg(long, short = 'g', value_delimiter = ',', help = "Only extract these capture groups.")]
    pub group: Vec<String>,

    /// Print the flat signals array instead of the named JSON form.
    #[arg(long, help = "Print `[count, [bytes...], ...]` instead of the named JSON form.")]
    pub signals: bool,

    /// Exit with code 2 when the match count violates the pattern's policy.
    #[arg(long, help = "Exit with code 2 when the match count violates the pattern's expected count.")]
    pub enforce: bool,
}

/// Arguments for the `compile` command.
#[derive(Parser, Debug)]
pub struct CompileCommand {
    /// Name of the pattern to compile.
    #[arg(long, short = 'p', value_name = "NAME", help = "Name of the pattern to compile.")]
    pub pattern: String,

    /// Path to a custom pattern configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", env = "DISCLOSE_CONFIG", help = "Path to a custom pattern configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// Where to write the compiled table.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write the compiled table to this file.")]
    pub output: PathBuf,

    /// Write JSON instead of the binary artifact format.
    #[arg(long, help = "Write JSON instead of the binary artifact format.")]
    pub json: bool,
}

/// Arguments for the `patterns` command.
#[derive(Parser, Debug)]
pub struct PatternsCommand {
    /// Path to a custom pattern configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", env = "DISCLOSE_CONFIG", help = "Path to a custom pattern configuration file (YAML).")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `unwrap` command.
#[derive(Parser, Debug)]
pub struct UnwrapCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input: Option<PathBuf>,

    /// Buffer capacity in bytes.
    #[arg(long, value_name = "N", default_value_t = disclose_core::config::DEFAULT_CAPACITY, help = "Buffer capacity in bytes.")]
    pub capacity: usize,
}
