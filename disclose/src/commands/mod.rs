//! Subcommand implementations and the helpers they share.
//! License: MIT OR APACHE 2.0

pub mod compile;
pub mod patterns;
pub mod scan;
pub mod unwrap;

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use disclose_core::config::{merge_patterns, PatternConfig};

/// Loads the built-in patterns and merges a user file over them when given.
pub fn load_config(path: Option<&Path>) -> Result<PatternConfig> {
    let defaults = PatternConfig::load_default_patterns()?;
    let user = match path {
        Some(path) => {
            debug!("Loading user patterns from {}", path.display());
            Some(PatternConfig::load_from_file(path)?)
        }
        None => None,
    };
    Ok(merge_patterns(defaults, user))
}

/// Reads the whole input as raw bytes, from a file or from stdin.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut input = Vec::new();
            io::stdin()
                .read_to_end(&mut input)
                .context("Failed to read input from stdin")?;
            Ok(input)
        }
    }
}
