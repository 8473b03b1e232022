//! The `compile` command: writes a compiled table as an artifact file.
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::info;
use std::fs;

use disclose_core::{compile_pattern, DiscloseError};

use crate::cli::CompileCommand;
use crate::commands::load_config;
use crate::ui::output::info_msg;

/// Compiles the named pattern, writes it to `cmd.output` and prints its
/// fingerprint on stdout.
pub fn run_compile(cmd: &CompileCommand, quiet: bool) -> Result<()> {
    let config = load_config(cmd.config.as_deref())?;
    let definition = config
        .get(&cmd.pattern)
        .ok_or_else(|| DiscloseError::UnknownPattern(cmd.pattern.clone()))?;
    let compiled = compile_pattern(definition)?;
    info!(
        "Compiled '{}' into {} states over {} bytes",
        compiled.name,
        compiled.state_count(),
        compiled.capacity
    );

    let bytes = if cmd.json {
        serde_json::to_vec_pretty(&compiled)?
    } else {
        compiled.to_bytes()?
    };
    fs::write(&cmd.output, &bytes)
        .with_context(|| format!("Failed to write artifact: {}", cmd.output.display()))?;

    if !quiet {
        info_msg(format!(
            "Wrote {} ({} states, {} bytes) to {}",
            compiled.name,
            compiled.state_count(),
            bytes.len(),
            cmd.output.display()
        ));
    }
    println!("{}", compiled.fingerprint());
    Ok(())
}
