// disclose-core/src/headless.rs
//! Convenience wrappers for one-shot, non-interactive use.
//!
//! Both functions compile through the shared cache, so calling them
//! repeatedly with the same definition only compiles once.

use anyhow::{Context, Result};

use crate::config::{PatternConfig, PatternDefinition};
use crate::engine::{DisclosureEngine, EngineOptions, MatchOutcome};
use crate::engines::dfa_engine::DfaEngine;
use crate::errors::DiscloseError;

/// Scans `input` with the named pattern from `config`.
///
/// # Arguments
///
/// * `config` - The merged `PatternConfig` (defaults + optional user patterns).
/// * `pattern_name` - Which definition in `config` to use.
/// * `input` - The raw message bytes.
/// * `options` - Preprocessing and group selection. `None` uses what the
///   definition asks for.
pub fn headless_disclose(
    config: &PatternConfig,
    pattern_name: &str,
    input: &[u8],
    options: Option<EngineOptions>,
) -> Result<MatchOutcome> {
    let definition = config
        .get(pattern_name)
        .ok_or_else(|| DiscloseError::UnknownPattern(pattern_name.to_string()))?;
    let mut engine = DfaEngine::from_definition(definition)
        .with_context(|| format!("Failed to build engine for pattern '{}'", pattern_name))?;
    if let Some(options) = options {
        engine = engine.with_options(options);
    }
    let outcome = engine.scan(input)?;
    Ok(outcome)
}

/// Scans `input` with a single definition and its own options.
pub fn headless_scan(definition: &PatternDefinition, input: &[u8]) -> Result<MatchOutcome> {
    let engine = DfaEngine::from_definition(definition)
        .with_context(|| format!("Failed to build engine for pattern '{}'", definition.name))?;
    Ok(engine.scan(input)?)
}
