//! The `scan` command: runs one pattern over one message and prints JSON.
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::io::{self, Write};
use std::ops::Range;

use disclose_core::engine::{DisclosureEngine, EngineOptions, MatchOutcome};
use disclose_core::{DfaEngine, DiscloseError};

use crate::cli::ScanCommand;
use crate::commands::{load_config, read_input};
use crate::ui::output::warn_msg;

/// Named JSON form of one revealed group.
#[derive(Debug, Serialize)]
pub struct GroupReport {
    pub name: String,
    pub spans: Vec<Range<usize>>,
    pub revealed: String,
    pub bytes: Vec<u8>,
}

/// Named JSON form of a scan.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub pattern: String,
    pub fingerprint: String,
    pub match_count: usize,
    pub expected: String,
    pub satisfies_policy: bool,
    pub groups: Vec<GroupReport>,
}

impl From<&MatchOutcome> for ScanReport {
    fn from(outcome: &MatchOutcome) -> Self {
        Self {
            pattern: outcome.pattern.clone(),
            fingerprint: outcome.fingerprint.clone(),
            match_count: outcome.match_count,
            expected: outcome.expected.to_string(),
            satisfies_policy: outcome.satisfies_policy(),
            groups: outcome
                .reveals
                .iter()
                .map(|reveal| GroupReport {
                    name: reveal.group.clone(),
                    spans: reveal.spans.clone(),
                    revealed: reveal.revealed_text(),
                    bytes: reveal.bytes.clone(),
                })
                .collect(),
        }
    }
}

/// Runs the scan and writes the outcome to stdout.
///
/// Returns whether the match count satisfied the pattern's policy. A count
/// outside the policy is reported, never treated as an error here.
pub fn run_scan(cmd: &ScanCommand, quiet: bool) -> Result<bool> {
    let config = load_config(cmd.config.as_deref())?;
    let definition = config
        .get(&cmd.pattern)
        .ok_or_else(|| DiscloseError::UnknownPattern(cmd.pattern.clone()))?;

    let engine = DfaEngine::from_definition(definition)
        .with_context(|| format!("Failed to compile pattern '{}'", cmd.pattern))?;
    let defaults = EngineOptions::for_pattern(engine.compiled_pattern());
    let options = EngineOptions {
        unwrap_soft_breaks: defaults.unwrap_soft_breaks || cmd.unwrap,
        normalize_line_endings: cmd.normalize_crlf,
        groups: if cmd.group.is_empty() { None } else { Some(cmd.group.clone()) },
    };
    debug!("Scan options for '{}': {:?}", cmd.pattern, options);
    let engine = engine.with_options(options);

    let input = read_input(cmd.input.as_deref())?;
    let outcome = engine.scan(&input)?;
    info!(
        "Pattern '{}' matched {} time(s), expected {}",
        outcome.pattern, outcome.match_count, outcome.expected
    );

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    if cmd.signals {
        serde_json::to_writer(&mut writer, &outcome.signals())?;
    } else {
        serde_json::to_writer_pretty(&mut writer, &ScanReport::from(&outcome))?;
    }
    writeln!(writer)?;

    let satisfied = outcome.satisfies_policy();
    if !satisfied && !quiet {
        warn_msg(format!(
            "Pattern '{}' matched {} time(s), expected {}.",
            outcome.pattern, outcome.match_count, outcome.expected
        ));
    }
    Ok(satisfied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;
    use disclose_core::{headless_scan, PatternDefinition};

    #[test]
    fn test_report_carries_spans_and_text() {
        let def = PatternDefinition::new("amt", r"\$(?<amount>[0-9]+)").with_capacity(16);
        let outcome = headless_scan(&def, b"pay $42 now").unwrap();
        let report = ScanReport::from(&outcome);
        assert_eq!(report.match_count, 1);
        assert!(report.satisfies_policy);
        assert_eq!(report.expected, "at least 1");
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].revealed, "42");
        assert_eq!(report.groups[0].spans, vec![5..7]);
        assert_eq!(report.groups[0].bytes.len(), 16);
    }
}
