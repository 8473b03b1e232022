//! The `patterns` command: lists the available patterns as a table.
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use disclose_core::config::PatternConfig;
use disclose_core::pattern::{parse, Node};

use crate::cli::PatternsCommand;
use crate::commands::load_config;

/// Builds the listing table for every pattern in `config`.
pub fn patterns_table(config: &PatternConfig) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Name", "Capacity", "Expected", "Groups", "Description"]);

    for def in &config.patterns {
        let groups = def
            .pattern_text()
            .ok()
            .and_then(|text| parse(&text).ok())
            .map(|node: Node| node.capture_names().join(", "))
            .unwrap_or_default();
        table.add_row(vec![
            def.name.clone(),
            def.max_bytes.to_string(),
            def.expected_count.to_string(),
            groups,
            def.description.clone().unwrap_or_default(),
        ]);
    }
    table
}

pub fn run_patterns(cmd: &PatternsCommand) -> Result<()> {
    let config = load_config(cmd.config.as_deref())?;
    println!("{}", patterns_table(&config));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_table_lists_default_patterns() {
        let config = PatternConfig::load_default_patterns().unwrap();
        let rendered = patterns_table(&config).to_string();
        for name in config.names() {
            assert!(rendered.contains(name), "{name} missing");
        }
        assert!(rendered.contains("exactly 1"));
        assert!(rendered.contains("payee_id"));
    }
}
