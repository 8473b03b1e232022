//! Configuration management for `disclose-core`.
//!
//! This module defines the data-only pattern definitions the compiler consumes.
//! It handles YAML (de)serialization, ships an embedded default set, and
//! provides utilities for loading, merging, filtering and validating them.
//! Patterns are always compiled at setup time from these definitions, never
//! from request input.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use crate::errors::DiscloseError;
use crate::pattern::parser::{is_valid_capture_name, parse};

/// Maximum allowed length for a pattern string.
pub const MAX_PATTERN_LENGTH: usize = 4096;
/// Largest buffer capacity a pattern may declare.
pub const MAX_CAPACITY: usize = 65536;
/// Largest bound accepted in `{n}`, `{n,}` and `{n,m}`.
pub const MAX_REPETITION: u32 = 1000;
pub const MAX_NFA_STATES: usize = 200_000;
pub const MAX_DFA_STATES: usize = 20_000;
/// Capture groups per pattern; each takes one bit of a state's group mask.
pub const MAX_CAPTURE_GROUPS: usize = 64;
/// Capacity used when a definition does not set `max_bytes`.
pub const DEFAULT_CAPACITY: usize = 1024;

lazy_static! {
    static ref PATTERN_NAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").unwrap();
}

/// How many matches a caller expects a pattern to find in one message.
///
/// The count itself is never an error; the policy only tells callers how to
/// judge it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
#[serde(tag = "policy", content = "count", rename_all = "snake_case")]
pub enum ExpectedCount {
    Any,
    Absent,
    Exactly(usize),
    AtLeast(usize),
}

impl Default for ExpectedCount {
    fn default() -> Self {
        ExpectedCount::AtLeast(1)
    }
}

impl ExpectedCount {
    pub fn is_satisfied_by(&self, count: usize) -> bool {
        match *self {
            ExpectedCount::Any => true,
            ExpectedCount::Absent => count == 0,
            ExpectedCount::Exactly(n) => count == n,
            ExpectedCount::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for ExpectedCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedCount::Any => write!(f, "any"),
            ExpectedCount::Absent => write!(f, "absent"),
            ExpectedCount::Exactly(n) => write!(f, "exactly {n}"),
            ExpectedCount::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// One segment of a pattern given as an ordered list of parts. Public parts
/// are revealed under their `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PatternPart {
    pub regex_def: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub name: Option<String>,
}

/// A single data-only pattern definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PatternDefinition {
    /// Unique identifier for the pattern (e.g., "venmo_amount").
    pub name: String,
    pub description: Option<String>,
    pub version: String,
    /// Buffer capacity the compiled pattern scans over.
    pub max_bytes: usize,
    /// When false, a match may begin at any position.
    pub anchored: bool,
    pub minimize: bool,
    /// Strip quoted-printable soft line breaks before scanning.
    pub unwrap_soft_breaks: bool,
    pub expected_count: ExpectedCount,
    /// Metadata tags for categorization.
    pub tags: Option<Vec<String>>,
    /// The whole pattern as text. Mutually exclusive with `parts`.
    pub regex: Option<String>,
    pub parts: Option<Vec<PatternPart>>,
}

// Description and tags do not change the compiled table.
impl Hash for PatternDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.max_bytes.hash(state);
        self.anchored.hash(state);
        self.minimize.hash(state);
        self.unwrap_soft_breaks.hash(state);
        self.expected_count.hash(state);
        self.regex.hash(state);
        self.parts.hash(state);
    }
}

impl Default for PatternDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            version: "1.0.0".to_string(),
            max_bytes: DEFAULT_CAPACITY,
            anchored: false,
            minimize: true,
            unwrap_soft_breaks: false,
            expected_count: ExpectedCount::default(),
            tags: None,
            regex: None,
            parts: None,
        }
    }
}

impl PatternDefinition {
    /// A definition with default settings for the given pattern text.
    pub fn new(name: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            regex: Some(regex.into()),
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_anchored(mut self, anchored: bool) -> Self {
        self.anchored = anchored;
        self
    }

    pub fn with_expected_count(mut self, expected: ExpectedCount) -> Self {
        self.expected_count = expected;
        self
    }

    /// The full pattern text. Parts are joined in order; public parts become
    /// named captures and the others plain groups.
    pub fn pattern_text(&self) -> Result<String, DiscloseError> {
        match (&self.regex, &self.parts) {
            (Some(regex), None) => Ok(regex.clone()),
            (None, Some(parts)) => Ok(parts
                .iter()
                .enumerate()
                .map(|(i, part)| {
                    if part.is_public {
                        let name = part.name.clone().unwrap_or_else(|| format!("part{i}"));
                        format!("(?<{name}>{})", part.regex_def)
                    } else {
                        format!("(?:{})", part.regex_def)
                    }
                })
                .collect()),
            _ => Err(DiscloseError::PatternCompileError(
                self.name.clone(),
                "exactly one of `regex` or `parts` must be set".to_string(),
            )),
        }
    }
}

/// Represents the top-level configuration structure for disclose.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct PatternConfig {
    pub patterns: Vec<PatternDefinition>,
}

impl PatternConfig {
    /// Loads pattern definitions from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading custom patterns from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: PatternConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_patterns(&config.patterns)?;
        info!("Loaded {} patterns from file {}.", config.patterns.len(), path.display());
        Ok(config)
    }

    /// Loads the default pattern set from the embedded configuration.
    pub fn load_default_patterns() -> Result<Self> {
        debug!("Loading default patterns from embedded string...");
        let default_yaml = include_str!("../config/default_patterns.yaml");
        let config: PatternConfig =
            serde_yml::from_str(default_yaml).context("Failed to parse default patterns")?;

        validate_patterns(&config.patterns).context("Embedded default patterns are invalid")?;
        debug!("Loaded {} default patterns.", config.patterns.len());
        Ok(config)
    }

    pub fn get(&self, name: &str) -> Option<&PatternDefinition> {
        self.patterns.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.name.as_str()).collect()
    }

    /// Keeps only the patterns named in `enable` (all of them when `enable` is
    /// empty), then drops those named in `disable`.
    pub fn set_active_patterns(&mut self, enable: &[String], disable: &[String]) {
        let enable_set: HashSet<&str> = enable.iter().map(String::as_str).collect();
        let disable_set: HashSet<&str> = disable.iter().map(String::as_str).collect();
        let known: HashSet<&str> = self.patterns.iter().map(|p| p.name.as_str()).collect();

        for name in enable_set.difference(&known) {
            warn!("Pattern '{}' in the enable list does not exist.", name);
        }
        for name in disable_set.difference(&known) {
            warn!("Pattern '{}' in the disable list does not exist.", name);
        }

        debug!("Patterns before filtering: {}", self.patterns.len());
        self.patterns.retain(|p| {
            let name = p.name.as_str();
            (enable_set.is_empty() || enable_set.contains(name)) && !disable_set.contains(name)
        });
        debug!("Active patterns after filtering: {}", self.patterns.len());
    }
}

/// Merges user-defined patterns into the defaults. A user pattern replaces the
/// default of the same name in place; new names are appended in user order.
pub fn merge_patterns(default_config: PatternConfig, user_config: Option<PatternConfig>) -> PatternConfig {
    let mut patterns = default_config.patterns;
    if let Some(user_cfg) = user_config {
        debug!("Merging {} user patterns into {} defaults.", user_cfg.patterns.len(), patterns.len());
        for user_pattern in user_cfg.patterns {
            match patterns.iter_mut().find(|p| p.name == user_pattern.name) {
                Some(existing) => {
                    debug!("User pattern '{}' overrides the default.", user_pattern.name);
                    *existing = user_pattern;
                }
                None => patterns.push(user_pattern),
            }
        }
    }
    debug!("Final total patterns after merge: {}", patterns.len());
    PatternConfig { patterns }
}

/// Validates definitions and reports every problem found at once.
pub fn validate_patterns(patterns: &[PatternDefinition]) -> Result<()> {
    let mut names = HashSet::new();
    let mut errors = Vec::new();

    for pattern in patterns {
        if pattern.name.is_empty() {
            errors.push("A pattern has an empty `name` field.".to_string());
        } else if !PATTERN_NAME_REGEX.is_match(&pattern.name) {
            errors.push(format!("Pattern name '{}' contains invalid characters.", pattern.name));
        } else if !names.insert(pattern.name.clone()) {
            errors.push(format!("Duplicate pattern name found: '{}'.", pattern.name));
        }

        if pattern.max_bytes == 0 || pattern.max_bytes > MAX_CAPACITY {
            errors.push(format!(
                "Pattern '{}': `max_bytes` must be between 1 and {}, got {}.",
                pattern.name, MAX_CAPACITY, pattern.max_bytes
            ));
        }

        if let Some(parts) = &pattern.parts {
            if parts.is_empty() {
                errors.push(format!("Pattern '{}' has an empty `parts` list.", pattern.name));
            }
            for part in parts.iter().filter(|p| p.is_public) {
                if let Some(name) = &part.name {
                    if !is_valid_capture_name(name) {
                        errors.push(format!(
                            "Pattern '{}': public part name '{}' is not a valid identifier.",
                            pattern.name, name
                        ));
                    }
                }
            }
        }

        let text = match pattern.pattern_text() {
            Ok(text) => text,
            Err(e) => {
                errors.push(e.to_string());
                continue;
            }
        };
        if text.is_empty() {
            errors.push(format!("Pattern '{}' has an empty pattern.", pattern.name));
        } else if text.len() > MAX_PATTERN_LENGTH {
            errors.push(
                DiscloseError::PatternLengthExceeded(pattern.name.clone(), text.len(), MAX_PATTERN_LENGTH).to_string(),
            );
        } else if let Err(e) = parse(&text) {
            errors.push(DiscloseError::from_parse(&pattern.name, e).to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("Pattern validation failed:\n{}", errors.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_count_policies() {
        assert!(ExpectedCount::Any.is_satisfied_by(7));
        assert!(ExpectedCount::Absent.is_satisfied_by(0));
        assert!(!ExpectedCount::Absent.is_satisfied_by(1));
        assert!(ExpectedCount::Exactly(2).is_satisfied_by(2));
        assert!(!ExpectedCount::Exactly(2).is_satisfied_by(3));
        assert!(ExpectedCount::AtLeast(1).is_satisfied_by(4));
        assert!(!ExpectedCount::default().is_satisfied_by(0));
    }

    #[test]
    fn test_expected_count_yaml_shape() {
        let parsed: ExpectedCount = serde_yml::from_str("policy: exactly\ncount: 3\n").unwrap();
        assert_eq!(parsed, ExpectedCount::Exactly(3));
        let parsed: ExpectedCount = serde_yml::from_str("policy: any\n").unwrap();
        assert_eq!(parsed, ExpectedCount::Any);
    }

    #[test]
    fn test_parts_join_into_named_captures() {
        let def = PatternDefinition {
            name: "amount".into(),
            parts: Some(vec![
                PatternPart { regex_def: r"\$".into(), is_public: false, name: None },
                PatternPart { regex_def: "[0-9]+".into(), is_public: true, name: Some("value".into()) },
                PatternPart { regex_def: "[a-z]".into(), is_public: true, name: None },
            ]),
            ..PatternDefinition::default()
        };
        assert_eq!(def.pattern_text().unwrap(), r"(?:\$)(?<value>[0-9]+)(?<part2>[a-z])");
    }

    #[test]
    fn test_regex_and_parts_are_exclusive() {
        let mut def = PatternDefinition::new("both", "a");
        def.parts = Some(vec![]);
        assert!(def.pattern_text().is_err());
        let neither = PatternDefinition { name: "none".into(), ..PatternDefinition::default() };
        assert!(neither.pattern_text().is_err());
    }

    #[test]
    fn test_validation_aggregates_errors() {
        let defs = vec![
            PatternDefinition::new("dup", "a"),
            PatternDefinition::new("dup", "b"),
            PatternDefinition::new("bad_syntax", "(a"),
            PatternDefinition::new("too_big", "a").with_capacity(MAX_CAPACITY + 1),
            PatternDefinition::new("", "a"),
        ];
        let message = validate_patterns(&defs).unwrap_err().to_string();
        assert!(message.contains("Duplicate pattern name found: 'dup'"));
        assert!(message.contains("bad_syntax"));
        assert!(message.contains("too_big"));
        assert!(message.contains("empty `name`"));
    }

    #[test]
    fn test_overlong_pattern_is_rejected() {
        let defs = vec![PatternDefinition::new("long", "a".repeat(MAX_PATTERN_LENGTH + 1))];
        let message = validate_patterns(&defs).unwrap_err().to_string();
        assert!(message.contains("exceeds maximum allowed"));
    }

    #[test]
    fn test_merge_replaces_in_place_and_appends() {
        let defaults = PatternConfig {
            patterns: vec![PatternDefinition::new("a", "x"), PatternDefinition::new("b", "y")],
        };
        let user = PatternConfig {
            patterns: vec![PatternDefinition::new("c", "z"), PatternDefinition::new("a", "w")],
        };
        let merged = merge_patterns(defaults, Some(user));
        assert_eq!(merged.names(), vec!["a", "b", "c"]);
        assert_eq!(merged.get("a").unwrap().regex.as_deref(), Some("w"));
    }

    #[test]
    fn test_set_active_patterns() {
        let mut config = PatternConfig {
            patterns: vec![
                PatternDefinition::new("a", "x"),
                PatternDefinition::new("b", "y"),
                PatternDefinition::new("c", "z"),
            ],
        };
        config.set_active_patterns(&[], &["b".to_string()]);
        assert_eq!(config.names(), vec!["a", "c"]);
        config.set_active_patterns(&["c".to_string(), "missing".to_string()], &[]);
        assert_eq!(config.names(), vec!["c"]);
    }

    #[test]
    fn test_default_patterns_load_and_validate() {
        let config = PatternConfig::load_default_patterns().unwrap();
        for name in ["from_email", "paylah_amount", "venmo_amount", "venmo_payee_id", "dkim_body_hash"] {
            assert!(config.get(name).is_some(), "missing default pattern {name}");
        }
    }
}
