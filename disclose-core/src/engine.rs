//! Defines the core `DisclosureEngine` trait and related data structures.
//!
//! The trait ties the stages of a scan together: preparing the input buffer,
//! running the automaton, counting matches and extracting reveal buffers.
//! Callers that only hold a `dyn DisclosureEngine` never see the table
//! representation behind it.
//!
//! License: MIT OR APACHE 2.0

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use crate::buffer::ByteBuffer;
use crate::compiler::CompiledPattern;
use crate::config::ExpectedCount;
use crate::errors::DiscloseError;
use crate::executor::StateTrace;
use crate::reveal::RevealBuffer;

/// Per-engine settings for preparing input and choosing what to reveal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Remove `=\r\n` soft line breaks before scanning.
    pub unwrap_soft_breaks: bool,
    /// Insert a CR before every bare LF before scanning.
    pub normalize_line_endings: bool,
    /// Groups to extract. `None` extracts all of them.
    pub groups: Option<Vec<String>>,
}

impl EngineOptions {
    /// Options matching what the pattern's definition asked for.
    pub fn for_pattern(pattern: &CompiledPattern) -> Self {
        Self {
            unwrap_soft_breaks: pattern.unwrap_soft_breaks,
            ..Self::default()
        }
    }
}

/// The result of scanning one message with one pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub pattern: String,
    pub fingerprint: String,
    pub match_count: usize,
    pub expected: ExpectedCount,
    pub reveals: Vec<RevealBuffer>,
}

impl MatchOutcome {
    /// Whether the match count is what the pattern's policy expects.
    pub fn satisfies_policy(&self) -> bool {
        self.expected.is_satisfied_by(self.match_count)
    }

    pub fn reveal(&self, group: &str) -> Option<&RevealBuffer> {
        self.reveals.iter().find(|r| r.group == group)
    }

    /// The flat form: `[count, [bytes of group 0], [bytes of group 1], ...]`.
    pub fn signals(&self) -> Signals<'_> {
        Signals(self)
    }
}

/// Serializes a [`MatchOutcome`] as a plain array with no field names.
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a>(&'a MatchOutcome);

impl Serialize for Signals<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1 + self.0.reveals.len()))?;
        seq.serialize_element(&self.0.match_count)?;
        for reveal in &self.0.reveals {
            seq.serialize_element(&reveal.bytes)?;
        }
        seq.end()
    }
}

/// A trait that defines the core functionality of a disclosure engine.
///
/// Engines are immutable once built and can be shared across threads; all
/// per-request state lives in the values they return.
pub trait DisclosureEngine: Send + Sync {
    /// The compiled pattern this engine runs.
    fn compiled_pattern(&self) -> &CompiledPattern;

    fn options(&self) -> &EngineOptions;

    /// Loads raw input into a buffer of the pattern's capacity and applies the
    /// configured preprocessing.
    fn prepare(&self, input: &[u8]) -> Result<ByteBuffer, DiscloseError>;

    /// Runs the automaton over an already prepared buffer.
    fn trace(&self, buffer: &ByteBuffer) -> Result<StateTrace, DiscloseError>;

    /// Counts matches and extracts reveals from an already prepared buffer.
    fn scan_buffer(&self, buffer: &ByteBuffer) -> Result<MatchOutcome, DiscloseError>;

    /// Prepares `input` and scans it.
    fn scan(&self, input: &[u8]) -> Result<MatchOutcome, DiscloseError> {
        let buffer = self.prepare(input)?;
        self.scan_buffer(&buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(count: usize, expected: ExpectedCount) -> MatchOutcome {
        MatchOutcome {
            pattern: "p".into(),
            fingerprint: "00".into(),
            match_count: count,
            expected,
            reveals: vec![
                RevealBuffer { group: "a".into(), bytes: vec![0, 7, 0], spans: vec![1..2] },
                RevealBuffer { group: "b".into(), bytes: vec![9, 0, 0], spans: vec![0..1] },
            ],
        }
    }

    #[test]
    fn test_signals_are_a_flat_array() {
        let json = serde_json::to_string(&outcome(1, ExpectedCount::default()).signals()).unwrap();
        assert_eq!(json, "[1,[0,7,0],[9,0,0]]");
    }

    #[test]
    fn test_policy_verdict() {
        assert!(outcome(1, ExpectedCount::Exactly(1)).satisfies_policy());
        assert!(!outcome(2, ExpectedCount::Exactly(1)).satisfies_policy());
        assert!(outcome(0, ExpectedCount::Absent).satisfies_policy());
    }

    #[test]
    fn test_reveal_lookup_by_group() {
        let o = outcome(1, ExpectedCount::Any);
        assert_eq!(o.reveal("b").map(|r| r.bytes[0]), Some(9));
        assert!(o.reveal("c").is_none());
    }
}
