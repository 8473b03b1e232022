//! Runs a compiled pattern over a buffer and counts matches.
//!
//! License: MIT OR APACHE 2.0

use serde::Serialize;

use crate::buffer::ByteBuffer;
use crate::compiler::CompiledPattern;
use crate::pattern::StateId;

/// The state entered after each byte of the buffer. `trace[i]` is the state
/// reached by consuming byte `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateTrace {
    states: Vec<StateId>,
}

impl StateTrace {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<StateId> {
        self.states.get(index).copied()
    }

    pub fn as_slice(&self) -> &[StateId] {
        &self.states
    }
}

/// One pass over the whole capacity of `buffer`, padding included. There is
/// no early exit, so the work done depends only on the capacity.
pub fn execute(pattern: &CompiledPattern, buffer: &ByteBuffer) -> StateTrace {
    let mut state: StateId = 0;
    let states = buffer
        .as_bytes()
        .iter()
        .map(|&byte| {
            state = pattern.next_state(state, byte);
            state
        })
        .collect();
    StateTrace { states }
}

/// Number of positions where the trace enters an accepting state from a
/// non-accepting one. A run of consecutive accepting states counts once.
pub fn count_matches(pattern: &CompiledPattern, trace: &StateTrace) -> usize {
    let mut previous = false;
    let mut count = 0;
    for &state in trace.as_slice() {
        let accepting = pattern.is_accepting(state);
        if accepting && !previous {
            count += 1;
        }
        previous = accepting;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_pattern;
    use crate::config::PatternDefinition;

    fn pattern(regex: &str, capacity: usize) -> CompiledPattern {
        compile_pattern(&PatternDefinition::new("t", regex).with_capacity(capacity)).unwrap()
    }

    #[test]
    fn test_trace_covers_full_capacity() {
        let p = pattern("ab", 16);
        let buffer = ByteBuffer::from_input(b"xxab", 16).unwrap();
        let trace = execute(&p, &buffer);
        assert_eq!(trace.len(), 16);
        assert!(p.is_accepting(trace.get(3).unwrap()));
        assert!(!p.is_accepting(trace.get(4).unwrap()));
    }

    #[test]
    fn test_counts_separate_matches() {
        let p = pattern("ab", 32);
        let buffer = ByteBuffer::from_input(b"ab ab xx ab", 32).unwrap();
        assert_eq!(count_matches(&p, &execute(&p, &buffer)), 3);
    }

    #[test]
    fn test_adjacent_accepting_run_counts_once() {
        let p = pattern("a+", 8);
        let buffer = ByteBuffer::from_input(b"aaa", 8).unwrap();
        assert_eq!(count_matches(&p, &execute(&p, &buffer)), 1);
    }

    #[test]
    fn test_absent_pattern_counts_zero() {
        let p = pattern("needle", 64);
        let buffer = ByteBuffer::from_input(b"just a haystack", 64).unwrap();
        assert_eq!(count_matches(&p, &execute(&p, &buffer)), 0);
    }

    #[test]
    fn test_anchored_pattern_only_matches_at_start() {
        let def = PatternDefinition::new("t", "ab").with_capacity(8).with_anchored(true);
        let p = compile_pattern(&def).unwrap();
        let hit = ByteBuffer::from_input(b"ab", 8).unwrap();
        let miss = ByteBuffer::from_input(b"xab", 8).unwrap();
        assert_eq!(count_matches(&p, &execute(&p, &hit)), 1);
        assert_eq!(count_matches(&p, &execute(&p, &miss)), 0);
    }
}
