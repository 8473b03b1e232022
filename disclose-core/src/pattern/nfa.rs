//! Thompson NFA construction.
//!
//! Every byte-consuming state remembers which capture group (if any) encloses
//! it. The DFA builder uses those labels to tag the state entered after a byte
//! has been consumed.

use log::debug;

use super::ast::Node;
use super::byte_set::ByteSet;
use crate::config::{MAX_CAPTURE_GROUPS, MAX_NFA_STATES};

pub type NfaStateId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NfaState {
    /// Consume one byte from `set` and move to `next`.
    Byte {
        set: ByteSet,
        next: NfaStateId,
        group: Option<u16>,
    },
    Split(NfaStateId, NfaStateId),
    /// Passable only before the first byte has been consumed.
    AssertStart(NfaStateId),
    Match,
}

/// Reasons NFA construction can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NfaError {
    TooManyStates(usize),
    TooManyGroups,
}

#[derive(Debug, Clone)]
pub struct Nfa {
    pub states: Vec<NfaState>,
    pub start: NfaStateId,
    /// Capture group names, indexed by the `group` label on byte states.
    pub groups: Vec<String>,
}

impl Nfa {
    /// Builds the automaton for `node`. When `anchored` is false an implicit
    /// any-byte loop in front of the pattern lets a match begin at every
    /// position, including right after a previous match.
    pub fn build(node: &Node, anchored: bool) -> Result<Nfa, NfaError> {
        let groups = node.capture_names();
        if groups.len() > MAX_CAPTURE_GROUPS {
            return Err(NfaError::TooManyGroups);
        }
        let mut builder = Builder {
            states: Vec::new(),
            groups,
        };
        let accept = builder.push(NfaState::Match)?;
        let pattern_start = builder.compile(node, accept, None)?;

        let start = if anchored {
            pattern_start
        } else {
            // search: Split(pattern, any-byte -> back to split)
            let split = builder.push(NfaState::Split(pattern_start, usize::MAX))?;
            let any = builder.push(NfaState::Byte {
                set: ByteSet::full(),
                next: split,
                group: None,
            })?;
            builder.states[split] = NfaState::Split(pattern_start, any);
            split
        };

        debug!("Built NFA with {} states and {} capture group(s).", builder.states.len(), builder.groups.len());
        Ok(Nfa {
            states: builder.states,
            start,
            groups: builder.groups,
        })
    }

    /// Every distinct byte set used by a byte-consuming state.
    pub fn byte_sets(&self) -> Vec<ByteSet> {
        let mut sets: Vec<ByteSet> = Vec::new();
        for state in &self.states {
            if let NfaState::Byte { set, .. } = state {
                if !sets.contains(set) {
                    sets.push(*set);
                }
            }
        }
        sets
    }

    /// Whether the pattern can match without consuming a byte.
    pub fn matches_empty(&self) -> bool {
        self.closure(&[self.start], true)
            .iter()
            .any(|&id| matches!(self.states[id], NfaState::Match))
    }

    /// Epsilon closure of `seeds`. `at_start` allows passing start anchors.
    /// The result is sorted and free of duplicates.
    pub fn closure(&self, seeds: &[NfaStateId], at_start: bool) -> Vec<NfaStateId> {
        let mut seen = vec![false; self.states.len()];
        let mut stack: Vec<NfaStateId> = seeds.to_vec();
        let mut out = Vec::new();
        while let Some(id) = stack.pop() {
            if seen[id] {
                continue;
            }
            seen[id] = true;
            match &self.states[id] {
                NfaState::Split(a, b) => {
                    stack.push(*b);
                    stack.push(*a);
                }
                NfaState::AssertStart(next) => {
                    if at_start {
                        stack.push(*next);
                    }
                }
                NfaState::Byte { .. } | NfaState::Match => out.push(id),
            }
        }
        out.sort_unstable();
        out
    }
}

struct Builder {
    states: Vec<NfaState>,
    groups: Vec<String>,
}

impl Builder {
    fn push(&mut self, state: NfaState) -> Result<NfaStateId, NfaError> {
        if self.states.len() >= MAX_NFA_STATES {
            return Err(NfaError::TooManyStates(MAX_NFA_STATES));
        }
        self.states.push(state);
        Ok(self.states.len() - 1)
    }

    /// Compiles `node` so that it continues into `next`; returns the entry
    /// state.
    fn compile(&mut self, node: &Node, next: NfaStateId, group: Option<u16>) -> Result<NfaStateId, NfaError> {
        match node {
            Node::Empty => Ok(next),
            Node::Class(set) => self.push(NfaState::Byte {
                set: *set,
                next,
                group,
            }),
            Node::StartAnchor => self.push(NfaState::AssertStart(next)),
            Node::Concat(items) => {
                let mut cur = next;
                for item in items.iter().rev() {
                    cur = self.compile(item, cur, group)?;
                }
                Ok(cur)
            }
            Node::Alternate(branches) => {
                let mut entries = Vec::with_capacity(branches.len());
                for branch in branches {
                    entries.push(self.compile(branch, next, group)?);
                }
                let mut cur = match entries.pop() {
                    Some(last) => last,
                    None => return Ok(next),
                };
                while let Some(entry) = entries.pop() {
                    cur = self.push(NfaState::Split(entry, cur))?;
                }
                Ok(cur)
            }
            Node::Capture { name, node } => {
                let index = self
                    .groups
                    .iter()
                    .position(|g| g == name)
                    .ok_or(NfaError::TooManyGroups)?;
                self.compile(node, next, Some(index as u16))
            }
            Node::Repeat { node, min, max } => {
                let mut cur = next;
                match max {
                    Some(max) => {
                        for _ in *min..*max {
                            let body = self.compile(node, cur, group)?;
                            cur = self.push(NfaState::Split(body, cur))?;
                        }
                        for _ in 0..*min {
                            cur = self.compile(node, cur, group)?;
                        }
                    }
                    None => {
                        let split = self.push(NfaState::Split(usize::MAX, cur))?;
                        let body = self.compile(node, split, group)?;
                        self.states[split] = NfaState::Split(body, cur);
                        // x{n,} = x{n-1} x+ ; x* enters at the split
                        cur = if *min == 0 { split } else { body };
                        for _ in 1..(*min).max(1) {
                            cur = self.compile(node, cur, group)?;
                        }
                    }
                }
                Ok(cur)
            }
        }
    }
}
