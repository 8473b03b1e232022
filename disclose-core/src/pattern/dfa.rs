//! Subset construction, minimization and canonical numbering.
//!
//! A DFA state is identified by the set of NFA states it stands for together
//! with its group mask: bit `g` is set when a byte-state of group `g` consumed
//! the byte that led into it. In search mode a new attempt may start while an
//! earlier one is still inside a later group, so one state can belong to
//! several groups. Minimization only merges states that agree on both the
//! accept flag and the mask, so the tagging survives it unchanged.

use std::collections::{HashMap, VecDeque};

use log::debug;

use super::byte_set::ByteClasses;
use super::nfa::{Nfa, NfaState, NfaStateId};
use crate::config::MAX_DFA_STATES;

pub type StateId = u32;

/// Bit `g` set means the state belongs to capture group `g`.
pub type GroupMask = u64;

/// Number of columns in a transition row.
pub const ALPHABET: usize = 256;

/// Reasons subset construction can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DfaError {
    TooManyStates(usize),
    /// Within one match attempt, one byte is consumed inside two different
    /// capture groups.
    CaptureConflict(u16, u16),
}

/// A total transition table with per-state accept flags and group masks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaTable {
    /// Row-major, `ALPHABET` entries per state.
    pub transitions: Vec<StateId>,
    pub accept: Vec<bool>,
    pub tags: Vec<GroupMask>,
}

impl DfaTable {
    pub fn state_count(&self) -> usize {
        self.accept.len()
    }

    pub fn next(&self, state: StateId, byte: u8) -> StateId {
        self.transitions[state as usize * ALPHABET + byte as usize]
    }

    fn row(&self, state: usize) -> &[StateId] {
        &self.transitions[state * ALPHABET..(state + 1) * ALPHABET]
    }
}

type StateKey = (Vec<NfaStateId>, GroupMask);

/// Subset construction over byte classes. State 0 is the start state.
///
/// With `exclusive` set, a byte consumed by two different groups is a
/// [`DfaError::CaptureConflict`]. Run it that way over the anchored automaton,
/// where every thread belongs to the same attempt.
pub fn determinize(nfa: &Nfa, exclusive: bool) -> Result<DfaTable, DfaError> {
    let sets = nfa.byte_sets();
    let classes = ByteClasses::from_sets(sets.iter());
    let reps = classes.representatives();
    let match_ids: Vec<NfaStateId> = nfa
        .states
        .iter()
        .enumerate()
        .filter(|(_, s)| matches!(s, NfaState::Match))
        .map(|(i, _)| i)
        .collect();

    let mut keys: Vec<StateKey> = Vec::new();
    let mut index: HashMap<StateKey, StateId> = HashMap::new();
    let mut class_rows: Vec<Vec<StateId>> = Vec::new();

    let start: StateKey = (nfa.closure(&[nfa.start], true), 0);
    index.insert(start.clone(), 0);
    keys.push(start);

    let mut current = 0;
    while current < keys.len() {
        let mut row = Vec::with_capacity(reps.len());
        for &byte in &reps {
            let (set, _) = &keys[current];
            let mut moved = Vec::new();
            let mut mask: GroupMask = 0;
            for &id in set {
                if let NfaState::Byte { set: bytes, next, group } = &nfa.states[id] {
                    if !bytes.contains(byte) {
                        continue;
                    }
                    moved.push(*next);
                    if let Some(g) = *group {
                        if exclusive && mask != 0 && mask & (1 << g) == 0 {
                            return Err(DfaError::CaptureConflict(mask.trailing_zeros() as u16, g));
                        }
                        mask |= 1 << g;
                    }
                }
            }
            let key: StateKey = (nfa.closure(&moved, false), mask);
            let target = match index.get(&key) {
                Some(&id) => id,
                None => {
                    if keys.len() >= MAX_DFA_STATES {
                        return Err(DfaError::TooManyStates(MAX_DFA_STATES));
                    }
                    let id = keys.len() as StateId;
                    index.insert(key.clone(), id);
                    keys.push(key);
                    id
                }
            };
            row.push(target);
        }
        class_rows.push(row);
        current += 1;
    }

    let mut transitions = Vec::with_capacity(keys.len() * ALPHABET);
    for row in &class_rows {
        for b in 0..ALPHABET {
            transitions.push(row[classes.class_of(b as u8)]);
        }
    }
    let accept = keys
        .iter()
        .map(|(set, _)| set.iter().any(|id| match_ids.contains(id)))
        .collect();
    let tags = keys.iter().map(|(_, tag)| *tag).collect();

    debug!(
        "Subset construction produced {} states over {} byte classes.",
        keys.len(),
        classes.len()
    );
    Ok(DfaTable {
        transitions,
        accept,
        tags,
    })
}

/// Moore partition refinement. States are only merged when they agree on the
/// accept flag, the group mask and the blocks of all successors.
pub fn minimize(table: &DfaTable) -> DfaTable {
    let n = table.state_count();
    let mut block: Vec<usize> = {
        let mut ids: HashMap<(bool, GroupMask), usize> = HashMap::new();
        (0..n)
            .map(|s| {
                let next = ids.len();
                *ids.entry((table.accept[s], table.tags[s])).or_insert(next)
            })
            .collect()
    };
    let mut block_count = block.iter().copied().max().map_or(0, |m| m + 1);

    loop {
        let mut ids: HashMap<(usize, Vec<usize>), usize> = HashMap::new();
        let refined: Vec<usize> = (0..n)
            .map(|s| {
                let signature: Vec<usize> = table.row(s).iter().map(|&t| block[t as usize]).collect();
                let next = ids.len();
                *ids.entry((block[s], signature)).or_insert(next)
            })
            .collect();
        let refined_count = ids.len();
        block = refined;
        if refined_count == block_count {
            break;
        }
        block_count = refined_count;
    }

    let mut representative = vec![usize::MAX; block_count];
    for s in 0..n {
        if representative[block[s]] == usize::MAX {
            representative[block[s]] = s;
        }
    }
    let mut transitions = Vec::with_capacity(block_count * ALPHABET);
    let mut accept = Vec::with_capacity(block_count);
    let mut tags = Vec::with_capacity(block_count);
    for &s in &representative {
        transitions.extend(table.row(s).iter().map(|&t| block[t as usize] as StateId));
        accept.push(table.accept[s]);
        tags.push(table.tags[s]);
    }
    debug!("Minimization reduced {} states to {}.", n, block_count);
    DfaTable {
        transitions,
        accept,
        tags,
    }
}

/// Renumbers states breadth-first from `start`, visiting bytes in ascending
/// order, and drops unreachable states. Equal automata come out identical.
pub fn canonicalize(table: &DfaTable, start: StateId) -> DfaTable {
    let n = table.state_count();
    let mut order: Vec<usize> = Vec::with_capacity(n);
    let mut new_id = vec![StateId::MAX; n];
    let mut queue = VecDeque::new();
    new_id[start as usize] = 0;
    order.push(start as usize);
    queue.push_back(start as usize);
    while let Some(s) = queue.pop_front() {
        for &t in table.row(s) {
            let t = t as usize;
            if new_id[t] == StateId::MAX {
                new_id[t] = order.len() as StateId;
                order.push(t);
                queue.push_back(t);
            }
        }
    }

    let mut transitions = Vec::with_capacity(order.len() * ALPHABET);
    for &s in &order {
        transitions.extend(table.row(s).iter().map(|&t| new_id[t as usize]));
    }
    DfaTable {
        transitions,
        accept: order.iter().map(|&s| table.accept[s]).collect(),
        tags: order.iter().map(|&s| table.tags[s]).collect(),
    }
}
