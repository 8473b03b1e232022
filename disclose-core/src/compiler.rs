//! compiler.rs - Turns pattern definitions into shareable DFA tables.
//!
//! [`compile_pattern`] runs the full pipeline for one definition. Compiled
//! tables are immutable and handed out behind `Arc`; a process-wide cache
//! keyed by a hash of the definition avoids compiling the same pattern twice.
//! [`PatternRegistry`] compiles a whole [`PatternConfig`] up front.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use crate::config::{
    ExpectedCount, PatternConfig, PatternDefinition, MAX_CAPACITY, MAX_CAPTURE_GROUPS, MAX_PATTERN_LENGTH,
};
use crate::engine::EngineOptions;
use crate::engines::dfa_engine::DfaEngine;
use crate::errors::DiscloseError;
use crate::pattern::dfa::{self, DfaError, DfaTable, GroupMask, StateId, ALPHABET};
use crate::pattern::nfa::{Nfa, NfaError};
use crate::pattern::{is_valid_capture_name, parse, Node};

/// A compiled pattern: a total transition table over all 256 byte values,
/// with per-state accept flags and capture group masks.
///
/// State 0 is the start state. States are numbered breadth-first from it, so
/// compiling the same definition twice yields identical tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct CompiledPattern {
    pub name: String,
    pub version: String,
    /// Buffer capacity every scan with this pattern runs over.
    pub capacity: usize,
    pub anchored: bool,
    pub unwrap_soft_breaks: bool,
    pub expected_count: ExpectedCount,
    /// Capture group names, indexed by mask bit.
    pub groups: Vec<String>,
    transitions: Vec<StateId>,
    accept: Vec<bool>,
    tags: Vec<GroupMask>,
}

impl CompiledPattern {
    pub fn state_count(&self) -> usize {
        self.accept.len()
    }

    #[inline]
    pub fn next_state(&self, state: StateId, byte: u8) -> StateId {
        self.transitions[state as usize * ALPHABET + byte as usize]
    }

    #[inline]
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accept[state as usize]
    }

    /// Every group `state` belongs to, one bit per group index.
    #[inline]
    pub fn groups_at(&self, state: StateId) -> GroupMask {
        self.tags[state as usize]
    }

    #[inline]
    pub fn in_group(&self, state: StateId, index: u16) -> bool {
        self.tags[state as usize] & (1 << index) != 0
    }

    pub fn group_index(&self, group: &str) -> Option<u16> {
        self.groups.iter().position(|g| g == group).map(|i| i as u16)
    }

    /// The states whose entry reveals a byte of `group`. Sets for different
    /// groups may overlap.
    pub fn capture_states(&self, group: &str) -> Result<Vec<StateId>, DiscloseError> {
        let index = self
            .group_index(group)
            .ok_or_else(|| DiscloseError::UnknownCaptureGroup(self.name.clone(), group.to_string()))?;
        Ok(self
            .tags
            .iter()
            .enumerate()
            .filter(|(_, mask)| **mask & (1 << index) != 0)
            .map(|(s, _)| s as StateId)
            .collect())
    }

    /// Lowercase hex SHA-256 over a little-endian encoding of the capacity,
    /// the group names and the table.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.capacity as u64).to_le_bytes());
        hasher.update((self.groups.len() as u64).to_le_bytes());
        for group in &self.groups {
            hasher.update((group.len() as u64).to_le_bytes());
            hasher.update(group.as_bytes());
        }
        hasher.update((self.state_count() as u64).to_le_bytes());
        for t in &self.transitions {
            hasher.update(t.to_le_bytes());
        }
        for (accept, mask) in self.accept.iter().zip(&self.tags) {
            hasher.update([*accept as u8]);
            hasher.update(mask.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Encodes the pattern as a binary artifact.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DiscloseError> {
        bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| DiscloseError::SerializationError(e.to_string()))
    }

    /// Decodes and checks an artifact written by [`CompiledPattern::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DiscloseError> {
        let (pattern, _): (CompiledPattern, usize) =
            bincode::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| DiscloseError::SerializationError(e.to_string()))?;
        pattern.validate()?;
        Ok(pattern)
    }

    /// Checks the structural invariants of a table that came from outside.
    pub fn validate(&self) -> Result<(), DiscloseError> {
        let n = self.state_count();
        let problem = if n == 0 {
            Some("table has no states".to_string())
        } else if self.tags.len() != n || self.transitions.len() != n * ALPHABET {
            Some(format!("table shape does not match {n} states"))
        } else if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            Some(format!("capacity {} is out of range", self.capacity))
        } else if self.transitions.iter().any(|&t| t as usize >= n) {
            Some("transition target out of range".to_string())
        } else if self.groups.len() > MAX_CAPTURE_GROUPS {
            Some(format!("{} capture groups exceed the limit of {MAX_CAPTURE_GROUPS}", self.groups.len()))
        } else if self.tags.iter().any(|&mask| mask & !group_bits(self.groups.len()) != 0) {
            Some("group mask names an unknown group".to_string())
        } else {
            None
        };
        match problem {
            Some(reason) => Err(DiscloseError::SerializationError(format!(
                "pattern '{}': {}",
                self.name, reason
            ))),
            None => Ok(()),
        }
    }

    fn from_table(definition: &PatternDefinition, groups: Vec<String>, table: DfaTable) -> Self {
        Self {
            name: definition.name.clone(),
            version: definition.version.clone(),
            capacity: definition.max_bytes,
            anchored: definition.anchored,
            unwrap_soft_breaks: definition.unwrap_soft_breaks,
            expected_count: definition.expected_count,
            groups,
            transitions: table.transitions,
            accept: table.accept,
            tags: table.tags,
        }
    }
}

/// Compiled patterns keyed by a hash of their definition. Entries are only
/// inserted after a successful compilation.
static COMPILED_PATTERN_CACHE: Lazy<RwLock<HashMap<u64, Arc<CompiledPattern>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn hash_definition(definition: &PatternDefinition) -> u64 {
    let mut hasher = DefaultHasher::new();
    definition.hash(&mut hasher);
    hasher.finish()
}

/// Compiles one definition from its pattern text.
pub fn compile_pattern(definition: &PatternDefinition) -> Result<CompiledPattern, DiscloseError> {
    let text = definition.pattern_text()?;
    if text.len() > MAX_PATTERN_LENGTH {
        return Err(DiscloseError::PatternLengthExceeded(
            definition.name.clone(),
            text.len(),
            MAX_PATTERN_LENGTH,
        ));
    }
    debug!("Compiling pattern '{}': {:?}", definition.name, text);
    let node = parse(&text).map_err(|e| DiscloseError::from_parse(&definition.name, e))?;
    compile_node(definition, &node)
}

/// Compiles a syntax tree built in code. Only the metadata of `definition` is
/// used; its `regex` and `parts` are ignored.
pub fn compile_node(definition: &PatternDefinition, node: &Node) -> Result<CompiledPattern, DiscloseError> {
    let name = &definition.name;
    if definition.max_bytes == 0 || definition.max_bytes > MAX_CAPACITY {
        return Err(DiscloseError::PatternCompileError(
            name.clone(),
            format!("capacity must be between 1 and {MAX_CAPACITY}, got {}", definition.max_bytes),
        ));
    }
    check_captures(name, node, None)?;

    let nfa_error = |e: NfaError| match e {
        NfaError::TooManyStates(limit) => {
            DiscloseError::PatternCompileError(name.clone(), format!("NFA exceeds {limit} states"))
        }
        NfaError::TooManyGroups => DiscloseError::CaptureDefinitionError(
            name.clone(),
            format!("more than {MAX_CAPTURE_GROUPS} capture groups"),
        ),
    };

    // One attempt anchored at the start: its groups must never share a byte.
    let single = Nfa::build(node, true).map_err(nfa_error)?;
    if single.matches_empty() {
        return Err(DiscloseError::PatternCompileError(
            name.clone(),
            "pattern matches the empty string".to_string(),
        ));
    }
    let dfa_error = |e: DfaError, groups: &[String]| match e {
        DfaError::TooManyStates(limit) => {
            DiscloseError::PatternCompileError(name.clone(), format!("DFA exceeds {limit} states"))
        }
        DfaError::CaptureConflict(a, b) => DiscloseError::CaptureDefinitionError(
            name.clone(),
            format!(
                "within one match a byte can be consumed by both '{}' and '{}'",
                groups[a as usize], groups[b as usize]
            ),
        ),
    };
    let single_table = dfa::determinize(&single, true).map_err(|e| dfa_error(e, &single.groups))?;

    let (nfa, table) = if definition.anchored {
        (single, single_table)
    } else {
        let search = Nfa::build(node, false).map_err(nfa_error)?;
        let table = dfa::determinize(&search, false).map_err(|e| dfa_error(e, &search.groups))?;
        (search, table)
    };
    let raw_states = table.state_count();
    let table = if definition.minimize {
        dfa::canonicalize(&dfa::minimize(&table), 0)
    } else {
        dfa::canonicalize(&table, 0)
    };

    debug!(
        "Pattern '{}' compiled: {} DFA states ({} before minimization), groups {:?}.",
        name,
        table.state_count(),
        raw_states,
        nfa.groups
    );
    Ok(CompiledPattern::from_table(definition, nfa.groups, table))
}

/// The mask with one bit set for each of `count` groups.
fn group_bits(count: usize) -> GroupMask {
    if count >= 64 {
        GroupMask::MAX
    } else {
        (1 << count) - 1
    }
}

/// Rejects nested captures and invalid capture names in trees built in code.
fn check_captures(pattern: &str, node: &Node, enclosing: Option<&str>) -> Result<(), DiscloseError> {
    match node {
        Node::Capture { name, node } => {
            if let Some(outer) = enclosing {
                return Err(DiscloseError::CaptureDefinitionError(
                    pattern.to_string(),
                    format!("capture '{name}' is nested inside '{outer}'"),
                ));
            }
            if !is_valid_capture_name(name) {
                return Err(DiscloseError::CaptureDefinitionError(
                    pattern.to_string(),
                    format!("invalid capture name '{name}'"),
                ));
            }
            check_captures(pattern, node, Some(name))
        }
        Node::Concat(nodes) | Node::Alternate(nodes) => nodes
            .iter()
            .try_for_each(|n| check_captures(pattern, n, enclosing)),
        Node::Repeat { node, .. } => check_captures(pattern, node, enclosing),
        Node::Empty | Node::Class(_) | Node::StartAnchor => Ok(()),
    }
}

/// Gets a compiled pattern from the cache or compiles it if not found.
pub fn get_or_compile_pattern(definition: &PatternDefinition) -> Result<Arc<CompiledPattern>, DiscloseError> {
    let cache_key = hash_definition(definition);
    {
        let cache = COMPILED_PATTERN_CACHE
            .read()
            .map_err(|_| DiscloseError::Fatal("compiled pattern cache lock poisoned".to_string()))?;
        if let Some(pattern) = cache.get(&cache_key) {
            debug!("Serving pattern '{}' from cache (key {}).", definition.name, cache_key);
            return Ok(Arc::clone(pattern));
        }
    }

    let compiled = Arc::new(compile_pattern(definition)?);
    COMPILED_PATTERN_CACHE
        .write()
        .map_err(|_| DiscloseError::Fatal("compiled pattern cache lock poisoned".to_string()))?
        .insert(cache_key, Arc::clone(&compiled));
    debug!("Compiled and cached pattern '{}' (key {}).", definition.name, cache_key);
    Ok(compiled)
}

/// A named set of compiled patterns, ready to hand out engines.
#[derive(Debug, Default, Clone)]
pub struct PatternRegistry {
    order: Vec<String>,
    patterns: HashMap<String, Arc<CompiledPattern>>,
}

impl PatternRegistry {
    /// Compiles every definition in `config`. All failures are collected
    /// into a single error.
    pub fn compile(config: &PatternConfig) -> Result<Self, DiscloseError> {
        debug!("Compiling registry of {} patterns.", config.patterns.len());
        let mut registry = PatternRegistry::default();
        let mut errors = Vec::new();
        for definition in &config.patterns {
            match get_or_compile_pattern(definition) {
                Ok(pattern) => registry.insert(pattern),
                Err(e) => errors.push(e.to_string()),
            }
        }
        if errors.is_empty() {
            Ok(registry)
        } else {
            Err(DiscloseError::Fatal(format!(
                "Failed to compile {} pattern(s):\n{}",
                errors.len(),
                errors.join("\n")
            )))
        }
    }

    /// Adds an already compiled pattern, replacing one of the same name.
    pub fn insert(&mut self, pattern: Arc<CompiledPattern>) {
        if !self.patterns.contains_key(&pattern.name) {
            self.order.push(pattern.name.clone());
        }
        self.patterns.insert(pattern.name.clone(), pattern);
    }

    pub fn get(&self, name: &str) -> Result<Arc<CompiledPattern>, DiscloseError> {
        self.patterns
            .get(name)
            .cloned()
            .ok_or_else(|| DiscloseError::UnknownPattern(name.to_string()))
    }

    /// An engine for the named pattern with options taken from its definition.
    pub fn engine(&self, name: &str) -> Result<DfaEngine, DiscloseError> {
        let pattern = self.get(name)?;
        let options = EngineOptions::for_pattern(&pattern);
        Ok(DfaEngine::new(pattern, options))
    }

    /// Names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
