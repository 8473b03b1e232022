// disclose-core/src/engines/dfa_engine.rs
//! A `DisclosureEngine` that runs a compiled DFA table over a fixed-capacity
//! buffer.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use std::sync::Arc;

use crate::buffer::ByteBuffer;
use crate::compiler::{get_or_compile_pattern, CompiledPattern};
use crate::config::PatternDefinition;
use crate::engine::{DisclosureEngine, EngineOptions, MatchOutcome};
use crate::errors::DiscloseError;
use crate::executor::{count_matches, execute, StateTrace};
use crate::preprocess;
use crate::reveal::{extract_all, extract_reveal};

#[derive(Debug, Clone)]
pub struct DfaEngine {
    pattern: Arc<CompiledPattern>,
    options: EngineOptions,
    fingerprint: String,
}

impl DfaEngine {
    pub fn new(pattern: Arc<CompiledPattern>, options: EngineOptions) -> Self {
        let fingerprint = pattern.fingerprint();
        Self {
            pattern,
            options,
            fingerprint,
        }
    }

    /// Compiles (or fetches from cache) the definition and builds an engine
    /// with the options it asks for.
    pub fn from_definition(definition: &PatternDefinition) -> Result<Self, DiscloseError> {
        let pattern = get_or_compile_pattern(definition)?;
        let options = EngineOptions::for_pattern(&pattern);
        Ok(Self::new(pattern, options))
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn pattern(&self) -> Arc<CompiledPattern> {
        Arc::clone(&self.pattern)
    }
}

impl DisclosureEngine for DfaEngine {
    fn compiled_pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    fn options(&self) -> &EngineOptions {
        &self.options
    }

    fn prepare(&self, input: &[u8]) -> Result<ByteBuffer, DiscloseError> {
        let mut buffer = ByteBuffer::from_input(input, self.pattern.capacity)?;
        if self.options.normalize_line_endings {
            buffer = preprocess::normalize_line_endings(&buffer)?;
        }
        if self.options.unwrap_soft_breaks {
            buffer = preprocess::unwrap_soft_breaks(&buffer);
        }
        Ok(buffer)
    }

    fn trace(&self, buffer: &ByteBuffer) -> Result<StateTrace, DiscloseError> {
        if buffer.capacity() != self.pattern.capacity {
            return Err(DiscloseError::CapacityMismatch {
                expected: self.pattern.capacity,
                actual: buffer.capacity(),
            });
        }
        Ok(execute(&self.pattern, buffer))
    }

    fn scan_buffer(&self, buffer: &ByteBuffer) -> Result<MatchOutcome, DiscloseError> {
        let trace = self.trace(buffer)?;
        let match_count = count_matches(&self.pattern, &trace);
        let reveals = match &self.options.groups {
            None => extract_all(&self.pattern, buffer, &trace)?,
            Some(groups) => groups
                .iter()
                .map(|g| extract_reveal(&self.pattern, buffer, &trace, g))
                .collect::<Result<Vec<_>, _>>()?,
        };
        debug!(
            "Scanned {} bytes with pattern '{}': {} match(es), expected {}.",
            buffer.capacity(),
            self.pattern.name,
            match_count,
            self.pattern.expected_count
        );
        Ok(MatchOutcome {
            pattern: self.pattern.name.clone(),
            fingerprint: self.fingerprint.clone(),
            match_count,
            expected: self.pattern.expected_count,
            reveals,
        })
    }
}
