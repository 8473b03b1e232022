// disclose-core/src/lib.rs
//! # Disclose Core Library
//!
//! `disclose-core` decides whether a fixed-capacity message buffer (typically
//! raw email headers or body) matches a declared byte pattern, counts how many
//! times it matches, and produces copies of the buffer in which only the bytes
//! of named capture spans survive. Everything else is replaced with zero.
//!
//! Patterns are compiled ahead of time into total DFA transition tables. A scan
//! is a single pass over the whole buffer with no backtracking and no early
//! exit, so two independent implementations fed the same table and the same
//! buffer produce the same outputs bit for bit.
//!
//! ## Modules
//!
//! * `buffer`: The fixed-capacity, zero-padded `ByteBuffer`.
//! * `preprocess`: Quoted-printable soft line break removal and CRLF normalization.
//! * `pattern`: Pattern syntax, NFA construction, subset construction and minimization.
//! * `compiler`: `CompiledPattern`, the compile cache and `PatternRegistry`.
//! * `executor`: Runs a table over a buffer and counts matches.
//! * `reveal`: Extracts per-group reveal buffers and reshapes them.
//! * `engine`: Defines the `DisclosureEngine` trait and `MatchOutcome`.
//! * `engines`: Contains concrete implementations of the `DisclosureEngine` trait.
//! * `config`: Data-only pattern definitions loaded from YAML.
//! * `headless`: Convenience wrappers for one-shot use.
//!
//! ## Public API
//!
//! **Configuration**
//!
//! * [`PatternConfig`]: Manages collections of `PatternDefinition`s, including loading and filtering.
//! * [`PatternDefinition`]: One data-only pattern with its capacity and expected-count policy.
//! * [`merge_patterns`]: Merges default and user-defined configurations.
//!
//! **Compilation**
//!
//! * [`compile_pattern`]: Compiles one definition.
//! * [`get_or_compile_pattern`]: The cached, shareable variant.
//! * [`PatternRegistry`]: Compiles a whole configuration up front and hands out engines.
//!
//! **Scanning**
//!
//! * [`DisclosureEngine`]: The engine trait.
//! * [`DfaEngine`]: Its table-driven implementation.
//! * [`MatchOutcome`]: Match count, policy verdict and reveal buffers.
//!
//! ## Usage Example
//!
//! ```rust
//! use disclose_core::{headless_disclose, PatternConfig};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let config = PatternConfig::load_default_patterns()?;
//!     let message = b"From: PayLah! Alerts <paylah.alert@dbs.com>\r\nto:te";
//!
//!     let outcome = headless_disclose(&config, "from_email", message, None)?;
//!     assert_eq!(outcome.match_count, 1);
//!
//!     let email = outcome.reveal("email").expect("pattern defines an email group");
//!     assert_eq!(email.revealed_text(), "paylah.alert@dbs.com");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`DiscloseError`]. Compilation failures are
//! setup-time errors for one pattern and never poison shared state. A scan that
//! finds nothing, or finds a different number of matches than expected, is not
//! an error; callers judge the count with [`MatchOutcome::satisfies_policy`].
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod buffer;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod executor;
pub mod headless;
pub mod pattern;
pub mod preprocess;
pub mod reveal;

/// Re-exports the fixed-capacity buffer.
pub use buffer::ByteBuffer;

/// Re-exports the public configuration types and functions.
pub use config::{
    merge_patterns, validate_patterns, ExpectedCount, PatternConfig, PatternDefinition, PatternPart,
    MAX_CAPACITY, MAX_PATTERN_LENGTH,
};

/// Re-exports the custom error type for clear error reporting.
pub use errors::DiscloseError;

/// Re-exports compilation entry points.
pub use compiler::{compile_node, compile_pattern, get_or_compile_pattern, CompiledPattern, PatternRegistry};

/// Re-exports the engine trait, its options and its result types.
pub use engine::{DisclosureEngine, EngineOptions, MatchOutcome, Signals};
pub use engines::dfa_engine::DfaEngine;

pub use executor::{count_matches, execute, StateTrace};
pub use preprocess::{normalize_line_endings, unwrap_soft_breaks};
pub use reveal::{extract_all, extract_reveal, pack_bytes, RevealBuffer};

/// Re-exports types and functions for one-shot, non-interactive use.
pub use headless::{headless_disclose, headless_scan};
