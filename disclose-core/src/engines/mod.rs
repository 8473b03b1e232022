// disclose-core/src/engines/mod.rs
//! Concrete implementations of the `DisclosureEngine` trait.
//!
//! Each engine lives in its own file and is declared here with
//! `pub mod <engine_name>;`.
//!
//! License: MIT OR APACHE 2.0

pub mod dfa_engine;
