//! Terminal output helpers for the disclose CLI.
//! License: MIT OR APACHE 2.0

pub mod output;
