// disclose/src/lib.rs
//! # Disclose CLI Application
//!
//! This crate provides the command-line front end for `disclose-core`: scanning
//! a message with a named pattern, compiling pattern artifacts, listing
//! patterns and removing soft line breaks.
//!
//! License: MIT OR APACHE 2.0

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
