//! Logger setup for the disclose CLI.
//!
//! Log output goes to stderr so that JSON written to stdout stays parseable.
//! License: MIT OR APACHE 2.0

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Initializes the global logger.
///
/// With `Some(level)` the level is forced. With `None` the `RUST_LOG`
/// environment variable decides and the default is `warn`.
/// Calling it twice is harmless; the second call is ignored.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder
        .format(|buf, record| writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args()))
        .target(env_logger::Target::Stderr);
    let _ = builder.try_init();
}
