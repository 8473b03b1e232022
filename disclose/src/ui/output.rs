//! Status messages printed to stderr.
//!
//! Colors are only applied when the target stream is a terminal.
//! License: MIT OR APACHE 2.0

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// The kind of message being printed; decides prefix and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Warn,
    Error,
}

impl MessageKind {
    fn prefix(self) -> &'static str {
        match self {
            MessageKind::Info => "info",
            MessageKind::Warn => "warning",
            MessageKind::Error => "error",
        }
    }
}

/// Writes one prefixed message line to `writer`.
pub fn print_message<W: Write>(writer: &mut W, kind: MessageKind, msg: &str, use_color: bool) -> io::Result<()> {
    let prefix = kind.prefix();
    if use_color {
        match kind {
            MessageKind::Info => writeln!(writer, "{}: {}", prefix.cyan(), msg),
            MessageKind::Warn => writeln!(writer, "{}: {}", prefix.yellow().bold(), msg),
            MessageKind::Error => writeln!(writer, "{}: {}", prefix.red().bold(), msg),
        }
    } else {
        writeln!(writer, "{}: {}", prefix, msg)
    }
}

/// Helper for printing info messages to stderr.
pub fn info_msg(msg: impl AsRef<str>) {
    let use_color = io::stderr().is_terminal();
    let _ = print_message(&mut io::stderr(), MessageKind::Info, msg.as_ref(), use_color);
}

/// Helper for printing warning messages to stderr.
pub fn warn_msg(msg: impl AsRef<str>) {
    let use_color = io::stderr().is_terminal();
    let _ = print_message(&mut io::stderr(), MessageKind::Warn, msg.as_ref(), use_color);
}

/// Helper for printing error messages to stderr.
pub fn error_msg(msg: impl AsRef<str>) {
    let use_color = io::stderr().is_terminal();
    let _ = print_message(&mut io::stderr(), MessageKind::Error, msg.as_ref(), use_color);
}
