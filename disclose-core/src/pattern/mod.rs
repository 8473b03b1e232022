//! Pattern front end and automaton construction.
//!
//! A pattern travels through these stages:
//!
//! * [`parser`]: pattern text to [`ast::Node`].
//! * [`nfa`]: syntax tree to a Thompson NFA whose byte states carry capture labels.
//! * [`byte_set`]: byte sets and the byte classes used to shrink the alphabet.
//! * [`dfa`]: subset construction, minimization and canonical numbering.
//!
//! [`crate::compiler`] strings them together and attaches pattern metadata.

pub mod ast;
pub mod byte_set;
pub mod dfa;
pub mod nfa;
pub mod parser;

pub use ast::Node;
pub use byte_set::{ByteClasses, ByteSet};
pub use dfa::{DfaError, DfaTable, GroupMask, StateId, ALPHABET};
pub use nfa::{Nfa, NfaError};
pub use parser::{is_valid_capture_name, parse, ParseError};
