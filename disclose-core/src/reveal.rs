//! Builds the redacted copies of a buffer that expose only captured bytes.
//!
//! A byte is revealed for group `g` exactly when the state entered by
//! consuming it belongs to group `g`. Every other position holds zero. All groups
//! are read off the same trace, so a message is scanned only once no matter
//! how many spans it discloses.
//!
//! The helpers at the end of the module reshape revealed bytes for consumers
//! that want a fixed window or packed integer words.
//!
//! License: MIT OR APACHE 2.0

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::buffer::ByteBuffer;
use crate::compiler::CompiledPattern;
use crate::errors::DiscloseError;
use crate::executor::StateTrace;

lazy_static! {
    /// Whether revealed content may appear in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("DISCLOSE_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// Placeholder used in logs in place of revealed content.
pub fn redact_sensitive(bytes: &[u8]) -> String {
    const MAX_LEN: usize = 8;
    if bytes.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} bytes]", bytes.len())
    }
}

fn loggable(bytes: &[u8]) -> String {
    if *PII_DEBUG_ALLOWED {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        redact_sensitive(bytes)
    }
}

/// A copy of the buffer in which only the bytes of one capture group survive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealBuffer {
    pub group: String,
    /// Same length as the scanned buffer.
    pub bytes: Vec<u8>,
    /// Maximal runs of revealed positions, in order.
    pub spans: Vec<Range<usize>>,
}

impl RevealBuffer {
    /// Index of the first revealed position.
    pub fn first_revealed_index(&self) -> Option<usize> {
        self.spans.first().map(|span| span.start)
    }

    /// The revealed bytes of every span, concatenated.
    pub fn revealed_bytes(&self) -> Vec<u8> {
        self.spans
            .iter()
            .flat_map(|span| self.bytes[span.clone()].iter().copied())
            .collect()
    }

    /// Revealed bytes as text, with invalid UTF-8 replaced.
    pub fn revealed_text(&self) -> String {
        String::from_utf8_lossy(&self.revealed_bytes()).into_owned()
    }

    /// `len` bytes starting at `start`, zero-filled past the end.
    pub fn shift_window(&self, start: usize, len: usize) -> Vec<u8> {
        let mut window = vec![0; len];
        if start < self.bytes.len() {
            let available = (self.bytes.len() - start).min(len);
            window[..available].copy_from_slice(&self.bytes[start..start + available]);
        }
        window
    }
}

/// Extracts the reveal buffer for one named group.
pub fn extract_reveal(
    pattern: &CompiledPattern,
    buffer: &ByteBuffer,
    trace: &StateTrace,
    group: &str,
) -> Result<RevealBuffer, DiscloseError> {
    let index = pattern
        .group_index(group)
        .ok_or_else(|| DiscloseError::UnknownCaptureGroup(pattern.name.clone(), group.to_string()))?;

    let input = buffer.as_bytes();
    if trace.len() != input.len() {
        return Err(DiscloseError::CapacityMismatch {
            expected: input.len(),
            actual: trace.len(),
        });
    }
    let mut bytes = vec![0u8; input.len()];
    let mut spans: Vec<Range<usize>> = Vec::new();
    for (i, &state) in trace.as_slice().iter().enumerate() {
        if !pattern.in_group(state, index) {
            continue;
        }
        bytes[i] = input[i];
        match spans.last_mut() {
            Some(span) if span.end == i => span.end = i + 1,
            _ => spans.push(i..i + 1),
        }
    }

    let reveal = RevealBuffer {
        group: group.to_string(),
        bytes,
        spans,
    };
    debug!(
        "Pattern '{}' group '{}': {} span(s), revealed '{}'",
        pattern.name,
        group,
        reveal.spans.len(),
        loggable(&reveal.revealed_bytes())
    );
    Ok(reveal)
}

/// Extracts every group of the pattern, in group order.
pub fn extract_all(
    pattern: &CompiledPattern,
    buffer: &ByteBuffer,
    trace: &StateTrace,
) -> Result<Vec<RevealBuffer>, DiscloseError> {
    pattern
        .groups
        .iter()
        .map(|group| extract_reveal(pattern, buffer, trace, group))
        .collect()
}

/// Packs bytes little-endian into integers of `bytes_per_word` bytes each.
/// The final word is zero-padded.
pub fn pack_bytes(bytes: &[u8], bytes_per_word: usize) -> Result<Vec<u128>, DiscloseError> {
    if bytes_per_word == 0 || bytes_per_word > 16 {
        return Err(DiscloseError::InvalidPackWidth(bytes_per_word));
    }
    Ok(bytes
        .chunks(bytes_per_word)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u128, |word, (i, &b)| word | (u128::from(b) << (8 * i)))
        })
        .collect())
}
