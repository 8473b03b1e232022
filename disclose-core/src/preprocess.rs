//! Transport-level clean-up applied to a buffer before matching.
//!
//! Quoted-printable bodies wrap long lines with a soft line break (`=` CR LF)
//! that carries no meaning. [`unwrap_soft_breaks`] removes those in a single
//! pass while keeping the buffer capacity, so byte offsets in the output line
//! up with what a verifier holding the same capacity computes.

use log::debug;

use crate::buffer::ByteBuffer;
use crate::errors::DiscloseError;

/// The soft line break elided by [`unwrap_soft_breaks`].
pub const SOFT_LINE_BREAK: [u8; 3] = [b'=', b'\r', b'\n'];

/// Removes every soft line break that begins at the read cursor, compacting
/// the remaining bytes to the left and zeroing the freed tail.
///
/// Exactly one left-to-right pass is made. A partial break at the end of the
/// buffer (a lone `=` or `=\r`) is copied through unchanged.
pub fn unwrap_soft_breaks(input: &ByteBuffer) -> ByteBuffer {
    let src = input.as_bytes();
    let capacity = src.len();
    let mut out = vec![0u8; capacity];
    let mut read = 0;
    let mut write = 0;
    let mut elided = 0usize;

    while read < capacity {
        if src[read..].starts_with(&SOFT_LINE_BREAK) {
            read += SOFT_LINE_BREAK.len();
            elided += 1;
            continue;
        }
        out[write] = src[read];
        write += 1;
        read += 1;
    }

    if elided > 0 {
        debug!("Elided {} soft line break(s); {} bytes remain before padding.", elided, write);
    }
    ByteBuffer::from_padded(out)
}

/// Inserts a CR before every LF that is not already preceded by one.
///
/// Some mail exports store bare LF line endings; the patterns and any
/// signature over the message expect CRLF. The result must still fit in the
/// buffer's capacity.
pub fn normalize_line_endings(input: &ByteBuffer) -> Result<ByteBuffer, DiscloseError> {
    let message = input.message();
    let mut out = Vec::with_capacity(message.len() + 16);
    for (i, &b) in message.iter().enumerate() {
        if b == b'\n' && (i == 0 || message[i - 1] != b'\r') {
            out.push(b'\r');
        }
        out.push(b);
    }
    ByteBuffer::from_input(&out, input.capacity())
}
