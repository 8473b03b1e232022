//! Fixed-capacity, zero-padded message buffers.
//!
//! Every scan runs over the full capacity of a [`ByteBuffer`], padding
//! included, so the shape of all derived outputs depends only on the capacity
//! and never on the length of the message that was loaded into it.

use serde::{Deserialize, Serialize};

use crate::errors::DiscloseError;

/// An ordered sequence of bytes with a fixed capacity. Bytes past the logical
/// length are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl ByteBuffer {
    /// Creates an all-zero buffer of the given capacity.
    pub fn zeroed(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
            len: 0,
        }
    }

    /// Copies `input` into a new buffer of `capacity` bytes.
    ///
    /// Input longer than the capacity is rejected, never truncated.
    pub fn from_input(input: &[u8], capacity: usize) -> Result<Self, DiscloseError> {
        if input.len() > capacity {
            return Err(DiscloseError::CapacityExceeded {
                len: input.len(),
                capacity,
            });
        }
        let mut bytes = vec![0; capacity];
        bytes[..input.len()].copy_from_slice(input);
        Ok(Self {
            bytes,
            len: input.len(),
        })
    }

    /// Builds a buffer from an already padded array. The logical length is the
    /// position after the last non-zero byte.
    pub fn from_padded(bytes: Vec<u8>) -> Self {
        let len = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        Self { bytes, len }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Length of the message before padding.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The full buffer, padding included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Only the message bytes, without the zero tail.
    pub fn message(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_pads_with_zero() {
        let buf = ByteBuffer::from_input(b"abc", 6).unwrap();
        assert_eq!(buf.as_bytes(), b"abc\0\0\0");
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.capacity(), 6);
        assert_eq!(buf.message(), b"abc");
    }

    #[test]
    fn test_exact_fit_is_accepted() {
        let buf = ByteBuffer::from_input(b"abcdef", 6).unwrap();
        assert_eq!(buf.len(), 6);
    }

    #[test]
    fn test_oversized_input_is_rejected() {
        let err = ByteBuffer::from_input(b"abcdefg", 6).unwrap_err();
        assert!(matches!(
            err,
            DiscloseError::CapacityExceeded { len: 7, capacity: 6 }
        ));
    }

    #[test]
    fn test_from_padded_recovers_length() {
        let buf = ByteBuffer::from_padded(b"ab\0c\0\0".to_vec());
        assert_eq!(buf.len(), 4);
        assert!(ByteBuffer::from_padded(vec![0; 4]).is_empty());
    }
}
