//! 256-bit byte sets and alphabet compression.

use std::collections::HashMap;
use std::fmt;

/// A set of byte values, stored as a 256-bit bitmap.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByteSet {
    bits: [u64; 4],
}

impl ByteSet {
    pub const fn empty() -> Self {
        Self { bits: [0; 4] }
    }

    pub const fn full() -> Self {
        Self { bits: [u64::MAX; 4] }
    }

    pub fn single(b: u8) -> Self {
        let mut set = Self::empty();
        set.insert(b);
        set
    }

    /// Inclusive range `lo..=hi`.
    pub fn range(lo: u8, hi: u8) -> Self {
        let mut set = Self::empty();
        set.insert_range(lo, hi);
        set
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut set = Self::empty();
        for &b in bytes {
            set.insert(b);
        }
        set
    }

    /// `[0-9]`
    pub fn digit() -> Self {
        Self::range(b'0', b'9')
    }

    /// `[A-Za-z0-9_]`
    pub fn word() -> Self {
        let mut set = Self::range(b'a', b'z');
        set.insert_range(b'A', b'Z');
        set.insert_range(b'0', b'9');
        set.insert(b'_');
        set
    }

    /// Space, tab, CR, LF, vertical tab and form feed.
    pub fn space() -> Self {
        Self::from_bytes(b" \t\r\n\x0b\x0c")
    }

    pub fn insert(&mut self, b: u8) {
        self.bits[(b >> 6) as usize] |= 1u64 << (b & 63);
    }

    pub fn insert_range(&mut self, lo: u8, hi: u8) {
        for b in lo..=hi {
            self.insert(b);
        }
    }

    pub fn contains(&self, b: u8) -> bool {
        self.bits[(b >> 6) as usize] & (1u64 << (b & 63)) != 0
    }

    pub fn union(&self, other: &ByteSet) -> ByteSet {
        let mut bits = self.bits;
        for (dst, src) in bits.iter_mut().zip(other.bits.iter()) {
            *dst |= *src;
        }
        ByteSet { bits }
    }

    pub fn complement(&self) -> ByteSet {
        ByteSet {
            bits: [!self.bits[0], !self.bits[1], !self.bits[2], !self.bits[3]],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0u16..=255).map(|b| b as u8).filter(move |&b| self.contains(b))
    }

    /// The smallest byte in the set.
    pub fn first(&self) -> Option<u8> {
        self.bits
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| (i as u32 * 64 + w.trailing_zeros()) as u8)
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSet[")?;
        let mut first = true;
        let mut b: u16 = 0;
        while b <= 255 {
            if !self.contains(b as u8) {
                b += 1;
                continue;
            }
            let start = b;
            while b < 255 && self.contains((b + 1) as u8) {
                b += 1;
            }
            if !first {
                write!(f, ",")?;
            }
            first = false;
            if start == b {
                write!(f, "{:#04x}", start)?;
            } else {
                write!(f, "{:#04x}-{:#04x}", start, b)?;
            }
            b += 1;
        }
        write!(f, "]")
    }
}

/// A partition of the 256 byte values into classes that no byte set in a
/// pattern can tell apart. Transitions only need computing once per class.
#[derive(Debug, Clone)]
pub struct ByteClasses {
    class_of: [u16; 256],
    count: usize,
}

impl ByteClasses {
    /// Refines the trivial one-class partition by every set in `sets`.
    pub fn from_sets<'a>(sets: impl IntoIterator<Item = &'a ByteSet>) -> Self {
        let mut class_of = [0u16; 256];
        let mut count = 1usize;
        for set in sets {
            let mut split: HashMap<(u16, bool), u16> = HashMap::new();
            let mut next = 0u16;
            for b in 0..256usize {
                let key = (class_of[b], set.contains(b as u8));
                let id = *split.entry(key).or_insert_with(|| {
                    let id = next;
                    next += 1;
                    id
                });
                class_of[b] = id;
            }
            count = next as usize;
        }
        Self { class_of, count }
    }

    pub fn class_of(&self, b: u8) -> usize {
        self.class_of[b as usize] as usize
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// One representative byte per class, indexed by class id.
    pub fn representatives(&self) -> Vec<u8> {
        let mut reps = vec![None; self.count];
        for b in 0..256usize {
            let class = self.class_of[b] as usize;
            if reps[class].is_none() {
                reps[class] = Some(b as u8);
            }
        }
        reps.into_iter().map(|r| r.unwrap_or(0)).collect()
    }
}
