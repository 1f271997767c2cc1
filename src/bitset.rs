//! A growable bit vector with the in-place boolean algebra used by queries.

use std::fmt;

use bitvec::order::Lsb0;
use bitvec::vec::BitVec;

type Word = u64;

const WORD_BITS: usize = Word::BITS as usize;

/// A growable set of small integers, stored one bit per position.
///
/// The backing length is kept a multiple of the 64-bit word size,
/// so [`and`](Self::and), [`or`](Self::or) and [`and_not`](Self::and_not)
/// can combine whole words without masking a partial tail.
///
/// Positions beyond the current backing length are absent:
/// [`test`](Self::test) returns `false` and [`clear`](Self::clear) is a no-op
/// there, while [`set`](Self::set) grows the backing as needed.
#[derive(Clone, Default)]
pub struct Bitset {
    bits: BitVec<Word, Lsb0>,
}

impl Bitset {
    /// Creates an empty bitset.
    pub fn new() -> Self { Self::default() }

    /// Creates a bitset that already covers positions `0..len` without growing.
    pub fn with_capacity(len: usize) -> Self {
        Self { bits: BitVec::repeat(false, word_ceil(len)) }
    }

    /// Marks `pos` as present, growing the backing to the containing word
    /// if `pos` is beyond the current length. Never fails.
    pub fn set(&mut self, pos: usize) {
        if pos >= self.bits.len() {
            self.bits.resize(word_ceil(pos + 1), false);
        }
        self.bits.set(pos, true);
    }

    /// Marks `pos` as absent. A no-op if `pos` is beyond the current length.
    pub fn clear(&mut self, pos: usize) {
        if pos < self.bits.len() {
            self.bits.set(pos, false);
        }
    }

    /// Returns whether `pos` is present.
    /// `false` for positions beyond the current length.
    pub fn test(&self, pos: usize) -> bool { self.bits.get(pos).map_or(false, |bit| *bit) }

    /// Intersects in place with `other`.
    ///
    /// Positions beyond `other`'s length are absent in `other`,
    /// so the receiver is truncated down to it.
    pub fn and(&mut self, other: &Bitset) {
        if other.bits.len() < self.bits.len() {
            self.bits.truncate(other.bits.len());
        }
        for (word, &mask) in self.bits.as_raw_mut_slice().iter_mut().zip(other.bits.as_raw_slice())
        {
            *word &= mask;
        }
    }

    /// Unions in place with `other`, growing the receiver to cover it.
    pub fn or(&mut self, other: &Bitset) {
        if other.bits.len() > self.bits.len() {
            self.bits.resize(other.bits.len(), false);
        }
        for (word, &mask) in self.bits.as_raw_mut_slice().iter_mut().zip(other.bits.as_raw_slice())
        {
            *word |= mask;
        }
    }

    /// Subtracts `other` in place.
    ///
    /// Receiver positions beyond `other`'s length are kept:
    /// a position absent in `other` removes nothing.
    pub fn and_not(&mut self, other: &Bitset) {
        for (word, &mask) in self.bits.as_raw_mut_slice().iter_mut().zip(other.bits.as_raw_slice())
        {
            *word &= !mask;
        }
    }

    /// Returns the present positions in ascending order.
    ///
    /// Enumeration skips over absent words,
    /// so it is proportional to the population count rather than the length.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ { self.bits.iter_ones() }

    /// Returns the number of present positions.
    pub fn count_ones(&self) -> usize { self.bits.count_ones() }

    /// Returns the current backing length in bits, always a multiple of 64.
    pub fn len(&self) -> usize { self.bits.len() }

    /// Returns whether no position is present.
    pub fn is_empty(&self) -> bool { self.count_ones() == 0 }
}

impl fmt::Debug for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter_ones()).finish()
    }
}

fn word_ceil(len: usize) -> usize { (len + WORD_BITS - 1) / WORD_BITS * WORD_BITS }
