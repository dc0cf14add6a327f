use serde::{Deserialize, Serialize};
use std::fmt;

/// the largest number range a set can be drawn from
pub const MAX_RANGE: usize = 64;

/// separator used when printing a set as numbers
pub const NUMBER_DELIMITER: char = ';';

/// a subset of the numbers 1..=64 stored as a bit mask.
/// bit i is set iff the number i + 1 is a member. used for both tickets and matches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NumberSet {
    bits: u64,
}

impl NumberSet {
    pub const EMPTY: NumberSet = NumberSet { bits: 0 };

    pub fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    /// build a set from 1-based numbers
    pub fn from_numbers(numbers: &[u8]) -> Self {
        let mut bits = 0u64;
        for &number in numbers {
            if number == 0 || number as usize > MAX_RANGE {
                panic!(
                    "Attempted to create number set containing {} which is outside of [1, {}]",
                    number, MAX_RANGE
                );
            }
            bits |= 1 << (number - 1);
        }
        Self { bits }
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// whether the 1-based number is a member
    pub fn contains(&self, number: u8) -> bool {
        number != 0 && number as usize <= MAX_RANGE && self.bits & (1 << (number - 1)) != 0
    }

    pub fn is_subset_of(&self, other: &NumberSet) -> bool {
        self.bits & other.bits == self.bits
    }

    pub fn intersection(&self, other: &NumberSet) -> NumberSet {
        NumberSet {
            bits: self.bits & other.bits,
        }
    }

    /// size of the intersection without materializing it
    #[inline(always)]
    pub fn overlap(&self, other: &NumberSet) -> usize {
        (self.bits & other.bits).count_ones() as usize
    }

    /// 0-based bit positions in ascending order
    pub fn positions(&self) -> Vec<u8> {
        let mut positions = Vec::with_capacity(self.len());
        let mut remaining = self.bits;
        while remaining != 0 {
            positions.push(remaining.trailing_zeros() as u8);
            // clear the lowest set bit
            remaining &= remaining - 1;
        }
        positions
    }

    /// 1-based numbers in ascending order
    pub fn numbers(&self) -> Vec<u8> {
        self.positions().into_iter().map(|p| p + 1).collect()
    }
}

impl From<NumberSet> for u64 {
    fn from(set: NumberSet) -> Self {
        set.bits
    }
}

impl From<u64> for NumberSet {
    fn from(bits: u64) -> Self {
        NumberSet::from_bits(bits)
    }
}

impl fmt::Display for NumberSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .numbers()
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<String>>()
            .join(&NUMBER_DELIMITER.to_string());
        write!(f, "{}", joined)
    }
}
