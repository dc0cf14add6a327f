use crate::coverage_math::binomial;
use crate::number_set::{NumberSet, MAX_RANGE};
use std::iter::FusedIterator;

/// walks the k-subsets of the positions 0..element_count in lexicographic order.
/// shared by the index-list and the bit-vector generators so both produce the same order.
struct CombinationCursor {
    element_count: usize,
    /// strictly increasing positions into a (conceptual) array of elements
    positions: Vec<usize>,
    /// combinations not yet emitted
    remaining: u64,
    /// set iff every combination has been emitted
    completed: bool,
}

impl CombinationCursor {
    fn new(element_count: usize, selection_size: usize) -> Self {
        Self {
            element_count,
            positions: (0..selection_size).collect(),
            remaining: binomial(element_count, selection_size).unwrap_or(u64::MAX),
            completed: selection_size > element_count,
        }
    }

    /// create the next set of positions from the current set of positions
    fn advance_positions(&mut self) {
        let selection_size = self.positions.len();
        for i in (0..selection_size).rev() {
            // position i can reach at most element_count - (selection_size - i)
            if self.positions[i] < self.element_count - (selection_size - i) {
                // bump this position and pack every later position directly behind it
                let next_position = self.positions[i] + 1;
                for (offset, j) in (i..selection_size).enumerate() {
                    self.positions[j] = next_position + offset;
                }
                return;
            }
        }

        self.completed = true;
    }

    /// render the current combination, then step past it
    fn emit<T>(&mut self, render: impl FnOnce(&[usize]) -> T) -> Option<T> {
        if self.completed {
            return None;
        }

        let item = render(&self.positions);
        self.remaining = self.remaining.saturating_sub(1);
        self.advance_positions();

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.completed {
            return (0, Some(0));
        }
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// lazily generates every k-subset of 0..n as a list of positions
pub struct IndexCombinationGenerator {
    cursor: CombinationCursor,
}

impl IndexCombinationGenerator {
    pub fn new(element_count: usize, selection_size: usize) -> Self {
        Self {
            cursor: CombinationCursor::new(element_count, selection_size),
        }
    }
}

impl Iterator for IndexCombinationGenerator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.emit(|positions| positions.to_vec())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cursor.size_hint()
    }
}

impl FusedIterator for IndexCombinationGenerator {}

/// lazily generates the k-subsets of a list of numbers as number sets.
/// the order is the lexicographic order of the positions and is identical across instances,
/// which is what lets a ticket index be translated back into its numbers.
pub struct SequentialCombinationGenerator {
    /// 0-based bit positions of the numbers being selected from, ascending
    entries: Vec<u8>,
    cursor: CombinationCursor,
}

impl SequentialCombinationGenerator {
    /// every `selection_size`-subset of the numbers 1..=range
    pub fn new(range: usize, selection_size: usize) -> Self {
        if range > MAX_RANGE {
            panic!(
                "Attempted to create combination generator over range {} which is larger than {}",
                range, MAX_RANGE
            );
        }
        Self {
            entries: (0..range as u8).collect(),
            cursor: CombinationCursor::new(range, selection_size),
        }
    }

    /// every `selection_size`-subset of the members of `set`
    pub fn over_members(set: NumberSet, selection_size: usize) -> Self {
        let entries = set.positions();
        let cursor = CombinationCursor::new(entries.len(), selection_size);
        Self { entries, cursor }
    }
}

impl Iterator for SequentialCombinationGenerator {
    type Item = NumberSet;

    fn next(&mut self) -> Option<Self::Item> {
        let entries = &self.entries;
        self.cursor.emit(|positions| {
            let mut bits = 0u64;
            for &position in positions {
                bits |= 1 << entries[position];
            }
            NumberSet::from_bits(bits)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cursor.size_hint()
    }
}

impl FusedIterator for SequentialCombinationGenerator {}

/// materialize every `selection_size`-subset of 1..=range.
/// visits the same order as `SequentialCombinationGenerator`.
pub fn all_combinations(range: usize, selection_size: usize) -> Vec<NumberSet> {
    if range > MAX_RANGE {
        panic!(
            "Attempted to enumerate combinations over range {} which is larger than {}",
            range, MAX_RANGE
        );
    }

    let capacity = binomial(range, selection_size)
        .and_then(|count| usize::try_from(count).ok())
        .unwrap_or(0);
    let mut combinations = Vec::with_capacity(capacity);
    if selection_size <= range {
        collect_combinations(range, 0, selection_size, 0, &mut combinations);
    }
    combinations
}

/// include/exclude recursion. depth is bounded by the range (at most 64).
fn collect_combinations(
    range: usize,
    position: usize,
    still_needed: usize,
    bits: u64,
    combinations: &mut Vec<NumberSet>,
) {
    if still_needed == 0 {
        combinations.push(NumberSet::from_bits(bits));
        return;
    }
    // not enough numbers left to finish this combination
    if range - position < still_needed {
        return;
    }

    // taking the current number first keeps the output lexicographic
    collect_combinations(
        range,
        position + 1,
        still_needed - 1,
        bits | 1 << position,
        combinations,
    );
    collect_combinations(range, position + 1, still_needed, bits, combinations);
}
