pub mod incremental;
pub mod pairwise;

/// live coverage bookkeeping for one trial. a ticket is covered once some selected ticket
/// shares at least one match with it (or it was selected itself), and never becomes
/// uncovered again.
pub trait CoverageEngine {
    fn ticket_count(&self) -> usize;

    fn is_covered(&self, ticket_index: usize) -> bool;

    /// other, still uncovered tickets that selecting this ticket would cover
    fn remaining_coverage(&self, ticket_index: usize) -> u32;

    fn covered_count(&self) -> usize;

    /// whether the two tickets contain a common match
    fn shares_match(&self, a: usize, b: usize) -> bool;

    /// record the selection of a ticket into the wheel: cover it and every ticket it shares a
    /// match with, then bring every remaining coverage count up to date
    fn charge_selection(&mut self, start_ticket: usize);
}

/// per-trial state of a single ticket
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketCoverage {
    pub is_covered: bool,
    pub remaining_coverage: u32,
}

/// set of tickets that have already been charged, cleared in constant time by moving to a
/// new epoch instead of touching every entry
pub(crate) struct ChargeMarks {
    stamps: Vec<u32>,
    epoch: u32,
}

impl ChargeMarks {
    /// marks for `ticket_count` tickets, starting in a fresh (empty) epoch
    pub(crate) fn new(ticket_count: usize) -> Self {
        Self {
            stamps: vec![0; ticket_count],
            epoch: 1,
        }
    }

    /// unmark every ticket
    pub(crate) fn clear(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            // stamps from a previous lap of the epoch counter would read as marked
            self.stamps.fill(0);
            self.epoch = 1;
        }
    }

    /// mark a ticket. returns whether it was unmarked before.
    #[inline(always)]
    pub(crate) fn mark(&mut self, ticket_index: usize) -> bool {
        if self.stamps[ticket_index] == self.epoch {
            return false;
        }
        self.stamps[ticket_index] = self.epoch;
        true
    }
}
