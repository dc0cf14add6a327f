use crate::coverage_engine::{CoverageEngine, TicketCoverage};
use crate::number_set::NumberSet;
use crate::problem_graph::adjacency::TicketAdjacency;

/// recompute every remaining coverage from scratch: the number of other uncovered tickets
/// sharing at least `match_size` numbers. quadratic in the ticket count.
pub fn update_all_potentials(
    tickets: &[NumberSet],
    match_size: usize,
    states: &mut [TicketCoverage],
) {
    for i in 0..tickets.len() {
        let mut potential = 0u32;
        for j in 0..tickets.len() {
            if i == j || states[j].is_covered {
                continue;
            }
            if tickets[i].overlap(&tickets[j]) >= match_size {
                potential += 1;
            }
        }
        states[i].remaining_coverage = potential;
    }
}

/// straightforward engine that rescans every pair after each selection
pub struct PairwiseEngine<'t> {
    tickets: &'t [NumberSet],
    match_size: usize,
    adjacency: &'t TicketAdjacency,
    states: Vec<TicketCoverage>,
    covered_count: usize,
}

impl<'t> PairwiseEngine<'t> {
    pub fn new(
        tickets: &'t [NumberSet],
        match_size: usize,
        adjacency: &'t TicketAdjacency,
    ) -> Self {
        if adjacency.ticket_count() != tickets.len() {
            panic!(
                "adjacency over {} tickets does not describe a universe of {} tickets",
                adjacency.ticket_count(),
                tickets.len()
            );
        }

        let mut states = vec![TicketCoverage::default(); tickets.len()];
        update_all_potentials(tickets, match_size, &mut states);
        Self {
            tickets,
            match_size,
            adjacency,
            states,
            covered_count: 0,
        }
    }

    pub fn states(&self) -> &[TicketCoverage] {
        &self.states
    }

    fn cover(&mut self, ticket_index: usize) {
        if !self.states[ticket_index].is_covered {
            self.states[ticket_index].is_covered = true;
            self.covered_count += 1;
        }
    }
}

impl CoverageEngine for PairwiseEngine<'_> {
    fn ticket_count(&self) -> usize {
        self.tickets.len()
    }

    fn is_covered(&self, ticket_index: usize) -> bool {
        self.states[ticket_index].is_covered
    }

    fn remaining_coverage(&self, ticket_index: usize) -> u32 {
        self.states[ticket_index].remaining_coverage
    }

    fn covered_count(&self) -> usize {
        self.covered_count
    }

    fn shares_match(&self, a: usize, b: usize) -> bool {
        self.tickets[a].overlap(&self.tickets[b]) >= self.match_size
    }

    fn charge_selection(&mut self, start_ticket: usize) {
        self.cover(start_ticket);
        let adjacency = self.adjacency;
        for &neighbour in adjacency.neighbours(start_ticket) {
            self.cover(neighbour as usize);
        }

        update_all_potentials(self.tickets, self.match_size, &mut self.states);
    }
}
