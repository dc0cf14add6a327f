use crate::combination_generator::{all_combinations, SequentialCombinationGenerator};
use crate::config::{ConfigError, WheelConfig};
use crate::coverage_math::{binomial, initial_coverage_potential};
use crate::number_set::NumberSet;
use crate::progress::ProgressObserver;
use std::collections::HashMap;

pub mod adjacency;

/// the matches contained in a single ticket
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketNode {
    pub match_indexes: Vec<u32>,
}

/// the tickets containing a single match
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchNode {
    pub ticket_indexes: Vec<u32>,
}

/// bipartite containment structure between the ticket universe and the match universe.
/// immutable once built, shared read-only by every trial.
pub struct ProblemGraph {
    match_size: usize,
    /// ticket id -> numbers, in enumeration order
    tickets: Vec<NumberSet>,
    ticket_nodes: Vec<TicketNode>,
    match_nodes: Vec<MatchNode>,
    /// other tickets any ticket can cover before anything is selected
    initial_coverage: u32,
}

impl ProblemGraph {
    /// validate the configuration and build the graph for it
    pub fn build(
        config: &WheelConfig,
        observer: &mut dyn ProgressObserver,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let initial_coverage =
            initial_coverage_potential(config.range, config.ticket_size, config.match_size)
                .and_then(|potential| u32::try_from(potential).ok())
                .expect("initial coverage of a validated configuration does not fit a u32");
        let tickets_per_match = binomial(
            config.range - config.match_size,
            config.ticket_size - config.match_size,
        )
        .unwrap_or(0) as usize;

        let tickets = all_combinations(config.range, config.ticket_size);
        // the match universe only lives long enough to assign ids
        let match_ids: HashMap<NumberSet, u32> = all_combinations(config.range, config.match_size)
            .into_iter()
            .enumerate()
            .map(|(match_id, m)| (m, match_id as u32))
            .collect();

        let mut match_nodes: Vec<MatchNode> = (0..match_ids.len())
            .map(|_| MatchNode {
                ticket_indexes: Vec::with_capacity(tickets_per_match),
            })
            .collect();
        let mut ticket_nodes: Vec<TicketNode> = Vec::with_capacity(tickets.len());

        for (ticket_id, ticket) in tickets.iter().enumerate() {
            let mut match_indexes = Vec::with_capacity(config.matches_per_ticket());
            for m in SequentialCombinationGenerator::over_members(*ticket, config.match_size) {
                let match_id = match match_ids.get(&m) {
                    Some(match_id) => *match_id,
                    None => panic!(
                        "ticket {} contains match {} which is missing from the match universe",
                        ticket, m
                    ),
                };
                match_indexes.push(match_id);
                match_nodes[match_id as usize]
                    .ticket_indexes
                    .push(ticket_id as u32);
            }

            ticket_nodes.push(TicketNode { match_indexes });
            observer.on_nodes_built(ticket_id + 1, tickets.len());
        }

        Ok(Self {
            match_size: config.match_size,
            tickets,
            ticket_nodes,
            match_nodes,
            initial_coverage,
        })
    }

    pub fn match_size(&self) -> usize {
        self.match_size
    }

    pub fn tickets(&self) -> &[NumberSet] {
        &self.tickets
    }

    pub fn ticket(&self, ticket_index: usize) -> NumberSet {
        self.tickets[ticket_index]
    }

    pub fn ticket_count(&self) -> usize {
        self.tickets.len()
    }

    pub fn match_count(&self) -> usize {
        self.match_nodes.len()
    }

    pub fn ticket_nodes(&self) -> &[TicketNode] {
        &self.ticket_nodes
    }

    pub fn match_nodes(&self) -> &[MatchNode] {
        &self.match_nodes
    }

    pub fn initial_coverage(&self) -> u32 {
        self.initial_coverage
    }

    /// whether two tickets contain a common match
    #[inline(always)]
    pub fn shares_match(&self, a: usize, b: usize) -> bool {
        self.tickets[a].overlap(&self.tickets[b]) >= self.match_size
    }
}
