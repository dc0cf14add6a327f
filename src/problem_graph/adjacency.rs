use crate::number_set::NumberSet;
use crate::problem_graph::ProblemGraph;

/// ticket-to-ticket coverage relation: each ticket's neighbours are the other tickets it
/// shares at least one match with, in ascending id order
pub struct TicketAdjacency {
    neighbours: Vec<Vec<u32>>,
}

impl TicketAdjacency {
    /// compare every pair of tickets directly. quadratic, no match universe needed.
    pub fn pairwise(tickets: &[NumberSet], match_size: usize) -> Self {
        let mut neighbours: Vec<Vec<u32>> = vec![Vec::new(); tickets.len()];
        for i in 0..tickets.len() {
            for j in i + 1..tickets.len() {
                if tickets[i].overlap(&tickets[j]) >= match_size {
                    neighbours[i].push(j as u32);
                    neighbours[j].push(i as u32);
                }
            }
        }
        Self { neighbours }
    }

    /// derive the relation through the matches each ticket contains
    pub fn from_graph(graph: &ProblemGraph) -> Self {
        let neighbours = graph
            .ticket_nodes()
            .iter()
            .enumerate()
            .map(|(ticket_id, node)| {
                let mut found: Vec<u32> = node
                    .match_indexes
                    .iter()
                    .flat_map(|&match_id| {
                        graph.match_nodes()[match_id as usize]
                            .ticket_indexes
                            .iter()
                    })
                    .copied()
                    .filter(|&other| other as usize != ticket_id)
                    .collect();
                found.sort_unstable();
                found.dedup();
                found
            })
            .collect();
        Self { neighbours }
    }

    pub fn neighbours(&self, ticket_index: usize) -> &[u32] {
        &self.neighbours[ticket_index]
    }

    pub fn ticket_count(&self) -> usize {
        self.neighbours.len()
    }
}
