use crate::coverage_engine::{ChargeMarks, CoverageEngine, TicketCoverage};
use crate::problem_graph::ProblemGraph;

/// a unit of work on the traversal stack.
///
/// level one is the neighbourhood of the selected ticket: its matches and the tickets they
/// cover. level two is the neighbourhood of a newly covered ticket, whose matches only need
/// charging and never lead any further.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Frame {
    Selected { index: u32 },
    Ticket { index: u32, level_two: bool },
    Match { index: u32, level_two: bool },
}

#[derive(Copy, Clone, Debug)]
struct StackEntry {
    frame: Frame,
    /// set on the first visit, the second visit pops the entry
    visited: bool,
}

impl StackEntry {
    fn new(frame: Frame) -> Self {
        Self {
            frame,
            visited: false,
        }
    }
}

/// keeps remaining coverage exact by walking only the two-match neighbourhood of each
/// selection instead of rescanning every pair of tickets
pub struct IncrementalEngine<'g> {
    graph: &'g ProblemGraph,
    states: Vec<TicketCoverage>,
    covered_count: usize,
    stack: Vec<StackEntry>,
    /// tickets already charged for the selected ticket becoming covered
    selection_marks: ChargeMarks,
    /// tickets already charged for the ticket currently being covered
    subtree_marks: ChargeMarks,
}

impl<'g> IncrementalEngine<'g> {
    /// a fresh overlay: nothing covered, every ticket at the initial potential
    pub fn new(graph: &'g ProblemGraph) -> Self {
        let initial = TicketCoverage {
            is_covered: false,
            remaining_coverage: graph.initial_coverage(),
        };
        Self {
            graph,
            states: vec![initial; graph.ticket_count()],
            covered_count: 0,
            stack: Vec::new(),
            selection_marks: ChargeMarks::new(graph.ticket_count()),
            subtree_marks: ChargeMarks::new(graph.ticket_count()),
        }
    }

    pub fn states(&self) -> &[TicketCoverage] {
        &self.states
    }

    /// one fewer uncovered neighbour
    #[inline(always)]
    fn charge(&mut self, ticket_index: usize) {
        let state = &mut self.states[ticket_index];
        state.remaining_coverage = state.remaining_coverage.saturating_sub(1);
    }

    fn cover(&mut self, ticket_index: usize) {
        self.states[ticket_index].is_covered = true;
        self.covered_count += 1;
    }

    fn push_matches(&mut self, ticket_index: usize, level_two: bool) {
        let graph = self.graph;
        for &match_index in graph.ticket_nodes()[ticket_index].match_indexes.iter() {
            self.stack.push(StackEntry::new(Frame::Match {
                index: match_index,
                level_two,
            }));
        }
    }
}

impl CoverageEngine for IncrementalEngine<'_> {
    fn ticket_count(&self) -> usize {
        self.states.len()
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
        self.graph.shares_match(a, b)
    }

    fn charge_selection(&mut self, start_ticket: usize) {
        let graph = self.graph;

        // a selection that was already covered has been charged for when it got covered
        let start_newly_covered = !self.states[start_ticket].is_covered;
        if start_newly_covered {
            self.cover(start_ticket);
        }
        self.selection_marks.clear();
        self.selection_marks.mark(start_ticket);

        self.stack.push(StackEntry::new(Frame::Selected {
            index: start_ticket as u32,
        }));

        while let Some(entry) = self.stack.last_mut() {
            if entry.visited {
                self.stack.pop();
                continue;
            }
            entry.visited = true;
            let frame = entry.frame;

            match frame {
                Frame::Selected { index } => {
                    self.push_matches(index as usize, false);
                }
                Frame::Match {
                    index,
                    level_two: false,
                } => {
                    for &ticket in graph.match_nodes()[index as usize].ticket_indexes.iter() {
                        let ticket = ticket as usize;
                        if start_newly_covered && self.selection_marks.mark(ticket) {
                            self.charge(ticket);
                        }
                        if !self.states[ticket].is_covered {
                            self.stack.push(StackEntry::new(Frame::Ticket {
                                index: ticket as u32,
                                level_two: false,
                            }));
                        }
                    }
                }
                Frame::Ticket {
                    index,
                    level_two: false,
                } => {
                    let index = index as usize;
                    // reached again through another match of the selection
                    if self.states[index].is_covered {
                        self.stack.pop();
                        continue;
                    }
                    self.cover(index);
                    self.subtree_marks.clear();
                    self.subtree_marks.mark(index);
                    self.push_matches(index, true);
                }
                Frame::Match {
                    index,
                    level_two: true,
                } => {
                    for &ticket in graph.match_nodes()[index as usize].ticket_indexes.iter() {
                        let ticket = ticket as usize;
                        if self.subtree_marks.mark(ticket) {
                            self.charge(ticket);
                        }
                    }
                    self.stack.pop();
                }
                Frame::Ticket {
                    index,
                    level_two: true,
                } => panic!(
                    "reached level two ticket frame for ticket {} while charging selection {}",
                    index, start_ticket
                ),
            }
        }

        self.states[start_ticket].remaining_coverage = 0;
    }
}
