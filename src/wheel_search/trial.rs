use crate::coverage_engine::CoverageEngine;
use crate::progress::ProgressObserver;
use rand::Rng;

/// how a single greedy trial ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrialOutcome {
    /// every ticket is covered by the selected ticket ids, in selection order
    Complete(Vec<usize>),
    /// the wheel grew past the best known size
    Abandoned { selections: usize },
}

/// build one wheel greedily: a random first ticket, then repeatedly a ticket that newly covers
/// the most uncovered tickets, ties broken uniformly at random.
///
/// the engine must be fresh. with `allow_overlap` unset, a ticket sharing a match with a
/// ticket already in the wheel is never selected.
pub fn run_trial<E, R>(
    engine: &mut E,
    rng: &mut R,
    allow_overlap: bool,
    best_known_size: Option<usize>,
    observer: &mut dyn ProgressObserver,
) -> TrialOutcome
where
    E: CoverageEngine,
    R: Rng,
{
    let ticket_count = engine.ticket_count();
    if ticket_count == 0 {
        return TrialOutcome::Complete(Vec::new());
    }

    let mut wheel: Vec<usize> = Vec::new();
    let mut candidates: Vec<usize> = Vec::new();

    // nothing distinguishes one ticket from another before the first selection
    let mut selection = rng.random_range(0..ticket_count);
    loop {
        wheel.push(selection);
        if let Some(best) = best_known_size {
            if wheel.len() > best {
                return TrialOutcome::Abandoned {
                    selections: wheel.len(),
                };
            }
        }

        engine.charge_selection(selection);
        observer.on_tickets_covered(engine.covered_count(), ticket_count);

        let best_gain = collect_best_candidates(engine, allow_overlap, &mut candidates);
        if best_gain == 0 {
            return TrialOutcome::Complete(wheel);
        }
        selection = candidates[rng.random_range(0..candidates.len())];
        debug_assert!(
            allow_overlap
                || !wheel
                    .iter()
                    .any(|&selected| engine.shares_match(selected, selection)),
            "ticket {} shares a match with the wheel",
            selection
        );
    }
}

/// tickets newly covered by selecting this ticket
#[inline(always)]
fn gain<E: CoverageEngine>(engine: &E, ticket_index: usize) -> u32 {
    engine.remaining_coverage(ticket_index) + u32::from(!engine.is_covered(ticket_index))
}

/// gather the eligible tickets of maximum gain in a single scan and return that gain.
/// a gain of 0 leaves no candidates.
///
/// a ticket is covered iff it shares a match with some wheel ticket, so without overlap
/// only uncovered tickets are eligible.
fn collect_best_candidates<E: CoverageEngine>(
    engine: &E,
    allow_overlap: bool,
    candidates: &mut Vec<usize>,
) -> u32 {
    candidates.clear();
    let mut best_gain = 0;
    for ticket in 0..engine.ticket_count() {
        if !allow_overlap && engine.is_covered(ticket) {
            continue;
        }

        let ticket_gain = gain(engine, ticket);
        if ticket_gain == 0 || ticket_gain < best_gain {
            continue;
        }
        if ticket_gain > best_gain {
            best_gain = ticket_gain;
            candidates.clear();
        }
        candidates.push(ticket);
    }
    best_gain
}
