use crate::combination_generator::SequentialCombinationGenerator;
use crate::config::{ConfigError, PotentialStrategy, WheelConfig};
use crate::coverage_engine::incremental::IncrementalEngine;
use crate::coverage_engine::pairwise::PairwiseEngine;
use crate::number_set::NumberSet;
use crate::problem_graph::adjacency::TicketAdjacency;
use crate::problem_graph::ProblemGraph;
use crate::progress::{NoProgress, ProgressObserver, TrialReport};

use crossbeam::channel;
use crossbeam_utils::thread as crossbeam_thread;
use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub mod snapshot;
pub mod trial;

use trial::{run_trial, TrialOutcome};

/// a wheel that covers every ticket of its configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wheel {
    ticket_indexes: Vec<usize>,
    tickets: Vec<NumberSet>,
}

impl Wheel {
    fn from_indexes(graph: &ProblemGraph, ticket_indexes: Vec<usize>) -> Self {
        let tickets = ticket_indexes
            .iter()
            .map(|&ticket_index| graph.ticket(ticket_index))
            .collect();
        Self {
            ticket_indexes,
            tickets,
        }
    }

    /// ids into the ticket enumeration order, in selection order
    pub fn ticket_indexes(&self) -> &[usize] {
        &self.ticket_indexes
    }

    pub fn tickets(&self) -> &[NumberSet] {
        &self.tickets
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// smallest wheel found by this search. none if every trial was abandoned or none ran.
    pub best: Option<Wheel>,
    pub trials_run: usize,
}

/// runs independent greedy trials over one configuration and keeps the smallest wheel
pub struct WheelSearch {
    config: WheelConfig,
    /// built on first use, shared by every trial
    graph: OnceCell<ProblemGraph>,
    /// only needed by the pairwise engine
    adjacency: OnceCell<TicketAdjacency>,
    /// wheels of this size or larger are not worth finishing
    best_known_size: Option<usize>,
    /// set by some outside mechanism (generally a signal handler) to stop starting new trials
    terminator: Option<Arc<AtomicBool>>,
}

impl WheelSearch {
    pub fn new(config: WheelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            graph: OnceCell::new(),
            adjacency: OnceCell::new(),
            best_known_size: None,
            terminator: None,
        })
    }

    /// abandon trials as soon as they cannot beat a wheel found earlier (e.g. by a previous run)
    pub fn with_best_known_size(mut self, best_known_size: Option<usize>) -> Self {
        self.best_known_size = best_known_size;
        self
    }

    pub fn with_terminator(mut self, terminator: Arc<AtomicBool>) -> Self {
        self.terminator = Some(terminator);
        self
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    /// the problem graph, built on the first call
    pub fn graph(&self, observer: &mut dyn ProgressObserver) -> Result<&ProblemGraph, ConfigError> {
        self.graph
            .get_or_try_init(|| ProblemGraph::build(&self.config, observer))
    }

    fn terminated(&self) -> bool {
        match &self.terminator {
            Some(terminator) => terminator.load(Ordering::SeqCst),
            None => false,
        }
    }

    /// one rng per trial so that seeded trials don't depend on each other or on scheduling
    fn trial_rng(&self, trial_number: usize) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(trial_number as u64)),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    fn run_single_trial(
        &self,
        graph: &ProblemGraph,
        trial_number: usize,
        best_known_size: Option<usize>,
        observer: &mut dyn ProgressObserver,
    ) -> TrialOutcome {
        let mut rng = self.trial_rng(trial_number);
        match self.config.strategy {
            PotentialStrategy::Incremental => {
                let mut engine = IncrementalEngine::new(graph);
                run_trial(
                    &mut engine,
                    &mut rng,
                    self.config.allow_overlap,
                    best_known_size,
                    observer,
                )
            }
            PotentialStrategy::Pairwise => {
                let adjacency = self
                    .adjacency
                    .get_or_init(|| TicketAdjacency::pairwise(graph.tickets(), graph.match_size()));
                let mut engine =
                    PairwiseEngine::new(graph.tickets(), graph.match_size(), adjacency);
                run_trial(
                    &mut engine,
                    &mut rng,
                    self.config.allow_overlap,
                    best_known_size,
                    observer,
                )
            }
        }
    }

    /// run every trial on the calling thread
    pub fn run(&self, observer: &mut dyn ProgressObserver) -> Result<SearchResult, ConfigError> {
        let graph = self.graph(observer)?;

        let mut best: Option<Vec<usize>> = None;
        let mut best_size = self.best_known_size;
        let mut trials_run = 0;
        for trial_number in 0..self.config.trial_count {
            if self.terminated() {
                break;
            }

            let outcome = self.run_single_trial(graph, trial_number, best_size, observer);
            trials_run += 1;
            let report = record_outcome(
                trial_number,
                self.config.trial_count,
                outcome,
                &mut best,
                &mut best_size,
            );
            observer.on_trial_finished(&report);
        }

        Ok(SearchResult {
            best: best.map(|ticket_indexes| Wheel::from_indexes(graph, ticket_indexes)),
            trials_run,
        })
    }

    /// run the trials on worker threads sharing the problem graph. workers pick up trial numbers
    /// in order and abandon trials against the best size found by any worker, so the result
    /// (but not the reporting order) is what a sequential run would find up to ties.
    pub fn run_parallel(
        &self,
        thread_count: usize,
        observer: &mut dyn ProgressObserver,
    ) -> Result<SearchResult, ConfigError> {
        let graph = self.graph(observer)?;
        if self.config.strategy == PotentialStrategy::Pairwise {
            self.adjacency
                .get_or_init(|| TicketAdjacency::pairwise(graph.tickets(), graph.match_size()));
        }

        let trial_count = self.config.trial_count;
        let next_trial = AtomicUsize::new(0);
        // usize::MAX stands in for "no wheel known yet"
        let shared_best_size = AtomicUsize::new(self.best_known_size.unwrap_or(usize::MAX));
        let (sender, receiver) = channel::unbounded::<(usize, TrialOutcome)>();

        let mut best: Option<Vec<usize>> = None;
        let mut best_size = self.best_known_size;
        let mut trials_run = 0;

        crossbeam_thread::scope(|s| {
            for thread_num in 0..thread_count.max(1) {
                let sender = sender.clone();
                let next_trial = &next_trial;
                let shared_best_size = &shared_best_size;
                s.builder()
                    .name(format!("trial-worker-{}", thread_num))
                    .spawn(move |_| loop {
                        if self.terminated() {
                            break;
                        }
                        let trial_number = next_trial.fetch_add(1, Ordering::SeqCst);
                        if trial_number >= trial_count {
                            break;
                        }

                        let known_size = match shared_best_size.load(Ordering::SeqCst) {
                            usize::MAX => None,
                            size => Some(size),
                        };
                        let outcome =
                            self.run_single_trial(graph, trial_number, known_size, &mut NoProgress);
                        if let TrialOutcome::Complete(wheel) = &outcome {
                            shared_best_size.fetch_min(wheel.len(), Ordering::SeqCst);
                        }

                        // the receiving side only goes away once every worker is done
                        if sender.send((trial_number, outcome)).is_err() {
                            break;
                        }
                    })
                    .expect("failed to spawn trial worker thread");
            }
            // the receiver loop ends once every worker has dropped its sender
            drop(sender);

            for (trial_number, outcome) in receiver.iter() {
                trials_run += 1;
                let report =
                    record_outcome(trial_number, trial_count, outcome, &mut best, &mut best_size);
                observer.on_trial_finished(&report);
            }
        })
        .expect("trial worker thread panicked");

        Ok(SearchResult {
            best: best.map(|ticket_indexes| Wheel::from_indexes(graph, ticket_indexes)),
            trials_run,
        })
    }
}

/// fold a trial outcome into the running best. only a strictly smaller wheel replaces the
/// current one.
fn record_outcome(
    trial_number: usize,
    trial_count: usize,
    outcome: TrialOutcome,
    best: &mut Option<Vec<usize>>,
    best_size: &mut Option<usize>,
) -> TrialReport {
    let (wheel_size, selections) = match outcome {
        TrialOutcome::Complete(wheel) => {
            let size = wheel.len();
            let improves = match *best_size {
                Some(current) => size < current,
                None => true,
            };
            if improves {
                *best_size = Some(size);
                *best = Some(wheel);
            }
            (Some(size), size)
        }
        TrialOutcome::Abandoned { selections } => (None, selections),
    };

    TrialReport {
        trial_number,
        trial_count,
        wheel_size,
        selections,
        best_size: *best_size,
    }
}

/// translate ticket ids back into numbers by walking the ticket enumeration again,
/// without building a graph. the result keeps the order of `ticket_indexes`.
pub fn resolve_wheel(
    config: &WheelConfig,
    ticket_indexes: &[usize],
) -> Result<Vec<NumberSet>, String> {
    config.validate().map_err(|error| error.to_string())?;

    // (ticket id, position in the wheel), visited in enumeration order
    let mut wanted: Vec<(usize, usize)> = ticket_indexes
        .iter()
        .enumerate()
        .map(|(position, &ticket_index)| (ticket_index, position))
        .collect();
    wanted.sort_unstable();

    let mut resolved = vec![NumberSet::EMPTY; ticket_indexes.len()];
    let mut next = 0;
    if !wanted.is_empty() {
        let tickets = SequentialCombinationGenerator::new(config.range, config.ticket_size);
        for (ticket_index, ticket) in tickets.enumerate() {
            while next < wanted.len() && wanted[next].0 == ticket_index {
                resolved[wanted[next].1] = ticket;
                next += 1;
            }
            if next == wanted.len() {
                break;
            }
        }
    }

    if next < wanted.len() {
        return Err(format!(
            "ticket index {} is out of range for {} tickets",
            wanted[next].0,
            config.ticket_count()
        ));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// remembers every trial report
    struct ReportRecorder {
        reports: Vec<TrialReport>,
    }

    impl ProgressObserver for ReportRecorder {
        fn on_trial_finished(&mut self, report: &TrialReport) {
            self.reports.push(*report);
        }
    }

    fn seeded_config(
        range: usize,
        ticket_size: usize,
        match_size: usize,
        trial_count: usize,
        seed: u64,
    ) -> WheelConfig {
        WheelConfig {
            trial_count,
            seed: Some(seed),
            ..WheelConfig::new(range, ticket_size, match_size)
        }
    }

    #[test]
    fn test_search_five_three_two() {
        let search = WheelSearch::new(seeded_config(5, 3, 2, 3, 1)).unwrap();
        let result = search.run(&mut NoProgress).unwrap();

        assert_eq!(result.trials_run, 3);
        let wheel = result.best.unwrap();
        assert_eq!(wheel.len(), 2);
        let all_tickets: Vec<NumberSet> = SequentialCombinationGenerator::new(5, 3).collect();
        for ticket in all_tickets {
            assert!(wheel.tickets().iter().any(|selected| selected.overlap(&ticket) >= 2));
        }
    }

    #[test]
    fn test_search_match_equals_ticket() {
        let search = WheelSearch::new(seeded_config(4, 2, 2, 1, 9)).unwrap();
        let wheel = search.run(&mut NoProgress).unwrap().best.unwrap();

        let mut tickets = wheel.tickets().to_vec();
        tickets.sort_unstable();
        let mut expected: Vec<NumberSet> = SequentialCombinationGenerator::new(4, 2).collect();
        expected.sort_unstable();
        assert_eq!(tickets, expected);
    }

    #[test]
    fn test_search_best_of_n_is_monotone() {
        let search = WheelSearch::new(seeded_config(11, 5, 3, 12, 100)).unwrap();
        let mut recorder = ReportRecorder {
            reports: Vec::new(),
        };
        let result = search.run(&mut recorder).unwrap();

        assert_eq!(recorder.reports.len(), 12);
        let best_sizes: Vec<usize> = recorder
            .reports
            .iter()
            .map(|report| report.best_size.unwrap())
            .collect();
        assert!(best_sizes.windows(2).all(|pair| pair[1] <= pair[0]));

        for report in recorder.reports.iter() {
            match report.wheel_size {
                Some(size) => assert!(size >= report.best_size.unwrap()),
                // abandoned only once the wheel outgrew the best known size
                None => assert!(report.selections > report.best_size.unwrap()),
            }
        }
        assert_eq!(result.best.unwrap().len(), *best_sizes.last().unwrap());
    }

    #[test]
    fn test_seeded_search_is_reproducible() {
        let config = seeded_config(10, 4, 2, 4, 1234);
        let first = WheelSearch::new(config.clone()).unwrap().run(&mut NoProgress).unwrap();
        let second = WheelSearch::new(config).unwrap().run(&mut NoProgress).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_search_strategies_agree() {
        let config = seeded_config(9, 4, 2, 3, 55);
        let pairwise = WheelConfig {
            strategy: PotentialStrategy::Pairwise,
            ..config.clone()
        };

        let incremental_result = WheelSearch::new(config).unwrap().run(&mut NoProgress).unwrap();
        let pairwise_result = WheelSearch::new(pairwise).unwrap().run(&mut NoProgress).unwrap();
        assert_eq!(incremental_result, pairwise_result);
    }

    #[test]
    fn test_search_without_overlap() {
        let config = WheelConfig {
            allow_overlap: false,
            ..seeded_config(9, 3, 2, 2, 8)
        };
        let wheel = WheelSearch::new(config).unwrap().run(&mut NoProgress).unwrap().best.unwrap();

        let tickets = wheel.tickets();
        for (i, a) in tickets.iter().enumerate() {
            for b in tickets[i + 1..].iter() {
                assert!(a.overlap(b) < 2);
            }
        }
    }

    #[test]
    fn test_best_known_size_abandons_every_trial() {
        // a single ticket can never cover 9 4 2
        let search = WheelSearch::new(seeded_config(9, 4, 2, 5, 2))
            .unwrap()
            .with_best_known_size(Some(1));
        let result = search.run(&mut NoProgress).unwrap();

        assert_eq!(result.trials_run, 5);
        assert_eq!(result.best, None);
    }

    #[test]
    fn test_terminator_stops_before_any_trial() {
        let terminator = Arc::new(AtomicBool::new(true));
        let search = WheelSearch::new(seeded_config(7, 3, 2, 10, 0))
            .unwrap()
            .with_terminator(terminator);

        let result = search.run(&mut NoProgress).unwrap();
        assert_eq!(result.trials_run, 0);
        assert_eq!(result.best, None);

        let result = search.run_parallel(4, &mut NoProgress).unwrap();
        assert_eq!(result.trials_run, 0);
    }

    #[test]
    fn test_run_parallel() {
        let config = seeded_config(10, 5, 3, 16, 77);
        let search = WheelSearch::new(config.clone()).unwrap();
        let mut recorder = ReportRecorder {
            reports: Vec::new(),
        };
        let result = search.run_parallel(4, &mut recorder).unwrap();

        assert_eq!(result.trials_run, 16);
        let mut trial_numbers: Vec<usize> =
            recorder.reports.iter().map(|report| report.trial_number).collect();
        trial_numbers.sort_unstable();
        assert_eq!(trial_numbers, (0..16).collect::<Vec<usize>>());

        // the smallest seeded trial is never abandoned, whatever order the workers finish in
        let sequential = WheelSearch::new(config).unwrap().run(&mut NoProgress).unwrap();
        assert_eq!(result.best.unwrap().len(), sequential.best.unwrap().len());
    }

    #[test]
    fn test_graph_is_built_once() {
        struct BuildCounter {
            builds: usize,
        }
        impl ProgressObserver for BuildCounter {
            fn on_nodes_built(&mut self, built: usize, _total: usize) {
                if built == 1 {
                    self.builds += 1;
                }
            }
        }

        let search = WheelSearch::new(seeded_config(6, 3, 2, 2, 0)).unwrap();
        let mut counter = BuildCounter { builds: 0 };
        search.run(&mut counter).unwrap();
        search.run(&mut counter).unwrap();
        assert_eq!(counter.builds, 1);
    }

    #[test]
    fn test_resolve_wheel() {
        let config = WheelConfig::new(5, 3, 2);
        let resolved = resolve_wheel(&config, &[9, 0, 5]).unwrap();
        assert_eq!(
            resolved,
            vec![
                NumberSet::from_numbers(&[3, 4, 5]),
                NumberSet::from_numbers(&[1, 2, 3]),
                NumberSet::from_numbers(&[1, 4, 5]),
            ]
        );

        assert_eq!(resolve_wheel(&config, &[]), Ok(Vec::new()));
        assert_eq!(
            resolve_wheel(&config, &[2, 10]),
            Err("ticket index 10 is out of range for 10 tickets".to_string())
        );
    }

    #[test]
    fn test_resolve_wheel_matches_graph() {
        let search = WheelSearch::new(seeded_config(9, 4, 2, 2, 31)).unwrap();
        let wheel = search.run(&mut NoProgress).unwrap().best.unwrap();

        let resolved = resolve_wheel(search.config(), wheel.ticket_indexes()).unwrap();
        assert_eq!(resolved, wheel.tickets());
    }
}
