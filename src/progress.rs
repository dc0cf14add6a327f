use std::io::{self, Write};
use std::time::SystemTime;

/// print a dot each time this many graph nodes have been built
const NODES_PER_DOT: usize = 1000;

/// print a dot each time this many more tickets are covered
const TICKETS_PER_DOT: usize = 100;

/// what a finished trial looks like from the outside
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrialReport {
    /// 0-based trial number
    pub trial_number: usize,
    pub trial_count: usize,
    /// size of the completed wheel, none if the trial was abandoned
    pub wheel_size: Option<usize>,
    /// tickets selected before the trial ended
    pub selections: usize,
    /// smallest wheel known after this trial
    pub best_size: Option<usize>,
}

/// hooks the search calls while it runs. every hook defaults to doing nothing so an observer
/// only implements what it wants to report.
pub trait ProgressObserver {
    /// a ticket node has been linked into the problem graph
    fn on_nodes_built(&mut self, _built: usize, _total: usize) {}

    /// a selection has been charged and `covered` tickets are now covered
    fn on_tickets_covered(&mut self, _covered: usize, _total: usize) {}

    fn on_trial_finished(&mut self, _report: &TrialReport) {}
}

/// discards all progress
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// prints terse progress to stdout
pub struct ConsoleProgress {
    start_time: SystemTime,
    /// covered count at the last coverage update, resets when a new trial starts
    last_covered: usize,
    last_percentage: usize,
}

impl ConsoleProgress {
    pub fn new(start_time: SystemTime) -> Self {
        Self {
            start_time,
            last_covered: 0,
            last_percentage: 0,
        }
    }

    fn elapsed_secs(&self) -> f64 {
        match SystemTime::now().duration_since(self.start_time) {
            Ok(time) => time.as_secs_f64(),
            // statistics aren't required to be accurate
            Err(_) => 0.0,
        }
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_nodes_built(&mut self, built: usize, total: usize) {
        if built == 1 {
            print!("building problem graph");
        }
        if built % NODES_PER_DOT == 0 {
            print!(".");
            io::stdout().flush().unwrap();
        }
        if built == total {
            println!("done. ({} ticket nodes)", total);
        }
    }

    fn on_tickets_covered(&mut self, covered: usize, total: usize) {
        // a fresh trial starts over from a single selection
        if covered < self.last_covered {
            println!();
            self.last_covered = 0;
            self.last_percentage = 0;
        }

        let dots = covered / TICKETS_PER_DOT - self.last_covered / TICKETS_PER_DOT;
        for _ in 0..dots {
            print!(".");
        }

        let percentage = if total != 0 { 100 * covered / total } else { 100 };
        if percentage > self.last_percentage {
            print!("{}%", percentage);
            self.last_percentage = percentage;
        }

        io::stdout().flush().unwrap();
        self.last_covered = covered;
    }

    fn on_trial_finished(&mut self, report: &TrialReport) {
        println!();
        match report.wheel_size {
            Some(size) => println!(
                "trial {} of {}: wheel of {} tickets",
                report.trial_number + 1,
                report.trial_count,
                size
            ),
            None => println!(
                "trial {} of {}: abandoned after {} selections (a smaller wheel is known)",
                report.trial_number + 1,
                report.trial_count,
                report.selections
            ),
        }
        match report.best_size {
            Some(best) => println!(
                "best wheel so far has {} tickets | ran for {:.1} seconds",
                best,
                self.elapsed_secs()
            ),
            None => println!("no wheel found yet | ran for {:.1} seconds", self.elapsed_secs()),
        }

        self.last_covered = 0;
        self.last_percentage = 0;
    }
}
