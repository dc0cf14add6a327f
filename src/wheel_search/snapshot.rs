use crate::config::WheelConfig;
use crate::number_set::NumberSet;
use crate::wheel_search::{resolve_wheel, SearchResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// the best wheel found so far for a configuration, persisted between runs so that a later
/// run can abandon trials that cannot beat it
#[derive(Serialize, Deserialize, Eq, PartialEq, Debug, Clone)]
pub struct BestWheelSnapshot {
    config: WheelConfig,
    /// ticket ids of the best wheel, empty until some trial completes
    ticket_indexes: Vec<usize>,
    start_time: SystemTime,
    last_update_time: SystemTime,
    total_elapsed_time: Duration,
    trials_run: u64,
}

impl BestWheelSnapshot {
    pub fn new(config: WheelConfig, start_time: SystemTime) -> Self {
        Self {
            config,
            ticket_indexes: Vec::new(),
            start_time,
            last_update_time: start_time,
            total_elapsed_time: Duration::ZERO,
            trials_run: 0,
        }
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn ticket_indexes(&self) -> &[usize] {
        &self.ticket_indexes
    }

    pub fn trials_run(&self) -> u64 {
        self.trials_run
    }

    pub fn total_elapsed_time(&self) -> Duration {
        self.total_elapsed_time
    }

    pub fn start_time(&self) -> SystemTime {
        self.start_time
    }

    /// size of the stored wheel, none if nothing has been stored yet
    pub fn best_size(&self) -> Option<usize> {
        if self.ticket_indexes.is_empty() {
            None
        } else {
            Some(self.ticket_indexes.len())
        }
    }

    /// whether wheels for `config` can be compared against the stored one. trial count, seed
    /// and engine don't change what a valid wheel is.
    pub fn is_compatible_with(&self, config: &WheelConfig) -> bool {
        self.config.range == config.range
            && self.config.ticket_size == config.ticket_size
            && self.config.match_size == config.match_size
            && self.config.allow_overlap == config.allow_overlap
    }

    /// fold a finished search into the snapshot. returns whether the stored wheel improved.
    pub fn update_with_result(&mut self, result: &SearchResult) -> bool {
        let now = SystemTime::now();
        let elapsed = match now.duration_since(self.last_update_time) {
            Ok(time) => time,
            // statistics aren't required to be accurate
            Err(_) => Duration::ZERO,
        };
        self.last_update_time = now;
        self.total_elapsed_time += elapsed;
        self.trials_run += result.trials_run as u64;

        let Some(wheel) = &result.best else {
            return false;
        };
        let improves = match self.best_size() {
            Some(current) => wheel.len() < current,
            None => true,
        };
        if improves {
            self.ticket_indexes = wheel.ticket_indexes().to_vec();
        }
        improves
    }

    /// the stored wheel as numbers, found by re-enumerating the tickets
    pub fn resolve(&self) -> Result<Vec<NumberSet>, String> {
        resolve_wheel(&self.config, &self.ticket_indexes)
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let encoded = match bincode::serialize(&self) {
            Ok(encoded) => encoded,
            Err(e) => return Err(format!("could not encode best wheel snapshot: {}", e)),
        };
        match fs::write(path.as_ref(), encoded) {
            Ok(_) => Ok(()),
            Err(e) => Err(format!(
                "could not write best wheel snapshot to {}: {}",
                path.as_ref().display(),
                e
            )),
        }
    }

    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let encoded = match fs::read(path.as_ref()) {
            Ok(encoded) => encoded,
            Err(e) => {
                return Err(format!(
                    "could not read best wheel snapshot from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            }
        };
        match bincode::deserialize(&encoded) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => Err(format!(
                "could not decode best wheel snapshot from {}: {}",
                path.as_ref().display(),
                e
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::utilities::test_utilities::TestDirectory;
    use crate::wheel_search::WheelSearch;

    fn seeded_config(trial_count: usize, seed: u64) -> WheelConfig {
        WheelConfig {
            trial_count,
            seed: Some(seed),
            ..WheelConfig::new(9, 4, 2)
        }
    }

    #[test]
    fn test_snapshot_file_preserves_best_wheel() {
        let test_directory = TestDirectory::new("test_snapshot_file_preserves_best_wheel");
        let snapshot_path = test_directory.path().join("best.wheel");

        let config = seeded_config(3, 14);
        let result = WheelSearch::new(config.clone())
            .unwrap()
            .run(&mut NoProgress)
            .unwrap();
        let mut snapshot = BestWheelSnapshot::new(config.clone(), SystemTime::now());
        assert!(snapshot.update_with_result(&result));
        snapshot.write_to_file(&snapshot_path).unwrap();

        let restored = BestWheelSnapshot::read_from_file(&snapshot_path).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(restored.trials_run(), 3);

        let wheel = result.best.unwrap();
        assert_eq!(restored.best_size(), Some(wheel.len()));
        assert_eq!(restored.resolve().unwrap(), wheel.tickets());
    }

    #[test]
    fn test_snapshot_only_keeps_smaller_wheels() {
        let config = seeded_config(1, 3);
        let mut snapshot = BestWheelSnapshot::new(config.clone(), SystemTime::now());
        assert_eq!(snapshot.best_size(), None);

        let first = WheelSearch::new(config.clone())
            .unwrap()
            .run(&mut NoProgress)
            .unwrap();
        assert!(snapshot.update_with_result(&first));
        let stored = snapshot.ticket_indexes().to_vec();

        // a search seeded with the stored size can only report strictly smaller wheels
        let second = WheelSearch::new(seeded_config(4, 40))
            .unwrap()
            .with_best_known_size(snapshot.best_size())
            .run(&mut NoProgress)
            .unwrap();
        let improved = snapshot.update_with_result(&second);

        assert_eq!(improved, second.best.is_some());
        if !improved {
            assert_eq!(snapshot.ticket_indexes(), stored.as_slice());
        }
        assert_eq!(snapshot.trials_run(), 5);

        // the first wheel again is not an improvement
        assert!(!snapshot.update_with_result(&first));
        assert_eq!(snapshot.trials_run(), 6);
    }

    #[test]
    fn test_snapshot_compatibility() {
        let snapshot = BestWheelSnapshot::new(seeded_config(1, 0), SystemTime::now());
        assert!(snapshot.is_compatible_with(&seeded_config(50, 9)));
        assert!(!snapshot.is_compatible_with(&WheelConfig::new(9, 4, 3)));
        assert!(!snapshot.is_compatible_with(&WheelConfig {
            allow_overlap: false,
            ..seeded_config(1, 0)
        }));
    }

    #[test]
    fn test_read_missing_snapshot() {
        let error = BestWheelSnapshot::read_from_file("no_such_directory/best.wheel").unwrap_err();
        assert!(error.starts_with("could not read best wheel snapshot from"));
    }
}
