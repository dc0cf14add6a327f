use crate::coverage_math::binomial;
use crate::number_set::MAX_RANGE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// matches larger than this are not supported
pub const MAX_MATCH_SIZE: usize = 16;

/// exclusive bound on the number of tickets (and matches) a run may enumerate
pub const MAX_UNIVERSE_SIZE: u64 = 1 << 30;

/// how coverage potentials are kept up to date after each selection
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PotentialStrategy {
    /// depth-first charging over the ticket/match graph
    #[default]
    Incremental,
    /// recompute every potential from scratch after each selection. only sensible for small
    /// ranges - cost is quadratic in the ticket count.
    Pairwise,
}

/// everything that parameterizes a wheel generation run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelConfig {
    /// numbers are drawn from 1..=range
    pub range: usize,
    /// numbers per ticket
    pub ticket_size: usize,
    /// overlap a wheel ticket must have with a drawn ticket to cover it
    pub match_size: usize,
    /// independent greedy trials; the smallest wheel wins
    pub trial_count: usize,
    /// whether wheel tickets may share a match with each other
    pub allow_overlap: bool,
    pub strategy: PotentialStrategy,
    /// fixed seed for reproducible runs. fresh os randomness per trial if unset.
    pub seed: Option<u64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ranges larger than {max} are not supported (got {range})")]
    RangeTooLarge { range: usize, max: usize },

    #[error("ticket size {ticket_size} cannot be larger than range {range}")]
    TicketLargerThanRange { ticket_size: usize, range: usize },

    #[error(
        "range {range} with ticket size {ticket_size} would generate {count} tickets, \
         only fewer than {limit} are supported"
    )]
    TooManyTickets {
        range: usize,
        ticket_size: usize,
        count: u64,
        limit: u64,
    },

    #[error("match size {match_size} cannot be larger than ticket size {ticket_size}")]
    MatchLargerThanTicket {
        match_size: usize,
        ticket_size: usize,
    },

    #[error("match sizes larger than {max} are not supported (got {match_size})")]
    MatchTooLarge { match_size: usize, max: usize },

    #[error(
        "range {range} with match size {match_size} would generate {count} matches, \
         only fewer than {limit} are supported"
    )]
    TooManyMatches {
        range: usize,
        match_size: usize,
        count: u64,
        limit: u64,
    },
}

impl WheelConfig {
    /// a single-trial configuration that allows overlap and uses the incremental engine
    pub fn new(range: usize, ticket_size: usize, match_size: usize) -> Self {
        Self {
            range,
            ticket_size,
            match_size,
            trial_count: 1,
            allow_overlap: true,
            strategy: PotentialStrategy::Incremental,
            seed: None,
        }
    }

    /// check the parameters before anything gets allocated.
    /// checks run in order, so the first violated constraint is the one reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.range > MAX_RANGE {
            return Err(ConfigError::RangeTooLarge {
                range: self.range,
                max: MAX_RANGE,
            });
        }

        if self.ticket_size > self.range {
            return Err(ConfigError::TicketLargerThanRange {
                ticket_size: self.ticket_size,
                range: self.range,
            });
        }

        // ranges of at most 64 never overflow, but saturate rather than trust that
        let ticket_count = binomial(self.range, self.ticket_size).unwrap_or(u64::MAX);
        if ticket_count >= MAX_UNIVERSE_SIZE {
            return Err(ConfigError::TooManyTickets {
                range: self.range,
                ticket_size: self.ticket_size,
                count: ticket_count,
                limit: MAX_UNIVERSE_SIZE,
            });
        }

        if self.match_size > self.ticket_size {
            return Err(ConfigError::MatchLargerThanTicket {
                match_size: self.match_size,
                ticket_size: self.ticket_size,
            });
        }

        if self.match_size > MAX_MATCH_SIZE {
            return Err(ConfigError::MatchTooLarge {
                match_size: self.match_size,
                max: MAX_MATCH_SIZE,
            });
        }

        let match_count = binomial(self.range, self.match_size).unwrap_or(u64::MAX);
        if match_count >= MAX_UNIVERSE_SIZE {
            return Err(ConfigError::TooManyMatches {
                range: self.range,
                match_size: self.match_size,
                count: match_count,
                limit: MAX_UNIVERSE_SIZE,
            });
        }

        Ok(())
    }

    /// C(range, ticket_size). only meaningful for a validated configuration.
    pub fn ticket_count(&self) -> usize {
        binomial(self.range, self.ticket_size).unwrap_or(0) as usize
    }

    /// C(range, match_size). only meaningful for a validated configuration.
    pub fn match_count(&self) -> usize {
        binomial(self.range, self.match_size).unwrap_or(0) as usize
    }

    /// matches contained in every ticket
    pub fn matches_per_ticket(&self) -> usize {
        binomial(self.ticket_size, self.match_size).unwrap_or(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_typical_lottery() {
        // 25 numbers, 15 drawn, guarantee 14 hits
        assert_eq!(WheelConfig::new(25, 15, 14).validate(), Ok(()));
        assert_eq!(WheelConfig::new(5, 3, 2).validate(), Ok(()));
        assert_eq!(WheelConfig::new(4, 2, 2).validate(), Ok(()));
    }

    #[test]
    fn test_validate_range_too_large() {
        assert_eq!(
            WheelConfig::new(65, 3, 2).validate(),
            Err(ConfigError::RangeTooLarge { range: 65, max: 64 })
        );
    }

    #[test]
    fn test_validate_ticket_larger_than_range() {
        assert_eq!(
            WheelConfig::new(5, 6, 2).validate(),
            Err(ConfigError::TicketLargerThanRange {
                ticket_size: 6,
                range: 5
            })
        );
    }

    #[test]
    fn test_validate_too_many_tickets() {
        // 60 choose 10 is far beyond 2^30
        let error = WheelConfig::new(60, 10, 2).validate().unwrap_err();
        assert_eq!(
            error,
            ConfigError::TooManyTickets {
                range: 60,
                ticket_size: 10,
                count: 75_394_027_566,
                limit: MAX_UNIVERSE_SIZE,
            }
        );
        assert_eq!(
            error.to_string(),
            "range 60 with ticket size 10 would generate 75394027566 tickets, only fewer than 1073741824 are supported"
        );
    }

    #[test]
    fn test_validate_match_larger_than_ticket() {
        assert_eq!(
            WheelConfig::new(10, 3, 4).validate(),
            Err(ConfigError::MatchLargerThanTicket {
                match_size: 4,
                ticket_size: 3
            })
        );
    }

    #[test]
    fn test_validate_match_too_large() {
        // 20 choose 18 tickets is small, but matches of 17 are refused
        assert_eq!(
            WheelConfig::new(20, 18, 17).validate(),
            Err(ConfigError::MatchTooLarge {
                match_size: 17,
                max: MAX_MATCH_SIZE
            })
        );
    }

    #[test]
    fn test_validate_too_many_matches() {
        // few tickets of 60 out of 64, but 64 choose 16 matches
        let error = WheelConfig::new(64, 60, 16).validate().unwrap_err();
        assert!(matches!(error, ConfigError::TooManyMatches { .. }));
    }

    #[test]
    fn test_counts() {
        let config = WheelConfig::new(5, 3, 2);
        assert_eq!(config.ticket_count(), 10);
        assert_eq!(config.match_count(), 10);
        assert_eq!(config.matches_per_ticket(), 3);
    }
}
