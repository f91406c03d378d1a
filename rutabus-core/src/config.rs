use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_SEARCH_RADIUS, Error, Meters, TRANSFER_PENALTY, WALK_PENALTY};

/// Tunables for graph building and journey search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Multiplier baked into walk arc weights at build time
    pub walk_penalty: f64,
    /// Cost added at every change of mode or bus route
    pub transfer_penalty: f64,
    /// Maximum snapping distance for request coordinates
    pub search_radius_m: Meters,
    /// Number of raw-weight candidate paths ranked by the cost model
    pub max_candidates: usize,
    /// Route changes allowed by the transfer-limited search
    pub max_transfers: usize,
    /// Results returned by the transfer-limited search
    pub max_paths: usize,
    /// Walking radius around origin and destination when looking for
    /// boarding and alighting stops of a direct route
    pub max_access_walk_m: Meters,
    /// Heap pops allowed per search before it gives up
    pub max_search_steps: usize,
    /// Wall-clock limit per search
    pub search_timeout_ms: Option<u64>,
    /// Try a single-vehicle itinerary before the general search
    pub prefer_direct: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            walk_penalty: WALK_PENALTY,
            transfer_penalty: TRANSFER_PENALTY,
            search_radius_m: DEFAULT_SEARCH_RADIUS,
            max_candidates: 8,
            max_transfers: 2,
            max_paths: 2,
            max_access_walk_m: 600.0,
            max_search_steps: 200_000,
            search_timeout_ms: Some(2_000),
            prefer_direct: true,
        }
    }
}

impl PlannerConfig {
    /// Checks that penalties and limits are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] naming the first offending field.
    pub fn validate(&self) -> Result<(), Error> {
        let non_negative = [
            ("walk_penalty", self.walk_penalty),
            ("transfer_penalty", self.transfer_penalty),
            ("search_radius_m", self.search_radius_m),
            ("max_access_walk_m", self.max_access_walk_m),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidData(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        if self.walk_penalty == 0.0 {
            return Err(Error::InvalidData("walk_penalty must be positive".into()));
        }
        if self.max_candidates == 0 {
            return Err(Error::InvalidData("max_candidates must be at least 1".into()));
        }
        if self.max_search_steps == 0 {
            return Err(Error::InvalidData(
                "max_search_steps must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_steps: self.max_search_steps,
            timeout: self.search_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Step and time bounds applied to each individual search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_steps: usize,
    pub timeout: Option<Duration>,
}

impl SearchLimits {
    pub fn unbounded() -> Self {
        Self {
            max_steps: usize::MAX,
            timeout: None,
        }
    }

    /// Starts the clock for one search.
    pub fn budget(&self) -> SearchBudget {
        SearchBudget {
            steps_left: self.max_steps,
            deadline: self.timeout.map(|t| Instant::now() + t),
        }
    }
}

/// Marker returned when a search ran out of steps or time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchExhausted;

/// Running budget of a single search
#[derive(Debug, Clone)]
pub struct SearchBudget {
    steps_left: usize,
    deadline: Option<Instant>,
}

impl SearchBudget {
    /// Consumes one step.
    ///
    /// The clock is only read every 256 steps.
    pub fn tick(&mut self) -> Result<(), SearchExhausted> {
        if self.steps_left == 0 {
            return Err(SearchExhausted);
        }
        self.steps_left -= 1;
        if self.steps_left % 256 == 0
            && let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            self.steps_left = 0;
            return Err(SearchExhausted);
        }
        Ok(())
    }

    pub fn is_exhausted(&self) -> bool {
        self.steps_left == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_candidates, 8);
        assert_eq!(config.search_radius_m, DEFAULT_SEARCH_RADIUS);
    }

    #[test]
    fn rejects_negative_penalty() {
        let config = PlannerConfig {
            transfer_penalty: -1.0,
            ..PlannerConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn rejects_zero_candidates() {
        let config = PlannerConfig {
            max_candidates: 0,
            ..PlannerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{"transfer_penalty": 120.0, "prefer_direct": false}"#)
                .unwrap();
        assert_eq!(config.transfer_penalty, 120.0);
        assert!(!config.prefer_direct);
        assert_eq!(config.walk_penalty, WALK_PENALTY);
    }

    #[test]
    fn budget_runs_out_after_max_steps() {
        let limits = SearchLimits {
            max_steps: 3,
            timeout: None,
        };
        let mut budget = limits.budget();
        assert!(budget.tick().is_ok());
        assert!(budget.tick().is_ok());
        assert!(budget.tick().is_ok());
        assert_eq!(budget.tick(), Err(SearchExhausted));
        assert!(budget.is_exhausted());
    }

    #[test]
    fn elapsed_deadline_stops_the_budget() {
        let limits = SearchLimits {
            max_steps: usize::MAX,
            timeout: Some(Duration::ZERO),
        };
        let mut budget = limits.budget();

        // The clock is consulted once every 256 steps
        let ticks = (0..1_000).take_while(|_| budget.tick().is_ok()).count();
        assert!(ticks < 256, "{ticks}");
        assert!(budget.is_exhausted());
        assert_eq!(budget.tick(), Err(SearchExhausted));
    }

    #[test]
    fn deadline_far_away_does_not_interrupt() {
        let limits = SearchLimits {
            max_steps: usize::MAX,
            timeout: Some(Duration::from_secs(3_600)),
        };
        let mut budget = limits.budget();
        assert!((0..1_000).all(|_| budget.tick().is_ok()));
        assert!(!budget.is_exhausted());
    }
}
