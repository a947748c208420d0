//! Local balance point search
//!
//! Steps the balance point up or down by a fixed sensitivity, keeping each
//! step that strictly lowers the UA spread. The first direction that
//! improves is followed to exhaustion and the opposite direction is never
//! tried in the same call.

use serde::Serialize;
use tracing::debug;

use super::stats::UaStats;
use crate::domain::Home;
use crate::error::{HeatLossError, Result};

pub const DEFAULT_MAX_SEARCH_STEPS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Direction::Up => 1.0,
            Direction::Down => -1.0,
        }
    }
}

/// An accepted balance point move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchStep {
    pub balance_point: f64,
    pub avg_ua: f64,
    pub stdev_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStop {
    /// Neither direction improves the spread any further
    Exhausted,
    /// The next step would have raised the balance point above the set point
    SetPointCeiling,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefineOutcome {
    pub steps: Vec<SearchStep>,
    pub stop: SearchStop,
    /// Statistics at the balance point the search settled on
    pub stats: UaStats,
}

impl Home {
    /// Try balance points `sensitivity` degrees above and below the current
    /// one, moving to whichever lowers the spread of the retained periods'
    /// UA values.
    ///
    /// Fails with [`HeatLossError::InfeasibleBalancePoint`] when the very
    /// first step would already exceed the thermostat set point.
    pub fn refine_balance_point(&mut self, sensitivity: f64) -> Result<RefineOutcome> {
        self.ensure_first_step_feasible(sensitivity)?;
        self.search_balance_point(sensitivity, DEFAULT_MAX_SEARCH_STEPS)
    }

    fn ensure_first_step_feasible(&self, sensitivity: f64) -> Result<()> {
        validate_sensitivity(sensitivity)?;
        let first_step = self.balance_point() + Direction::Up.sign() * sensitivity;
        if first_step > self.thermostat_set_point() {
            return Err(HeatLossError::InfeasibleBalancePoint {
                balance_point: self.balance_point(),
                sensitivity,
                set_point: self.thermostat_set_point(),
            });
        }
        Ok(())
    }

    pub(crate) fn search_balance_point(
        &mut self,
        sensitivity: f64,
        max_steps: usize,
    ) -> Result<RefineOutcome> {
        validate_sensitivity(sensitivity)?;

        let mut current = match self.stats() {
            Some(stats) => stats,
            None => self.refresh_stats()?,
        };
        let mut directions = vec![Direction::Up, Direction::Down];
        let mut steps = Vec::new();
        let mut trials = 0;

        while let Some(&direction) = directions.first() {
            if trials == max_steps {
                return Err(HeatLossError::SearchLimitExceeded { max_steps });
            }
            trials += 1;

            let trial_balance_point = self.balance_point() + direction.sign() * sensitivity;
            if trial_balance_point > self.thermostat_set_point() {
                debug!(
                    balance_point = self.balance_point(),
                    set_point = self.thermostat_set_point(),
                    "balance point search stopped at thermostat set point"
                );
                return Ok(RefineOutcome {
                    steps,
                    stop: SearchStop::SetPointCeiling,
                    stats: current,
                });
            }

            let trial = self.trial_stats(trial_balance_point)?;
            if trial.stdev_pct < current.stdev_pct {
                current = self.recompute_periods_at(trial_balance_point)?;
                debug!(
                    balance_point = trial_balance_point,
                    avg_ua = current.avg_ua,
                    stdev_pct = current.stdev_pct,
                    "accepted balance point step"
                );
                steps.push(SearchStep {
                    balance_point: trial_balance_point,
                    avg_ua: current.avg_ua,
                    stdev_pct: current.stdev_pct,
                });
                // Once a direction improves, the opposite one is abandoned.
                if directions.len() == 2 {
                    directions.pop();
                }
            } else {
                directions.remove(0);
            }
        }

        Ok(RefineOutcome {
            steps,
            stop: SearchStop::Exhausted,
            stats: current,
        })
    }
}

pub(super) fn validate_sensitivity(sensitivity: f64) -> Result<()> {
    if !(sensitivity.is_finite() && sensitivity > 0.0) {
        return Err(HeatLossError::InvalidInput(format!(
            "balance point sensitivity must be positive, got {sensitivity}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FuelType, HomeParameters};

    fn two_period_home() -> Home {
        let mut home = Home::new(HomeParameters::new(FuelType::Gas, 0.95)).unwrap();
        home.initialize_billing_periods(
            &[vec![40.0, 42.0, 44.0, 46.0], vec![50.0, 52.0, 54.0, 56.0]],
            &[2.0, 1.0],
            0.0,
        )
        .unwrap();
        home
    }

    #[test]
    fn test_climbs_until_spread_worsens() {
        let mut home = two_period_home();
        let outcome = home.refine_balance_point(2.0).unwrap();

        let visited: Vec<f64> = outcome.steps.iter().map(|s| s.balance_point).collect();
        assert_eq!(visited, vec![62.0, 64.0]);
        assert_eq!(outcome.stop, SearchStop::Exhausted);
        assert_eq!(home.balance_point(), 64.0);
        assert_eq!(home.stats(), Some(outcome.stats));
    }

    #[test]
    fn test_accepted_steps_never_increase_spread() {
        let mut home = two_period_home();
        let start = home.current_stats().unwrap().stdev_pct;
        let outcome = home.refine_balance_point(0.5).unwrap();

        let mut previous = start;
        for step in &outcome.steps {
            assert!(step.stdev_pct < previous);
            previous = step.stdev_pct;
        }
    }

    #[test]
    fn test_first_step_above_set_point_is_infeasible() {
        let mut home = Home::new(
            HomeParameters::new(FuelType::Gas, 0.95)
                .with_balance_point(67.0)
                .with_thermostat_set_point(68.0),
        )
        .unwrap();
        home.initialize_billing_periods(&[vec![40.0], vec![50.0]], &[2.0, 1.0], 0.0)
            .unwrap();

        let err = home.refine_balance_point(2.0).unwrap_err();
        assert_eq!(
            err,
            HeatLossError::InfeasibleBalancePoint {
                balance_point: 67.0,
                sensitivity: 2.0,
                set_point: 68.0
            }
        );
        assert_eq!(home.balance_point(), 67.0);
    }

    #[test]
    fn test_stops_at_set_point_ceiling() {
        // Spread keeps shrinking as the balance point rises
        let mut home = Home::new(HomeParameters::new(FuelType::Gas, 0.95)).unwrap();
        home.initialize_billing_periods(
            &[vec![30.0, 32.0, 34.0], vec![40.0, 42.0, 44.0]],
            &[3.0, 9.0],
            0.0,
        )
        .unwrap();

        let outcome = home.refine_balance_point(2.0).unwrap();
        assert_eq!(outcome.stop, SearchStop::SetPointCeiling);
        assert_eq!(home.balance_point(), 68.0);
    }

    #[test]
    fn test_search_limit() {
        let mut home = two_period_home();
        home.refresh_stats().unwrap();
        let err = home.search_balance_point(0.5, 1).unwrap_err();
        assert_eq!(err, HeatLossError::SearchLimitExceeded { max_steps: 1 });
    }

    #[test]
    fn test_rejects_non_positive_sensitivity() {
        let mut home = two_period_home();
        assert!(matches!(
            home.refine_balance_point(0.0),
            Err(HeatLossError::InvalidInput(_))
        ));
        assert!(matches!(
            home.refine_balance_point(-2.0),
            Err(HeatLossError::InvalidInput(_))
        ));
    }
}
