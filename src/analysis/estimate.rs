//! Balance point and UA estimation with outlier rejection
//!
//! The estimate alternates between a local balance point search and
//! removing the billing period whose UA sits furthest from the mean, for as
//! long as the normalised spread of UA values is above tolerance and each
//! removal still buys a meaningful reduction in spread.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use validator::Validate;

use super::refine::{validate_sensitivity, DEFAULT_MAX_SEARCH_STEPS};
use super::report::{EstimationReport, Termination};
use super::stats::{largest_deviation_index, UaStats};
use crate::domain::Home;
use crate::error::{HeatLossError, Result};

/// Tuning for [`Home::calculate_balance_point_and_ua`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EstimatorSettings {
    /// Step (°F) for the first balance point search
    #[validate(range(exclusive_min = 0.0))]
    pub initial_sensitivity: f64,
    /// Acceptable population stdev of UA as a fraction of mean UA
    #[validate(range(min = 0.0))]
    pub stdev_pct_max: f64,
    /// Smallest spread reduction that justifies excluding a period
    #[validate(range(min = 0.0))]
    pub max_stdev_pct_diff: f64,
    /// Step (°F) for searches after each exclusion
    #[validate(range(exclusive_min = 0.0))]
    pub next_sensitivity: f64,
    /// Trial steps allowed per search before giving up
    #[validate(range(min = 1))]
    pub max_search_steps: usize,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            initial_sensitivity: 2.0,
            stdev_pct_max: 0.10,
            max_stdev_pct_diff: 0.01,
            next_sensitivity: 0.5,
            max_search_steps: DEFAULT_MAX_SEARCH_STEPS,
        }
    }
}

impl Home {
    /// Estimate the balance point and UA, excluding statistical outliers.
    ///
    /// Periods excluded here stay excluded until the billing history is
    /// reinitialised or they are explicitly restored. A search that reaches
    /// the thermostat set point simply stops there, so a home already at its
    /// set point can be estimated again.
    ///
    /// On error the home keeps every exclusion and balance point move made
    /// before the failing step. In particular, [`HeatLossError::InsufficientPeriods`]
    /// is returned when the next exclusion would leave a single period, after
    /// any earlier rounds have already been applied.
    pub fn calculate_balance_point_and_ua(
        &mut self,
        settings: &EstimatorSettings,
    ) -> Result<EstimationReport> {
        settings.validate()?;

        self.refresh_stats()?;
        let mut stats = self
            .search_balance_point(settings.initial_sensitivity, settings.max_search_steps)?
            .stats;

        let mut rounds = 0;
        let termination = loop {
            if stats.stdev_pct <= settings.stdev_pct_max {
                break Termination::WithinTolerance;
            }

            let uas = self.uas();
            let outlier = largest_deviation_index(&uas, stats.avg_ua)
                .ok_or(HeatLossError::InsufficientPeriods { retained: 0 })?;
            let remaining: Vec<f64> = uas
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != outlier)
                .map(|(_, ua)| *ua)
                .collect();
            let without_outlier = UaStats::from_uas(&remaining)?;

            let outlier_id = self.billing_periods()[outlier].id();
            debug!(
                period = outlier_id,
                ua = uas[outlier],
                stdev_pct = stats.stdev_pct,
                stdev_pct_without = without_outlier.stdev_pct,
                "evaluated outlier exclusion"
            );

            if stats.stdev_pct - without_outlier.stdev_pct < settings.max_stdev_pct_diff {
                warn!(
                    period = outlier_id,
                    stdev_pct = stats.stdev_pct,
                    stdev_pct_max = settings.stdev_pct_max,
                    "UA spread above tolerance; excluding the largest outlier barely reduces it"
                );
                break Termination::InsufficientImprovement;
            }

            let period = self.take_period(outlier);
            self.push_excluded(period);
            self.set_stats(without_outlier);
            rounds += 1;

            stats = self
                .search_balance_point(settings.next_sensitivity, settings.max_search_steps)?
                .stats;
        };

        info!(
            balance_point = self.balance_point(),
            avg_ua = stats.avg_ua,
            stdev_pct = stats.stdev_pct,
            retained = self.billing_periods().len(),
            excluded = self.excluded_periods().len(),
            ?termination,
            "estimated balance point and UA"
        );

        Ok(EstimationReport::from_home(self, stats, termination, rounds))
    }

    /// Estimate after removing caller-selected periods, with no statistical
    /// test. Intended for a review cycle where someone inspects the UA of
    /// each period, deselects some and recomputes.
    ///
    /// Nothing is removed when the selection is rejected. Once the removal
    /// is applied it stays applied even if the following search fails.
    pub fn calculate_balance_point_and_ua_customizable(
        &mut self,
        ids_to_remove: &[usize],
        sensitivity: f64,
    ) -> Result<EstimationReport> {
        if let Some(unknown) = ids_to_remove
            .iter()
            .find(|id| !self.billing_periods().iter().any(|p| p.id() == **id))
        {
            return Err(HeatLossError::InvalidInput(format!(
                "billing period {unknown} is not among the retained periods"
            )));
        }

        let kept_uas: Vec<f64> = self
            .billing_periods()
            .iter()
            .filter(|p| !ids_to_remove.contains(&p.id()))
            .map(|p| p.ua())
            .collect();
        let stats = UaStats::from_uas(&kept_uas)?;
        validate_sensitivity(sensitivity)?;

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(self.periods_mut())
            .into_iter()
            .partition(|p| ids_to_remove.contains(&p.id()));
        *self.periods_mut() = kept;
        self.excluded_mut().extend(removed);
        self.set_stats(stats);

        let stats = self
            .search_balance_point(sensitivity, DEFAULT_MAX_SEARCH_STEPS)?
            .stats;

        info!(
            balance_point = self.balance_point(),
            avg_ua = stats.avg_ua,
            stdev_pct = stats.stdev_pct,
            removed = ids_to_remove.len(),
            "estimated balance point and UA from manual selection"
        );

        Ok(EstimationReport::from_home(
            self,
            stats,
            Termination::ManualSelection,
            0,
        ))
    }

    /// Return excluded periods to the analysis, synchronised with the current
    /// balance point. Retained periods stay ordered by id.
    pub fn restore_periods(&mut self, ids: &[usize]) -> Result<()> {
        if let Some(unknown) = ids
            .iter()
            .find(|id| !self.excluded_periods().iter().any(|p| p.id() == **id))
        {
            return Err(HeatLossError::InvalidInput(format!(
                "billing period {unknown} has not been excluded"
            )));
        }

        let balance_point = self.balance_point();
        let evaluated = self
            .excluded_periods()
            .iter()
            .filter(|p| ids.contains(&p.id()))
            .map(|p| p.evaluate_at(balance_point))
            .collect::<Result<Vec<_>>>()?;

        let (mut restored, still_excluded): (Vec<_>, Vec<_>) = std::mem::take(self.excluded_mut())
            .into_iter()
            .partition(|p| ids.contains(&p.id()));
        *self.excluded_mut() = still_excluded;
        for (period, at) in restored.iter_mut().zip(evaluated) {
            period.apply(at);
        }

        let periods = self.periods_mut();
        periods.extend(restored);
        periods.sort_by_key(|p| p.id());

        debug!(restored = ids.len(), balance_point, "restored billing periods");
        self.refresh_stats()?;
        Ok(())
    }
}
