use serde::Serialize;

use super::heat_load::{DesignConditions, HeatLoadSummary};
use super::stats::UaStats;
use crate::domain::{BillingPeriod, FuelType, Home};

/// Why the outlier loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// UA spread is within `stdev_pct_max`
    WithinTolerance,
    /// Spread is still above tolerance, but removing the largest outlier
    /// would not have reduced it by `max_stdev_pct_diff`
    InsufficientImprovement,
    /// Periods were removed by the caller
    ManualSelection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub id: usize,
    pub days: usize,
    pub usage: f64,
    pub avg_heating_usage: f64,
    pub total_hdd: f64,
    pub ua: f64,
}

impl From<&BillingPeriod> for PeriodSummary {
    fn from(period: &BillingPeriod) -> Self {
        Self {
            id: period.id(),
            days: period.days(),
            usage: period.usage(),
            avg_heating_usage: period.avg_heating_usage(),
            total_hdd: period.total_hdd(),
            ua: period.ua(),
        }
    }
}

/// Outcome of an estimation run.
///
/// Excluded periods carry the HDD and UA they had when they were removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimationReport {
    pub fuel_type: FuelType,
    pub heat_sys_efficiency: f64,
    pub thermostat_set_point: f64,
    pub balance_point: f64,
    pub avg_ua: f64,
    pub stdev_pct: f64,
    pub termination: Termination,
    pub exclusion_rounds: usize,
    pub retained: Vec<PeriodSummary>,
    pub excluded: Vec<PeriodSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heat_load: Option<HeatLoadSummary>,
}

impl EstimationReport {
    pub fn from_home(
        home: &Home,
        stats: UaStats,
        termination: Termination,
        exclusion_rounds: usize,
    ) -> Self {
        Self {
            fuel_type: home.fuel_type(),
            heat_sys_efficiency: home.heat_sys_efficiency(),
            thermostat_set_point: home.thermostat_set_point(),
            balance_point: home.balance_point(),
            avg_ua: stats.avg_ua,
            stdev_pct: stats.stdev_pct,
            termination,
            exclusion_rounds,
            retained: home.billing_periods().iter().map(PeriodSummary::from).collect(),
            excluded: home.excluded_periods().iter().map(PeriodSummary::from).collect(),
            heat_load: None,
        }
    }

    pub fn with_heat_load(mut self, design: &DesignConditions) -> Self {
        self.heat_load = Some(HeatLoadSummary::calculate(
            design,
            self.thermostat_set_point,
            self.balance_point,
            self.avg_ua,
        ));
        self
    }
}
