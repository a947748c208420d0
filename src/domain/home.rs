use tracing::debug;
use validator::Validate;

use super::billing_period::{BillInput, BillingPeriod, HomeContext, PeriodUa};
use super::types::{FuelType, HomeParameters};
use crate::analysis::stats::UaStats;
use crate::error::{HeatLossError, Result};

/// A building under analysis together with its billing history.
///
/// Retained billing periods always reflect the current balance point: the
/// balance point only changes through [`Home::recompute_periods_at`], which
/// updates every retained period in one step.
#[derive(Debug, Clone)]
pub struct Home {
    fuel_type: FuelType,
    heat_sys_efficiency: f64,
    balance_point: f64,
    thermostat_set_point: f64,
    avg_non_heating_usage: f64,
    periods: Vec<BillingPeriod>,
    excluded: Vec<BillingPeriod>,
    stats: Option<UaStats>,
}

impl Home {
    pub fn new(params: HomeParameters) -> Result<Self> {
        params.validate()?;

        Ok(Self {
            fuel_type: params.fuel_type,
            heat_sys_efficiency: params.heat_sys_efficiency,
            balance_point: params.balance_point,
            thermostat_set_point: params.thermostat_set_point,
            avg_non_heating_usage: 0.0,
            periods: Vec::new(),
            excluded: Vec::new(),
            stats: None,
        })
    }

    /// Build one billing period per (temperatures, usage) pair, replacing any
    /// previously loaded history.
    pub fn initialize_billing_periods(
        &mut self,
        temps: &[Vec<f64>],
        usages: &[f64],
        avg_non_heating_usage: f64,
    ) -> Result<()> {
        if temps.len() != usages.len() {
            return Err(HeatLossError::InvalidInput(format!(
                "{} temperature sequences but {} usages",
                temps.len(),
                usages.len()
            )));
        }
        if !avg_non_heating_usage.is_finite() {
            return Err(HeatLossError::InvalidInput(format!(
                "non-finite average non-heating usage {avg_non_heating_usage}"
            )));
        }

        let context = HomeContext {
            avg_non_heating_usage,
            ..self.context()
        };
        let periods = temps
            .iter()
            .zip(usages)
            .enumerate()
            .map(|(id, (t, usage))| BillingPeriod::new(id, t.clone(), *usage, &context))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            periods = periods.len(),
            balance_point = self.balance_point,
            "initialized billing periods"
        );

        self.avg_non_heating_usage = avg_non_heating_usage;
        self.periods = periods;
        self.excluded.clear();
        self.stats = None;
        Ok(())
    }

    pub fn initialize_from_bills(
        &mut self,
        bills: &[BillInput],
        avg_non_heating_usage: f64,
    ) -> Result<()> {
        let temps: Vec<Vec<f64>> = bills.iter().map(|b| b.avg_temps.clone()).collect();
        let usages: Vec<f64> = bills.iter().map(|b| b.usage).collect();
        self.initialize_billing_periods(&temps, &usages, avg_non_heating_usage)
    }

    /// The fields a billing period reads from its home.
    pub fn context(&self) -> HomeContext {
        HomeContext {
            balance_point: self.balance_point,
            fuel_btu_per_unit: self.fuel_type.btu_per_unit(),
            heat_sys_efficiency: self.heat_sys_efficiency,
            avg_non_heating_usage: self.avg_non_heating_usage,
        }
    }

    /// Move the balance point to `balance_point` and recompute HDD and UA of
    /// every retained period. Nothing changes if any period fails.
    pub fn recompute_periods_at(&mut self, balance_point: f64) -> Result<UaStats> {
        let evaluated = self.evaluate_periods_at(balance_point)?;
        let uas: Vec<f64> = evaluated.iter().map(|p| p.ua).collect();
        let stats = UaStats::from_uas(&uas)?;

        for (period, at) in self.periods.iter_mut().zip(evaluated) {
            period.apply(at);
        }
        self.balance_point = balance_point;
        self.stats = Some(stats);
        Ok(stats)
    }

    /// Statistics the retained periods would have at `balance_point`.
    pub fn trial_stats(&self, balance_point: f64) -> Result<UaStats> {
        let uas: Vec<f64> = self
            .evaluate_periods_at(balance_point)?
            .iter()
            .map(|p| p.ua)
            .collect();
        UaStats::from_uas(&uas)
    }

    fn evaluate_periods_at(&self, balance_point: f64) -> Result<Vec<PeriodUa>> {
        self.periods
            .iter()
            .map(|p| p.evaluate_at(balance_point))
            .collect()
    }

    /// Statistics over the retained periods at the current balance point.
    pub fn current_stats(&self) -> Result<UaStats> {
        UaStats::from_uas(&self.uas())
    }

    pub(crate) fn refresh_stats(&mut self) -> Result<UaStats> {
        let stats = self.current_stats()?;
        self.stats = Some(stats);
        Ok(stats)
    }

    pub(crate) fn set_stats(&mut self, stats: UaStats) {
        self.stats = Some(stats);
    }

    pub(crate) fn take_period(&mut self, index: usize) -> BillingPeriod {
        self.periods.remove(index)
    }

    pub(crate) fn push_excluded(&mut self, period: BillingPeriod) {
        self.excluded.push(period);
    }

    pub(crate) fn excluded_mut(&mut self) -> &mut Vec<BillingPeriod> {
        &mut self.excluded
    }

    pub(crate) fn periods_mut(&mut self) -> &mut Vec<BillingPeriod> {
        &mut self.periods
    }

    pub fn uas(&self) -> Vec<f64> {
        self.periods.iter().map(|p| p.ua()).collect()
    }

    pub fn fuel_type(&self) -> FuelType {
        self.fuel_type
    }

    pub fn heat_sys_efficiency(&self) -> f64 {
        self.heat_sys_efficiency
    }

    pub fn balance_point(&self) -> f64 {
        self.balance_point
    }

    pub fn thermostat_set_point(&self) -> f64 {
        self.thermostat_set_point
    }

    pub fn avg_non_heating_usage(&self) -> f64 {
        self.avg_non_heating_usage
    }

    /// Retained billing periods, in input order.
    pub fn billing_periods(&self) -> &[BillingPeriod] {
        &self.periods
    }

    /// Periods removed from the analysis, in the order they were removed.
    pub fn excluded_periods(&self) -> &[BillingPeriod] {
        &self.excluded
    }

    /// Latest aggregate statistics, if an estimate has been computed.
    pub fn stats(&self) -> Option<UaStats> {
        self.stats
    }

    pub fn avg_ua(&self) -> Option<f64> {
        self.stats.map(|s| s.avg_ua)
    }

    pub fn stdev_pct(&self) -> Option<f64> {
        self.stats.map(|s| s.stdev_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::degree_days::period_hdd;

    fn home() -> Home {
        Home::new(HomeParameters::new(FuelType::Gas, 0.95)).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_parameters() {
        let err = Home::new(HomeParameters::new(FuelType::Gas, 1.5)).unwrap_err();
        assert!(matches!(err, HeatLossError::InvalidInput(_)));
    }

    #[test]
    fn test_initialize_assigns_ids_in_order() {
        let mut home = home();
        home.initialize_billing_periods(
            &[vec![40.0, 42.0], vec![50.0], vec![30.0]],
            &[2.0, 1.0, 3.0],
            0.0,
        )
        .unwrap();

        let ids: Vec<usize> = home.billing_periods().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(home.excluded_periods().is_empty());
        assert!(home.stats().is_none());
    }

    #[test]
    fn test_initialize_rejects_mismatched_lengths() {
        let mut home = home();
        let err = home
            .initialize_billing_periods(&[vec![40.0]], &[2.0, 1.0], 0.0)
            .unwrap_err();
        assert!(matches!(err, HeatLossError::InvalidInput(_)));
    }

    #[test]
    fn test_initialize_keeps_previous_history_on_error() {
        let mut home = home();
        home.initialize_billing_periods(&[vec![40.0], vec![45.0]], &[2.0, 1.0], 0.0)
            .unwrap();

        let err = home
            .initialize_billing_periods(&[vec![40.0], vec![65.0]], &[2.0, 1.0], 0.0)
            .unwrap_err();
        assert!(matches!(err, HeatLossError::ZeroDegreeDayPeriod { period: 1, .. }));
        assert_eq!(home.billing_periods().len(), 2);
        assert_eq!(home.billing_periods()[1].avg_temps(), &[45.0]);
    }

    #[test]
    fn test_recompute_synchronises_every_period() {
        let mut home = home();
        home.initialize_billing_periods(
            &[vec![40.0, 42.0, 44.0, 46.0], vec![50.0, 52.0, 54.0, 56.0]],
            &[2.0, 1.0],
            0.0,
        )
        .unwrap();

        let stats = home.recompute_periods_at(64.0).unwrap();

        assert_eq!(home.balance_point(), 64.0);
        assert_eq!(home.stats(), Some(stats));
        for period in home.billing_periods() {
            assert_eq!(period.total_hdd(), period_hdd(period.avg_temps(), 64.0));
            assert_eq!(period.ua(), period.partial_ua() / period.total_hdd());
        }
    }

    #[test]
    fn test_recompute_is_atomic() {
        let mut home = home();
        home.initialize_billing_periods(&[vec![40.0], vec![55.0]], &[2.0, 1.0], 0.0)
            .unwrap();
        let before = home.billing_periods().to_vec();

        let err = home.recompute_periods_at(54.0).unwrap_err();

        assert!(matches!(err, HeatLossError::ZeroDegreeDayPeriod { period: 1, .. }));
        assert_eq!(home.balance_point(), 60.0);
        assert_eq!(home.billing_periods(), before.as_slice());
    }

    #[test]
    fn test_trial_stats_does_not_mutate() {
        let mut home = home();
        home.initialize_billing_periods(&[vec![40.0, 42.0], vec![50.0, 52.0]], &[2.0, 1.0], 0.0)
            .unwrap();
        let trial = home.trial_stats(62.0).unwrap();
        assert_eq!(home.balance_point(), 60.0);
        assert_ne!(trial, home.current_stats().unwrap());
    }
}
