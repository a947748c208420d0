use serde::{Deserialize, Serialize};

use crate::analysis::degree_days::period_hdd;
use crate::error::{HeatLossError, Result};

const HOURS_PER_DAY: f64 = 24.0;

/// Read-only view of the owning home's fields a billing period depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeContext {
    pub balance_point: f64,
    pub fuel_btu_per_unit: f64,
    pub heat_sys_efficiency: f64,
    pub avg_non_heating_usage: f64,
}

/// Raw billing input: daily average outdoor temperatures (°F) and total fuel
/// usage for the cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillInput {
    pub avg_temps: Vec<f64>,
    pub usage: f64,
}

/// Billing history as read by the command-line runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingHistory {
    pub periods: Vec<BillInput>,
}

/// Heating degree days and UA of one period at a given balance point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodUa {
    pub total_hdd: f64,
    pub ua: f64,
}

/// One utility bill cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingPeriod {
    id: usize,
    avg_temps: Vec<f64>,
    usage: f64,
    avg_heating_usage: f64,
    partial_ua: f64,
    total_hdd: f64,
    ua: f64,
}

impl BillingPeriod {
    pub fn new(id: usize, avg_temps: Vec<f64>, usage: f64, home: &HomeContext) -> Result<Self> {
        if avg_temps.is_empty() {
            return Err(HeatLossError::InvalidInput(format!(
                "billing period {id} has no daily temperatures"
            )));
        }
        if let Some(t) = avg_temps.iter().find(|t| !t.is_finite()) {
            return Err(HeatLossError::InvalidInput(format!(
                "billing period {id} has non-finite temperature {t}"
            )));
        }
        if !usage.is_finite() {
            return Err(HeatLossError::InvalidInput(format!(
                "billing period {id} has non-finite usage {usage}"
            )));
        }

        let days = avg_temps.len() as f64;
        // May be negative when the baseline exceeds the bill; left to the caller.
        let avg_heating_usage = usage / days - home.avg_non_heating_usage;
        let partial_ua =
            days * avg_heating_usage * home.fuel_btu_per_unit * home.heat_sys_efficiency
                / HOURS_PER_DAY;

        let mut period = Self {
            id,
            avg_temps,
            usage,
            avg_heating_usage,
            partial_ua,
            total_hdd: 0.0,
            ua: 0.0,
        };
        let at_balance_point = period.evaluate_at(home.balance_point)?;
        period.apply(at_balance_point);
        Ok(period)
    }

    /// HDD and UA at `balance_point` without touching the stored values.
    pub fn evaluate_at(&self, balance_point: f64) -> Result<PeriodUa> {
        let total_hdd = period_hdd(&self.avg_temps, balance_point);
        if total_hdd == 0.0 {
            return Err(HeatLossError::ZeroDegreeDayPeriod {
                period: self.id,
                balance_point,
            });
        }
        Ok(PeriodUa {
            total_hdd,
            ua: self.partial_ua / total_hdd,
        })
    }

    pub(crate) fn apply(&mut self, at: PeriodUa) {
        self.total_hdd = at.total_hdd;
        self.ua = at.ua;
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn avg_temps(&self) -> &[f64] {
        &self.avg_temps
    }

    pub fn days(&self) -> usize {
        self.avg_temps.len()
    }

    pub fn usage(&self) -> f64 {
        self.usage
    }

    pub fn avg_heating_usage(&self) -> f64 {
        self.avg_heating_usage
    }

    /// The portion of UA that does not depend on the balance point
    pub fn partial_ua(&self) -> f64 {
        self.partial_ua
    }

    pub fn total_hdd(&self) -> f64 {
        self.total_hdd
    }

    pub fn ua(&self) -> f64 {
        self.ua
    }
}
