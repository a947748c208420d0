use serde::{Deserialize, Serialize};

use crate::error::{HeatLossError, Result};

/// Aggregate UA statistics over a set of billing periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UaStats {
    /// Mean UA (BTU/hr/°F)
    pub avg_ua: f64,
    /// Population standard deviation of UA divided by the mean
    pub stdev_pct: f64,
}

impl UaStats {
    pub fn from_uas(uas: &[f64]) -> Result<Self> {
        if uas.len() < 2 {
            return Err(HeatLossError::InsufficientPeriods { retained: uas.len() });
        }

        let n = uas.len() as f64;
        let avg_ua = compensated_sum(uas.iter().copied()) / n;
        if avg_ua == 0.0 || !avg_ua.is_finite() {
            return Err(HeatLossError::InvalidInput(format!(
                "mean UA of {avg_ua} leaves the UA spread undefined"
            )));
        }

        let variance = compensated_sum(uas.iter().map(|ua| (ua - avg_ua).powi(2))) / n;

        Ok(Self {
            avg_ua,
            stdev_pct: variance.sqrt() / avg_ua,
        })
    }
}

/// Neumaier summation. Keeps the rounding error of each addition so the
/// result does not depend on the order of large and small terms.
fn compensated_sum(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut compensation = 0.0;
    for value in values {
        let total = sum + value;
        if f64::abs(sum) >= f64::abs(value) {
            compensation += (sum - total) + value;
        } else {
            compensation += (value - total) + sum;
        }
        sum = total;
    }
    sum + compensation
}

/// Index of the UA furthest from `avg_ua`. Ties go to the earliest index.
pub fn largest_deviation_index(uas: &[f64], avg_ua: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, ua) in uas.iter().enumerate() {
        let deviation = (ua - avg_ua).abs();
        if best.map_or(true, |(_, largest)| deviation > largest) {
            best = Some((i, deviation));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_stdev_pct() {
        let stats = UaStats::from_uas(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.avg_ua, 5.0);
        // population stdev is 2.0
        assert!((stats.stdev_pct - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_identical_uas_have_no_spread() {
        let stats = UaStats::from_uas(&[300.0, 300.0, 300.0]).unwrap();
        assert_eq!(stats.stdev_pct, 0.0);
    }

    #[test]
    fn test_sums_without_drift() {
        assert_eq!(compensated_sum([1.0, 1e100, 1.0, -1e100].into_iter()), 2.0);

        // A naive running sum of ten 0.1s lands just below 1.0
        let stats = UaStats::from_uas(&[0.1; 10]).unwrap();
        assert_eq!(stats.avg_ua, 0.1);
        assert_eq!(stats.stdev_pct, 0.0);
    }

    #[test]
    fn test_requires_two_values() {
        assert_eq!(
            UaStats::from_uas(&[100.0]),
            Err(HeatLossError::InsufficientPeriods { retained: 1 })
        );
        assert!(matches!(
            UaStats::from_uas(&[]),
            Err(HeatLossError::InsufficientPeriods { retained: 0 })
        ));
    }

    #[test]
    fn test_zero_mean_rejected() {
        assert!(matches!(
            UaStats::from_uas(&[-10.0, 10.0]),
            Err(HeatLossError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_largest_deviation_prefers_first_on_tie() {
        // 90 and 110 are equally far from 100
        assert_eq!(largest_deviation_index(&[100.0, 90.0, 110.0], 100.0), Some(1));
        assert_eq!(largest_deviation_index(&[110.0, 100.0, 90.0], 100.0), Some(0));
        assert_eq!(largest_deviation_index(&[100.0, 100.0, 140.0], 100.0), Some(2));
        assert_eq!(largest_deviation_index(&[], 100.0), None);
    }
}
