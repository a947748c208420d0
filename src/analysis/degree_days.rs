//! Heating degree days
//!
//! A heating degree day measures how far the day's average outdoor
//! temperature falls below the home's balance point. Days warmer than the
//! balance point contribute nothing.

/// Heating degree days for a single day (°F·day).
pub fn hdd(avg_temp: f64, balance_point: f64) -> f64 {
    (balance_point - avg_temp).max(0.0)
}

/// Total heating degree days over a sequence of daily average temperatures.
pub fn period_hdd(avg_temps: &[f64], balance_point: f64) -> f64 {
    avg_temps.iter().map(|t| hdd(*t, balance_point)).sum()
}
