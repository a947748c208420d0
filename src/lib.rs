//! Home heat analysis
//!
//! Estimates a building's heating balance point and UA coefficient from
//! utility billing history using degree-day regression with outlier
//! rejection.

pub mod analysis;
pub mod config;
pub mod domain;
pub mod error;
pub mod telemetry;

pub use analysis::{
    DesignConditions, EstimationReport, EstimatorSettings, HeatLoadSummary, Termination, UaStats,
};
pub use domain::{BillInput, BillingPeriod, FuelType, Home, HomeParameters};
pub use error::{HeatLossError, Result};
