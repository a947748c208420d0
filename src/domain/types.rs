use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use validator::{Validate, ValidationError};

// ============================================================================
// Fuel Types
// ============================================================================

/// Heating fuel, tagged with its energy content in BTU per billed usage unit
/// (therm of gas, gallon of oil or propane).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum FuelType {
    Gas,
    Oil,
    Propane,
}

impl FuelType {
    pub const fn btu_per_unit(&self) -> f64 {
        match self {
            FuelType::Gas => 100_000.0,
            FuelType::Oil => 139_600.0,
            FuelType::Propane => 91_333.0,
        }
    }
}

// ============================================================================
// Home Parameters
// ============================================================================

pub const DEFAULT_BALANCE_POINT_F: f64 = 60.0;
pub const DEFAULT_THERMOSTAT_SET_POINT_F: f64 = 68.0;

/// Fixed characteristics of a home under analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_home_parameters"))]
pub struct HomeParameters {
    pub fuel_type: FuelType,
    /// Heating system efficiency as a fraction
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub heat_sys_efficiency: f64,
    /// Starting balance point (°F)
    #[serde(default = "default_balance_point")]
    pub balance_point: f64,
    /// Normal thermostat set point (°F), the ceiling for the balance point
    #[serde(default = "default_thermostat_set_point")]
    pub thermostat_set_point: f64,
}

fn default_balance_point() -> f64 {
    DEFAULT_BALANCE_POINT_F
}

fn default_thermostat_set_point() -> f64 {
    DEFAULT_THERMOSTAT_SET_POINT_F
}

impl HomeParameters {
    pub fn new(fuel_type: FuelType, heat_sys_efficiency: f64) -> Self {
        Self {
            fuel_type,
            heat_sys_efficiency,
            balance_point: DEFAULT_BALANCE_POINT_F,
            thermostat_set_point: DEFAULT_THERMOSTAT_SET_POINT_F,
        }
    }

    pub fn with_balance_point(mut self, balance_point: f64) -> Self {
        self.balance_point = balance_point;
        self
    }

    pub fn with_thermostat_set_point(mut self, set_point: f64) -> Self {
        self.thermostat_set_point = set_point;
        self
    }
}

fn validate_home_parameters(params: &HomeParameters) -> Result<(), ValidationError> {
    if !params.balance_point.is_finite() || !params.thermostat_set_point.is_finite() {
        return Err(ValidationError::new("non_finite_temperature"));
    }
    if params.balance_point > params.thermostat_set_point {
        return Err(ValidationError::new("balance_point_above_set_point"));
    }
    Ok(())
}
