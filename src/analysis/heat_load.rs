use serde::{Deserialize, Serialize};
use validator::Validate;

/// Average indoor temperature (°F) for a home that spends part of each day
/// at a setback temperature.
pub fn average_indoor_temp(tstat_set: f64, tstat_setback: f64, setback_daily_hrs: f64) -> f64 {
    ((24.0 - setback_daily_hrs) * tstat_set + setback_daily_hrs * tstat_setback) / 24.0
}

/// Average heat load (BTU/hr) at the design temperature, adjusted for the
/// gap between the average indoor temperature and the balance point.
pub fn average_heat_load(
    design_set_point: f64,
    avg_indoor_temp: f64,
    balance_point: f64,
    design_temp: f64,
    ua: f64,
) -> f64 {
    (design_set_point - (avg_indoor_temp - balance_point) - design_temp) * ua
}

/// Maximum heat load (BTU/hr) at the design temperature.
pub fn max_heat_load(design_set_point: f64, design_temp: f64, ua: f64) -> f64 {
    (design_set_point - design_temp) * ua
}

/// Regional design conditions used to size peak heating demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DesignConditions {
    /// Standard indoor design temperature (°F), independent of the occupant's thermostat
    #[serde(default = "default_design_set_point")]
    pub design_set_point: f64,
    /// One of the coldest outdoor temperatures of the year for the location (°F)
    pub design_temp: f64,
    /// Temperature (°F) the thermostat is set back to during off hours
    pub setback_temp: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 24.0))]
    pub setback_daily_hours: f64,
}

fn default_design_set_point() -> f64 {
    70.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatLoadSummary {
    pub avg_indoor_temp: f64,
    pub average_heat_load: f64,
    pub max_heat_load: f64,
}

impl HeatLoadSummary {
    /// Combine a finished estimate with design conditions.
    ///
    /// Without a setback temperature the home is assumed to sit at
    /// `thermostat_set_point` all day.
    pub fn calculate(
        design: &DesignConditions,
        thermostat_set_point: f64,
        balance_point: f64,
        ua: f64,
    ) -> Self {
        let avg_indoor_temp = match design.setback_temp {
            Some(setback) => {
                average_indoor_temp(thermostat_set_point, setback, design.setback_daily_hours)
            }
            None => thermostat_set_point,
        };

        Self {
            avg_indoor_temp,
            average_heat_load: average_heat_load(
                design.design_set_point,
                avg_indoor_temp,
                balance_point,
                design.design_temp,
                ua,
            ),
            max_heat_load: max_heat_load(design.design_set_point, design.design_temp, ua),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_indoor_temp() {
        let t = average_indoor_temp(68.0, 55.0, 8.0);
        assert!((t - 63.666_666).abs() < 1e-4);
        assert_eq!(average_indoor_temp(68.0, 55.0, 0.0), 68.0);
    }

    #[test]
    fn test_heat_loads() {
        // (70 - (68 - 60) - 0) * 500
        assert_eq!(average_heat_load(70.0, 68.0, 60.0, 0.0, 500.0), 31_000.0);
        assert_eq!(max_heat_load(70.0, 0.0, 500.0), 35_000.0);
    }

    #[test]
    fn test_summary_uses_setback() {
        let design = DesignConditions {
            design_set_point: 70.0,
            design_temp: 10.0,
            setback_temp: Some(56.0),
            setback_daily_hours: 12.0,
        };
        let summary = HeatLoadSummary::calculate(&design, 68.0, 62.0, 300.0);

        assert_eq!(summary.avg_indoor_temp, 62.0);
        assert_eq!(summary.average_heat_load, 18_000.0);
        assert_eq!(summary.max_heat_load, 18_000.0);
    }

    #[test]
    fn test_setback_hours_bounded() {
        let design = DesignConditions {
            design_set_point: 70.0,
            design_temp: 0.0,
            setback_temp: None,
            setback_daily_hours: 30.0,
        };
        assert!(design.validate().is_err());
    }
}
