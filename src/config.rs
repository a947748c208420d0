use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::analysis::{DesignConditions, EstimatorSettings};
use crate::domain::HomeParameters;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub home: HomeParameters,
    #[serde(default)]
    pub estimator: EstimatorSettings,
    pub input: InputConfig,
    pub design: Option<DesignConditions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// JSON billing history, see [`crate::domain::BillingHistory`]
    pub bills_path: PathBuf,
    /// Baseline usage per day not attributable to heating
    #[serde(default)]
    pub avg_non_heating_usage: f64,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("HEAT__").split("__"));
        let cfg: Config = figment.extract()?;
        cfg.check()?;
        Ok(cfg)
    }

    fn check(&self) -> Result<()> {
        self.home.validate()?;
        self.estimator.validate()?;
        if let Some(design) = &self.design {
            design.validate()?;
        }
        if !self.input.avg_non_heating_usage.is_finite() {
            anyhow::bail!("input.avg_non_heating_usage must be finite");
        }
        Ok(())
    }
}
