//! TOML run configuration.
//!
//! Every key is optional; a missing file yields [`Config::default`], which
//! reproduces the reference run (kaggle CSV, 80/20 split with seed 2, Newton
//! solver with `C = 1`, the documented query sample).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::logistic_regression::{Solver, TrainOptions};
use crate::parse::DatasetLayout;
use crate::prediction::DEFAULT_QUERY;

pub const CONFIG_FILE_NAME: &str = "logistic.toml";
pub const CONFIG_ENV_VAR: &str = "LOGISTIC_CONFIG";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data: DataConfig,
    pub split: SplitConfig,
    pub model: ModelConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub path: PathBuf,
    pub layout: DatasetLayout,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/breast-cancer.csv"),
            layout: DatasetLayout::Kaggle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub solver: Solver,
    pub inverse_regularization: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub learning_rate: f64,
    pub standardize: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let options = TrainOptions::default();
        Self {
            solver: options.solver,
            inverse_regularization: options.inverse_regularization,
            max_iterations: options.max_iterations,
            tolerance: options.tolerance,
            learning_rate: options.learning_rate,
            standardize: false,
        }
    }
}

impl ModelConfig {
    pub fn train_options(&self) -> TrainOptions {
        TrainOptions {
            solver: self.solver,
            inverse_regularization: self.inverse_regularization,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            learning_rate: self.learning_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub top_features: usize,
    pub loss_plot: Option<PathBuf>,
    pub query: Vec<f64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_features: 5,
            loss_plot: None,
            query: DEFAULT_QUERY.to_vec(),
        }
    }
}

impl Config {
    /// Path named by `LOGISTIC_CONFIG`, else `logistic.toml` in the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR).map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), PathBuf::from)
    }

    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fraction = self.split.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(invalid("split.test_fraction", format!("{fraction} is not in (0, 1)")));
        }

        let model = &self.model;
        if !(model.inverse_regularization.is_finite() && model.inverse_regularization > 0.0) {
            return Err(invalid(
                "model.inverse_regularization",
                format!("{} must be positive", model.inverse_regularization),
            ));
        }
        if model.max_iterations == 0 {
            return Err(invalid("model.max_iterations", "must be at least 1".to_string()));
        }
        if !(model.tolerance.is_finite() && model.tolerance >= 0.0) {
            return Err(invalid(
                "model.tolerance",
                format!("{} must be non-negative", model.tolerance),
            ));
        }
        if !(model.learning_rate.is_finite() && model.learning_rate > 0.0) {
            return Err(invalid(
                "model.learning_rate",
                format!("{} must be positive", model.learning_rate),
            ));
        }

        if self.report.query.iter().any(|value| !value.is_finite()) {
            return Err(invalid("report.query", "values must be finite".to_string()));
        }

        Ok(())
    }
}

fn invalid(key: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { key, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_the_default() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.report.query.len(), 30);
        assert_eq!(config.split.seed, 2);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [data]
            layout = "sklearn"

            [model]
            solver = "gradient-descent"
            standardize = true
            "#,
        )
        .unwrap();

        assert_eq!(config.data.layout, DatasetLayout::Sklearn);
        assert_eq!(config.data.path, PathBuf::from("data/breast-cancer.csv"));
        assert_eq!(config.model.solver, Solver::GradientDescent);
        assert!(config.model.standardize);
        assert_eq!(config.model.max_iterations, 100);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("[split]\nratio = 0.3\n").is_err());
    }

    #[test]
    fn validation_catches_bad_fraction() {
        let mut config = Config::default();
        config.split.test_fraction = 1.0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                key: "split.test_fraction",
                ..
            })
        ));
    }

    #[test]
    fn validation_catches_bad_regularization() {
        let mut config = Config::default();
        config.model.inverse_regularization = 0.0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_means_defaults() {
        let config = Config::load_or_default(Path::new("no/such/logistic.toml")).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn train_options_mirror_model_section() {
        let options = Config::default().model.train_options();

        assert_eq!(options, TrainOptions::default());
    }
}
