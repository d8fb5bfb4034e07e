use std::{
    error::Error,
    fmt::{self, Display},
    fs, io,
    num::NonZeroUsize,
    path::Path,
};

use serde::{Deserialize, Serialize};

/// Errors produced while loading a training configuration.
#[derive(Debug)]
pub enum ConfigErr {
    Io(io::Error),
    Json(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErr::Io(e) => write!(f, "io error: {e}"),
            ConfigErr::Json(e) => write!(f, "invalid JSON: {e}"),
            ConfigErr::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for ConfigErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigErr::Io(e) => Some(e),
            ConfigErr::Json(e) => Some(e),
            ConfigErr::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for ConfigErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// The optimization algorithm to train with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerConfig {
    GradientDescent { lr: f64 },
    Sag { lr: f64 },
}

impl OptimizerConfig {
    fn learning_rate(&self) -> f64 {
        match *self {
            OptimizerConfig::GradientDescent { lr } | OptimizerConfig::Sag { lr } => lr,
        }
    }
}

/// The configuration of a synthetic least squares training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub samples: NonZeroUsize,
    pub features: NonZeroUsize,
    #[serde(default)]
    pub noise: f64,
    pub epochs: NonZeroUsize,
    #[serde(default)]
    pub seed: Option<u64>,
    pub optimizer: OptimizerConfig,
}

impl TrainingConfig {
    /// Reads and validates a `TrainingConfig` from a JSON file.
    ///
    /// # Errors
    /// Returns a `ConfigErr` if the file can't be read, isn't valid JSON for this struct or
    /// holds invalid values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigErr> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses and validates a `TrainingConfig` from a JSON string.
    ///
    /// # Errors
    /// Returns a `ConfigErr` if `json` isn't valid JSON for this struct or holds invalid values.
    pub fn from_json(json: &str) -> Result<Self, ConfigErr> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigErr> {
        if !self.noise.is_finite() || self.noise < 0. {
            return Err(ConfigErr::Invalid(format!(
                "noise must be finite and non negative, got {}",
                self.noise
            )));
        }

        let lr = self.optimizer.learning_rate();
        if !lr.is_finite() || lr <= 0. {
            return Err(ConfigErr::Invalid(format!(
                "learning rate must be finite and positive, got {lr}"
            )));
        }

        Ok(())
    }
}
