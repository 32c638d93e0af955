//! Configuration loading for sentvec.
//!
//! Layered config: defaults -> config file -> env vars -> caller overrides.
//! Default config file lives at ~/.config/sentvec/config.{toml,json,yaml}.
//! Env vars use `SENTVEC_` as prefix and `__` between nested keys, since
//! field names themselves contain `_`.
//!
//! Capacity limits of the averaging kernel are compile-time constants and
//! intentionally absent here.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::SentvecError;

/// Character n-gram settings for the subword fallback.
///
/// Defaults match fastText: n-grams of 3 to 6 characters hashed into
/// 2 million buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubwordSettings {
    /// Shortest n-gram length in characters
    #[serde(default = "default_min_n")]
    pub min_n: usize,

    /// Longest n-gram length in characters
    #[serde(default = "default_max_n")]
    pub max_n: usize,

    /// Number of hash buckets (rows of the n-gram matrix)
    #[serde(default = "default_bucket")]
    pub bucket: usize,
}

fn default_min_n() -> usize {
    3
}

fn default_max_n() -> usize {
    6
}

fn default_bucket() -> usize {
    2_000_000
}

impl Default for SubwordSettings {
    fn default() -> Self {
        Self {
            min_n: default_min_n(),
            max_n: default_max_n(),
            bucket: default_bucket(),
        }
    }
}

impl SubwordSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), SentvecError> {
        if self.min_n == 0 {
            return Err(SentvecError::Config("min_n must be > 0".to_string()));
        }
        if self.min_n > self.max_n {
            return Err(SentvecError::Config(format!(
                "min_n ({}) must not exceed max_n ({})",
                self.min_n, self.max_n
            )));
        }
        if self.bucket == 0 {
            return Err(SentvecError::Config("bucket must be > 0".to_string()));
        }
        if self.bucket > u32::MAX as usize {
            return Err(SentvecError::Config(format!(
                "bucket must fit in 32 bits, got {}",
                self.bucket
            )));
        }
        Ok(())
    }
}

/// Main settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Worker count for parallel dispatch.
    ///
    /// Carried through to the model view but never read by the kernel itself.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Subword fallback settings
    #[serde(default)]
    pub subword: SubwordSettings,
}

fn default_workers() -> usize {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            subword: SubwordSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/sentvec/config.*)
    /// 3. Caller-specified config file (optional)
    /// 4. Environment variables (SENTVEC_*)
    ///
    /// Explicit overrides should be applied by the caller after this returns.
    pub fn load(config_path: Option<&str>) -> Result<Self, SentvecError> {
        let config_dir = ProjectDirs::from("", "", "sentvec")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("workers", default_workers() as i64)
            .map_err(|e| SentvecError::Config(e.to_string()))?
            .set_default("subword.min_n", default_min_n() as i64)
            .map_err(|e| SentvecError::Config(e.to_string()))?
            .set_default("subword.max_n", default_max_n() as i64)
            .map_err(|e| SentvecError::Config(e.to_string()))?
            .set_default("subword.bucket", default_bucket() as i64)
            .map_err(|e| SentvecError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: SENTVEC_WORKERS, SENTVEC_SUBWORD__MIN_N, SENTVEC_SUBWORD__BUCKET
        builder = builder.add_source(
            Environment::with_prefix("SENTVEC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| SentvecError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| SentvecError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), SentvecError> {
        if self.workers == 0 {
            return Err(SentvecError::Config("workers must be > 0".to_string()));
        }
        self.subword.validate()
    }
}
