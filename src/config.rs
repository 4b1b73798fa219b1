use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use validator::Validate;

use crate::models::WeightConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub assignment: AssignmentSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignmentSettings {
    /// TA slots offered by every professor
    #[serde(default = "default_professor_capacity")]
    #[validate(range(min = 1))]
    pub professor_capacity: u32,
}

impl Default for AssignmentSettings {
    fn default() -> Self {
        Self {
            professor_capacity: default_professor_capacity(),
        }
    }
}

fn default_professor_capacity() -> u32 { 2 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    /// Used when no weights are stored in the database
    #[serde(default)]
    pub weights: WeightsConfig,
}

/// Weights must be finite and non-negative; `Settings::load` rejects others
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WeightsConfig {
    #[serde(default = "default_ta_pref_weight")]
    #[validate(range(min = 0.0))]
    pub ta_pref: f64,
    #[serde(default = "default_prof_pref_weight")]
    #[validate(range(min = 0.0))]
    pub prof_pref: f64,
    #[serde(default = "default_course_pref_weight")]
    #[validate(range(min = 0.0))]
    pub course_pref: f64,
    #[serde(default = "default_workload_balance_weight")]
    #[validate(range(min = 0.0))]
    pub workload_balance: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            ta_pref: default_ta_pref_weight(),
            prof_pref: default_prof_pref_weight(),
            course_pref: default_course_pref_weight(),
            workload_balance: default_workload_balance_weight(),
        }
    }
}

impl From<&WeightsConfig> for WeightConfig {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            ta_pref: config.ta_pref,
            prof_pref: config.prof_pref,
            course_pref: config.course_pref,
            workload_balance: config.workload_balance,
        }
    }
}

fn default_ta_pref_weight() -> f64 { 0.4 }
fn default_prof_pref_weight() -> f64 { 0.4 }
fn default_course_pref_weight() -> f64 { 0.0 }
fn default_workload_balance_weight() -> f64 { 0.2 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TA_ASSIGN)
    /// 5. DATABASE_URL, if set
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., TA_ASSIGN__SERVER__PORT -> server.port
            .add_source(env_source());

        let builder = match std::env::var("DATABASE_URL") {
            Ok(url) => builder.set_override("database.url", url)?,
            Err(_) => builder,
        };

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validated()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        settings.validated()
    }

    /// Reject settings the matcher cannot run with
    fn validated(self) -> Result<Self, ConfigError> {
        self.assignment
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid assignment settings: {}", e)))?;
        self.scoring
            .weights
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid scoring weights: {}", e)))?;

        // range() lets NaN through
        let weights = self.default_weights();
        if !weights.is_usable() {
            return Err(ConfigError::Message(format!(
                "Invalid scoring weights: {:?} must be finite and non-negative",
                weights
            )));
        }

        Ok(self)
    }

    /// Default weight snapshot for runs with no stored weights
    pub fn default_weights(&self) -> WeightConfig {
        WeightConfig::from(&self.scoring.weights)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("TA_ASSIGN")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
