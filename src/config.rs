use crate::error::ConfigError;
use crate::handler::HandlerKind;
use crate::parameter_store::ParameterStore;
use anyhow::{Context, Result};
use serde_derive::Deserialize;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::time::Duration;

/// Name of the parameter holding the stage-keyed query engine configuration.
pub const ATHENA_CONFIG_PARAMETER: &str = "athena_config";

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl AppConfig {
    pub fn log_level(&self) -> tracing::Level {
        tracing::Level::from_str(self.log_level.as_str()).unwrap_or(tracing::Level::INFO)
    }
}

pub(crate) fn load_app_config() -> Result<AppConfig> {
    envy::from_env::<AppConfig>()
        .map_err(ConfigError::env_parse)
        .context("Failed to load AppConfig")
}

fn default_stage() -> String {
    "production".to_string()
}

fn default_handler() -> HandlerKind {
    HandlerKind::GetEnergyProduction
}

#[derive(Deserialize, Debug)]
pub struct ServiceConfig {
    #[serde(default = "default_stage")]
    pub stage: String,
    #[serde(default = "default_handler")]
    pub handler: HandlerKind,
    // parameters are read from PARAM_* env vars when unset
    pub parameter_dir: Option<String>,
    pub parks_file: Option<String>,
}

pub fn load_service_config() -> Result<ServiceConfig> {
    envy::prefixed("SERVICE_").from_env::<ServiceConfig>()
        .map_err(ConfigError::env_parse)
        .context("Failed to load ServiceConfig")
}

fn default_output_location() -> String {
    "s3://energy-production-athena".to_string()
}

#[derive(Deserialize, Debug)]
struct AthenaClientEnv {
    endpoint: Option<String>,
    #[serde(default = "default_output_location")]
    output_location: String,
}

#[derive(Debug, Clone)]
pub struct AthenaClientConfig {
    pub endpoint: String,
    pub output_location: String,
}

/// An explicit endpoint wins; otherwise the regional one for `database_region`.
pub fn resolve_endpoint(
    endpoint: Option<String>,
    database_region: Option<&str>,
) -> Result<String, ConfigError> {
    match (endpoint, database_region) {
        (Some(endpoint), _) => Ok(endpoint),
        (None, Some(region)) => Ok(format!("https://athena.{}.amazonaws.com/", region)),
        (None, None) => Err(ConfigError::missing("ATHENA_ENDPOINT or database_region")),
    }
}

pub(crate) fn load_athena_client_config(database_region: Option<&str>) -> Result<AthenaClientConfig> {
    let env = envy::prefixed("ATHENA_")
        .from_env::<AthenaClientEnv>()
        .map_err(ConfigError::env_parse)
        .context("Failed to load AthenaClientConfig")?;
    let endpoint = resolve_endpoint(env.endpoint, database_region)
        .context("Failed to load AthenaClientConfig")?;
    Ok(AthenaClientConfig {
        endpoint,
        output_location: env.output_location,
    })
}

/// Engine status labels that end polling, and the subset that means failure.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct QueryStatuses {
    #[serde(rename = "final")]
    pub terminal: HashSet<String>,
    pub failed: HashSet<String>,
}

impl QueryStatuses {
    pub fn is_terminal(&self, state: &str) -> bool {
        self.terminal.contains(state)
    }

    pub fn is_failed(&self, state: &str) -> bool {
        self.failed.contains(state)
    }
}

fn default_poll_interval_seconds() -> f64 {
    1.0
}

/// Per-stage query engine settings, as stored in the parameter store.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AthenaConfiguration {
    pub database: String,
    // selects the engine endpoint when ATHENA_ENDPOINT is unset
    #[serde(default)]
    pub database_region: Option<String>,
    // None lets the engine pick its page size
    #[serde(default)]
    pub max_results: Option<u32>,
    #[serde(default = "default_poll_interval_seconds")]
    pub query_status_poll_interval_seconds: f64,
    pub query_statuses: QueryStatuses,
}

impl AthenaConfiguration {
    /// Wait between status polls; fractional seconds are allowed.
    pub fn poll_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.query_status_poll_interval_seconds).unwrap_or_default()
    }

    /// Treats `max_results: 0` as unset and rejects unusable poll intervals.
    fn normalize(mut self, field: &str) -> Result<Self, ConfigError> {
        if self.max_results == Some(0) {
            self.max_results = None;
        }
        let interval = self.query_status_poll_interval_seconds;
        if Duration::try_from_secs_f64(interval).is_err() {
            return Err(ConfigError::invalid(
                format!("{}.query_status_poll_interval_seconds", field),
                format!("{} is not a usable number of seconds", interval),
            ));
        }
        Ok(self)
    }
}

/// Reads the `athena_config` parameter and selects the block for `stage`.
pub fn get_athena_configuration(
    store: &dyn ParameterStore,
    stage: &str,
) -> Result<AthenaConfiguration, ConfigError> {
    let raw = store.get_parameter(ATHENA_CONFIG_PARAMETER)?;
    let mut stages: HashMap<String, serde_json::Value> = serde_json::from_str(&raw)
        .map_err(|e| ConfigError::invalid(ATHENA_CONFIG_PARAMETER, e.to_string()))?;
    let field = format!("{}.{}", ATHENA_CONFIG_PARAMETER, stage);
    let stage_config = stages
        .remove(stage)
        .ok_or_else(|| ConfigError::missing(field.clone()))?;
    let configuration: AthenaConfiguration = serde_json::from_value(stage_config)
        .map_err(|e| ConfigError::invalid(field.clone(), e.to_string()))?;
    configuration.normalize(&field)
}
