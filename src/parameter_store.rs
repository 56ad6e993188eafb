//! Parameter store access for stage-keyed service configuration.
//!
//! Stores return raw parameter values; decoding is the caller's concern
//! (see `config::get_athena_configuration`).

use crate::error::ConfigError;
use std::path::PathBuf;

/// Trait for named-parameter lookups.
pub trait ParameterStore: Send + Sync {
    /// Returns the raw value of parameter `name`.
    fn get_parameter(&self, name: &str) -> Result<String, ConfigError>;
}

/// Reads each parameter from a file of the same name inside `dir`.
pub struct FileParameterStore {
    dir: PathBuf,
}

impl FileParameterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ParameterStore for FileParameterStore {
    fn get_parameter(&self, name: &str) -> Result<String, ConfigError> {
        let path = self.dir.join(name);
        tracing::debug!("Reading parameter {} from {}", name, path.display());
        std::fs::read_to_string(&path).map_err(|e| ConfigError::parameter(name, e))
    }
}

/// Reads parameter `name` from the env var `PARAM_<NAME>`.
pub struct EnvParameterStore;

impl EnvParameterStore {
    fn env_key(name: &str) -> String {
        format!("PARAM_{}", name.to_uppercase())
    }
}

impl ParameterStore for EnvParameterStore {
    fn get_parameter(&self, name: &str) -> Result<String, ConfigError> {
        let key = Self::env_key(name);
        std::env::var(&key).map_err(|e| ConfigError::parameter(name, format!("{}: {}", key, e)))
    }
}
