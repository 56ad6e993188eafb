//! Park metadata registry loaded from a JSON array of park records.

use crate::error::RegistryError;
use crate::model::{Park, ParkRegistry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

pub struct JsonParkRegistry {
    parks: HashMap<String, Park>,
}

impl JsonParkRegistry {
    pub fn from_parks(parks: Vec<Park>) -> Self {
        Self {
            parks: parks
                .into_iter()
                .map(|park| (park.park_id.clone(), park))
                .collect(),
        }
    }

    /// Parses `[{"park_id": ..., "energy_type": ...}, ...]`.
    ///
    /// When the same id appears twice the later record wins.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let parks: Vec<Park> = serde_json::from_str(json)?;
        Ok(Self::from_parks(parks))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_json(&json)?;
        tracing::info!("Loaded {} parks from {}", registry.len(), path.display());
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.parks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parks.is_empty()
    }
}

#[async_trait]
impl ParkRegistry for JsonParkRegistry {
    async fn get_park(&self, park_id: &str) -> Result<Option<Park>, RegistryError> {
        Ok(self.parks.get(park_id).cloned())
    }
}
