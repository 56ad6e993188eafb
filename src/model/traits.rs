use crate::error::RegistryError;
use async_trait::async_trait;

use super::types::Park;

/// Trait for looking up park metadata by park id.
///
/// The aggregation step only needs a park's energy type, but implementors
/// return the whole record so other callers can use the rest of it.
#[async_trait]
pub trait ParkRegistry: Send + Sync {
    /// Fetches the park with the given id.
    ///
    /// # Returns
    /// - `Ok(Some(Park))` if the registry knows the park
    /// - `Ok(None)` if it does not
    /// - `Err` if the registry itself could not be consulted
    async fn get_park(&self, park_id: &str) -> Result<Option<Park>, RegistryError>;
}
