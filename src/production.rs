//! Per-energy-type production totals.

use crate::error::RegistryError;
use crate::model::{
    EnergyProductionSummary, EnergyType, ParkReadings, ParkRegistry, ProductionTotal, Unit,
};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Sums every park's readings into its energy type's bucket.
///
/// A park the registry does not know, or whose type tag is not exactly
/// `Wind` or `Solar`, contributes nothing. Only strictly positive totals are
/// returned, so a type with no data and a type that produced zero look the same.
pub async fn aggregate_production(
    readings: &ParkReadings,
    registry: &dyn ParkRegistry,
) -> Result<EnergyProductionSummary, RegistryError> {
    let mut totals: BTreeMap<EnergyType, f64> = BTreeMap::new();

    for (park_id, park_readings) in readings.iter() {
        let park = match registry.get_park(park_id).await? {
            Some(park) => park,
            None => {
                tracing::debug!("Park {} not found in registry, skipping", park_id);
                continue;
            }
        };
        let energy_type = match EnergyType::from_str(&park.energy_type) {
            Ok(energy_type) => energy_type,
            Err(e) => {
                tracing::debug!("Skipping park {}: {}", park_id, e);
                continue;
            }
        };

        let sum: f64 = park_readings.iter().map(|r| r.energy_value).sum();
        tracing::debug!("Park {} adds {} MWh of {} production", park_id, sum, energy_type);
        *totals.entry(energy_type).or_insert(0.0) += sum;
    }

    let mut summary = EnergyProductionSummary::default();
    for (energy_type, production) in totals {
        if production > 0.0 {
            summary.insert(
                energy_type,
                ProductionTotal {
                    production,
                    units: Unit::MegawattHour,
                },
            );
        }
    }
    Ok(summary)
}
