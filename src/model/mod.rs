//! Domain types for park readings and production summaries.
//!
//! Readings come out of the result reshaper; summaries come out of the
//! production aggregator. Both serialize straight into response bodies.

pub mod traits;
pub mod types;

pub use traits::ParkRegistry;
pub use types::{
    EnergyProductionSummary, EnergyType, Park, ParkReadings, ProductionTotal, Reading, Unit,
};
