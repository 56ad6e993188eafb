use chrono::{DateTime, Utc};
use serde::Serializer;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Output format for reading timestamps, e.g. `2022-03-11T20:18:02Z`.
pub const READING_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

fn serialize_reading_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&timestamp.format(READING_TIMESTAMP_FORMAT))
}

/// One timestamped energy measurement for a park, in MWh.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Reading {
    #[serde(serialize_with = "serialize_reading_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub energy_value: f64,
}

/// Per-park reading sequences, keyed by park id.
///
/// Each sequence keeps the order in which the engine emitted its rows.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct ParkReadings(BTreeMap<String, Vec<Reading>>);

impl ParkReadings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure `park_id` has an entry, even if no reading follows.
    pub fn ensure_park(&mut self, park_id: &str) {
        if !self.0.contains_key(park_id) {
            self.0.insert(park_id.to_string(), Vec::new());
        }
    }

    pub fn push(&mut self, park_id: &str, reading: Reading) {
        self.ensure_park(park_id);
        if let Some(readings) = self.0.get_mut(park_id) {
            readings.push(reading);
        }
    }

    /// Appends every park's readings from `other` after the ones already held.
    pub fn merge(&mut self, other: ParkReadings) {
        for (park_id, readings) in other.0 {
            self.0.entry(park_id).or_default().extend(readings);
        }
    }

    pub fn get(&self, park_id: &str) -> Option<&[Reading]> {
        self.0.get(park_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Reading>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of readings across all parks.
    pub fn reading_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl FromIterator<(String, Vec<Reading>)> for ParkReadings {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Reading>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Energy source of a park.
///
/// Parsing is an exact, case-sensitive match on the registry tags `Wind`
/// and `Solar`; serialized keys are lowercase.
#[derive(Serialize, Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum EnergyType {
    Wind,
    Solar,
}

impl EnergyType {
    pub const ALL: [EnergyType; 2] = [EnergyType::Wind, EnergyType::Solar];

    /// Lowercase key used in summaries and request parameters.
    pub fn key(&self) -> &'static str {
        match self {
            EnergyType::Wind => "wind",
            EnergyType::Solar => "solar",
        }
    }
}

impl FromStr for EnergyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Wind" => Ok(EnergyType::Wind),
            "Solar" => Ok(EnergyType::Solar),
            other => Err(format!("unknown energy type '{}'", other)),
        }
    }
}

impl fmt::Display for EnergyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EnergyType::Wind => write!(f, "Wind"),
            EnergyType::Solar => write!(f, "Solar"),
        }
    }
}

/// Units of measurement used in production summaries.
#[derive(Serialize, Debug, Clone, Copy, Eq, PartialEq)]
pub enum Unit {
    /// Megawatt-hours (MWh)
    #[serde(rename = "MWh")]
    MegawattHour,
}

/// Summed production for one energy type.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProductionTotal {
    pub production: f64,
    pub units: Unit,
}

/// Production totals keyed by energy type. Only strictly positive totals
/// are ever present.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct EnergyProductionSummary(BTreeMap<EnergyType, ProductionTotal>);

impl EnergyProductionSummary {
    pub fn insert(&mut self, energy_type: EnergyType, total: ProductionTotal) {
        self.0.insert(energy_type, total);
    }

    pub fn get(&self, energy_type: EnergyType) -> Option<&ProductionTotal> {
        self.0.get(&energy_type)
    }

    /// Drops every entry whose energy type is not in `energy_types`.
    pub fn retain_types(&mut self, energy_types: &[EnergyType]) {
        self.0.retain(|energy_type, _| energy_types.contains(energy_type));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Park metadata as held by the registry.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Park {
    pub park_id: String,
    #[serde(default)]
    pub park_name: Option<String>,
    #[serde(default)]
    pub energy_type: String,
}
