//! Reshaping of pivoted result rows into per-park reading sequences.
//!
//! A result row carries several parks side by side. Cells are read left to
//! right: a `park_id` cell selects the park that the following `timestamp*`
//! and `energy_value*` cells belong to, so column order is significant.

use crate::athena::client::ResultSetMetadata;
use crate::athena::engine::{Cell, ColumnInfo};
use crate::athena::pagination::ResultPages;
use crate::error::{Error, ParseError, Result};
use crate::model::{ParkReadings, Reading};
use chrono::{NaiveDateTime, Timelike};
use futures::TryStreamExt;

const PARK_ID_COLUMN: &str = "park_id";
const TIMESTAMP_COLUMN_PREFIX: &str = "timestamp";
const ENERGY_VALUE_COLUMN_PREFIX: &str = "energy_value";

/// Engine timestamp cell format; the fractional part is optional.
const ENGINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Maps the engine's column metadata to `(name, type)` pairs.
pub fn parse_query_result_metadata(metadata: &ResultSetMetadata) -> Vec<ColumnInfo> {
    metadata
        .column_info
        .iter()
        .map(|column| ColumnInfo::new(column.name.clone(), column.column_type.clone()))
        .collect()
}

/// A reading whose energy value cell has not been seen yet.
#[derive(Debug)]
struct PendingReading {
    park_id: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    energy_value: Option<f64>,
}

/// Which park subsequent reading cells belong to.
#[derive(Debug)]
enum RowState {
    AwaitingPark,
    HavePark(String),
}

#[derive(Debug)]
struct RowFold {
    state: RowState,
    pending: Vec<PendingReading>,
    parks: Vec<String>,
}

impl RowFold {
    fn new() -> Self {
        Self {
            state: RowState::AwaitingPark,
            pending: Vec::new(),
            parks: Vec::new(),
        }
    }

    fn current_park(&self, column: &str) -> Result<&str, ParseError> {
        match &self.state {
            RowState::HavePark(park_id) => Ok(park_id),
            RowState::AwaitingPark => Err(ParseError::missing_park_id(column)),
        }
    }

    fn step(mut self, column: &ColumnInfo, cell: &Cell) -> Result<Self, ParseError> {
        let name = column.name.as_str();
        if name == PARK_ID_COLUMN {
            let park_id = non_null(name, cell)?.to_string();
            if !self.parks.contains(&park_id) {
                self.parks.push(park_id.clone());
            }
            self.state = RowState::HavePark(park_id);
        } else if name.starts_with(TIMESTAMP_COLUMN_PREFIX) {
            let park_id = self.current_park(name)?.to_string();
            let timestamp = parse_engine_timestamp(non_null(name, cell)?)?;
            self.pending.push(PendingReading {
                park_id,
                timestamp,
                energy_value: None,
            });
        } else if name.starts_with(ENERGY_VALUE_COLUMN_PREFIX) {
            let park_id = self.current_park(name)?.to_string();
            let text = non_null(name, cell)?;
            let energy_value = text
                .parse::<f64>()
                .map_err(|e| ParseError::number_parse(text, e))?;
            let reading = self
                .pending
                .iter_mut()
                .rev()
                .find(|reading| reading.park_id == park_id)
                .ok_or_else(|| ParseError::incomplete_reading(&park_id))?;
            reading.energy_value = Some(energy_value);
        }
        Ok(self)
    }

    fn finish(self) -> Result<ParkReadings, ParseError> {
        let mut readings = ParkReadings::new();
        for park_id in &self.parks {
            readings.ensure_park(park_id);
        }
        for pending in self.pending {
            let energy_value = pending
                .energy_value
                .ok_or_else(|| ParseError::incomplete_reading(&pending.park_id))?;
            readings.push(
                &pending.park_id,
                Reading {
                    timestamp: pending.timestamp,
                    energy_value,
                },
            );
        }
        Ok(readings)
    }
}

fn non_null<'a>(column: &str, cell: &'a Cell) -> Result<&'a str, ParseError> {
    cell.as_deref().ok_or_else(|| ParseError::null_cell(column))
}

/// Parses an engine timestamp cell as UTC, truncated to whole seconds.
fn parse_engine_timestamp(text: &str) -> Result<chrono::DateTime<chrono::Utc>, ParseError> {
    let naive = NaiveDateTime::parse_from_str(text, ENGINE_TIMESTAMP_FORMAT)
        .map_err(|e| ParseError::datetime_parse(text, e))?;
    let naive = naive
        .with_nanosecond(0)
        .ok_or_else(|| ParseError::datetime_parse(text, "cannot truncate to seconds"))?;
    Ok(naive.and_utc())
}

/// Reshapes one pivoted row into readings grouped by park.
///
/// Cells are folded in column order. A `timestamp*` cell opens a reading for
/// the current park, and the next `energy_value*` cell for that park
/// completes it. Columns matching neither pattern are ignored.
///
/// # Errors
/// - a reading cell before any `park_id` cell
/// - a NULL `park_id`, `timestamp*` or `energy_value*` cell
/// - a malformed timestamp or number
/// - a reading left without its energy value at the end of the row
pub fn parse_query_result_row(row: &[Cell], columns: &[ColumnInfo]) -> Result<ParkReadings, ParseError> {
    if row.len() != columns.len() {
        return Err(ParseError::ColumnCountMismatch {
            expected: columns.len(),
            actual: row.len(),
        });
    }

    columns
        .iter()
        .zip(row)
        .try_fold(RowFold::new(), |fold, (column, cell)| fold.step(column, cell))?
        .finish()
}

/// Drains `pages` and merges every row's readings in fetch order.
pub async fn format_paginated_query_results(pages: ResultPages<'_>) -> Result<ParkReadings> {
    pages
        .into_stream()
        .err_into::<Error>()
        .try_fold(ParkReadings::new(), |mut readings, page| async move {
            tracing::info!("Fetching another {} results", page.rows.len());
            for row in &page.rows {
                readings.merge(parse_query_result_row(row, &page.columns)?);
            }
            Ok::<_, Error>(readings)
        })
        .await
}
