//! Query string builder for pivoted multi-park reading queries.
//!
//! Each park's table is aliased by its position (`p0`, `p1`, ...) and
//! contributes a `park_id` literal plus a `timestamp{i}`/`energy_value{i}`
//! column pair to a single wide result row.

use crate::error::RequestError;
use chrono::{DateTime, Utc};

/// Naive timestamp format the engine compares against, always rendered in UTC.
const QUERY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Closed UTC interval `[start, end]` for a readings query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a range from epoch milliseconds.
    ///
    /// Fails if either bound is outside chrono's range or `end` precedes `start`.
    pub fn from_millis(start: i64, end: i64) -> Result<Self, RequestError> {
        let invalid = || RequestError::InvalidTimeRange { start, end };
        let start_dt = DateTime::<Utc>::from_timestamp_millis(start).ok_or_else(invalid)?;
        let end_dt = DateTime::<Utc>::from_timestamp_millis(end).ok_or_else(invalid)?;
        if end_dt < start_dt {
            return Err(invalid());
        }
        Ok(Self {
            start: start_dt,
            end: end_dt,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Builds the pivoted readings query for `park_ids` over `range`.
///
/// `park_ids` must be non-empty and already validated as table names;
/// both are the caller's responsibility.
///
/// # Format
/// ```text
/// SELECT 'park1' AS park_id, p0.timestamp AS timestamp0, p0.energy_value AS energy_value0, ...
/// FROM park1 AS p0,park2 AS p1
/// WHERE CAST(p0.timestamp AS timestamp) >= CAST('<start>' AS timestamp) AND ... <= ...
/// ORDER BY timestamp0, timestamp1 ASC
/// ```
/// (emitted on a single line)
pub fn build_query<S: AsRef<str>>(park_ids: &[S], range: &TimeRange) -> String {
    let start = range.start.format(QUERY_TIMESTAMP_FORMAT).to_string();
    let end = range.end.format(QUERY_TIMESTAMP_FORMAT).to_string();

    let select_columns = park_ids
        .iter()
        .enumerate()
        .map(|(i, park_id)| {
            format!(
                "'{park}' AS park_id, p{i}.timestamp AS timestamp{i}, p{i}.energy_value AS energy_value{i}",
                park = park_id.as_ref(),
                i = i
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let tables = park_ids
        .iter()
        .enumerate()
        .map(|(i, park_id)| format!("{} AS p{}", park_id.as_ref(), i))
        .collect::<Vec<_>>()
        .join(",");

    let where_clauses = (0..park_ids.len())
        .map(|i| {
            format!(
                "CAST(p{i}.timestamp AS timestamp) >= CAST('{start}' AS timestamp) AND CAST(p{i}.timestamp AS timestamp) <= CAST('{end}' AS timestamp)",
                i = i,
                start = start,
                end = end
            )
        })
        .collect::<Vec<_>>()
        .join(" AND ");

    let order_by_columns = (0..park_ids.len())
        .map(|i| format!("timestamp{}", i))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {} ASC",
        select_columns, tables, where_clauses, order_by_columns
    )
}
