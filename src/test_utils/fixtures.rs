//! Test fixtures and common test data.

use crate::athena::engine::{Cell, ColumnInfo, QueryResults};
use crate::handler::{ApiRequest, ParamValue};
use crate::model::Reading;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A result row where every cell has a value.
pub fn cells(values: &[&str]) -> Vec<Cell> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

/// Result header of `varchar` columns.
pub fn columns(names: &[&str]) -> Vec<ColumnInfo> {
    names
        .iter()
        .map(|name| ColumnInfo::new(*name, "varchar"))
        .collect()
}

/// A reading at an RFC 3339 instant, e.g. `2022-03-11T20:18:02Z`.
pub fn reading(timestamp: &str, energy_value: f64) -> Reading {
    Reading {
        timestamp: DateTime::parse_from_rfc3339(timestamp)
            .unwrap()
            .with_timezone(&Utc),
        energy_value,
    }
}

/// One raw results response as the engine would return it.
pub fn results_page(
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Cell>>,
    next_token: Option<&str>,
) -> QueryResults {
    QueryResults {
        columns,
        rows,
        next_token: next_token.map(str::to_string),
    }
}

/// Gateway request carrying only single-value query parameters.
pub fn api_request(params: &[(&str, &str)]) -> ApiRequest {
    let query_string_parameters: HashMap<String, ParamValue> = params
        .iter()
        .map(|(k, v)| (k.to_string(), ParamValue::from(*v)))
        .collect();
    ApiRequest {
        query_string_parameters: Some(query_string_parameters),
        multi_value_query_string_parameters: None,
    }
}
