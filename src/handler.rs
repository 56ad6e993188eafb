//! API-gateway style request handlers.
//!
//! Both handlers validate the query parameters, run the readings query and
//! wrap the outcome into a JSON response. Caller mistakes become 400 with a
//! fixed message; anything that goes wrong after validation becomes 500.

use crate::athena::{get_athena_query, Athena, Sleeper, TimeRange};
use crate::error::{RequestError, Result};
use crate::model::{EnergyType, ParkReadings, ParkRegistry};
use crate::production::aggregate_production;
use serde_derive::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Which handler the binary dispatches inbound events to.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    GetEnergyProduction,
    AggregateEnergyProduction,
}

/// A query parameter given either as one string or as a list of strings.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    fn as_strs(&self) -> Vec<&str> {
        match self {
            ParamValue::One(value) => vec![value.as_str()],
            ParamValue::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::One(value.to_string())
    }
}

/// Inbound event. Only the query parameters are read.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, ParamValue>>,
    #[serde(default)]
    pub multi_value_query_string_parameters: Option<HashMap<String, Vec<String>>>,
}

impl ApiRequest {
    /// Raw values of `name`; the multi-value form wins when both are present.
    fn values(&self, name: &str) -> Vec<&str> {
        let multi = self
            .multi_value_query_string_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .filter(|values| !values.is_empty());
        if let Some(values) = multi {
            return values.iter().map(String::as_str).collect();
        }
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(ParamValue::as_strs)
            .unwrap_or_default()
    }

    /// Comma-separated (or repeated) parameter, trimmed, blanks dropped.
    fn list(&self, name: &str) -> Vec<String> {
        self.values(name)
            .into_iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn single(&self, name: &str) -> Option<&str> {
        self.values(name)
            .into_iter()
            .last()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Outbound response in the shape the gateway expects.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    fn with_body(status_code: u16, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body,
        }
    }

    /// Serializes `body` as the JSON response body.
    pub fn json<T: serde::Serialize + ?Sized>(status_code: u16, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self::with_body(status_code, body),
            Err(e) => {
                tracing::error!("Failed to serialize response body: {:?}", e);
                Self::message(500, INTERNAL_ERROR_MESSAGE)
            }
        }
    }

    /// `{"message": ...}` response.
    pub fn message(status_code: u16, message: impl fmt::Display) -> Self {
        let body = serde_json::json!({ "message": message.to_string() });
        Self::with_body(status_code, body.to_string())
    }
}

fn bad_request(err: RequestError) -> ApiResponse {
    tracing::info!("Rejecting request: {}", err);
    ApiResponse::message(400, err)
}

fn internal_error(context: &str, err: crate::error::Error) -> ApiResponse {
    tracing::error!("{}: {:?}", context, err);
    ApiResponse::message(500, INTERNAL_ERROR_MESSAGE)
}

/// Validated parameters shared by both handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionParams {
    pub park_ids: Vec<String>,
    pub range: TimeRange,
}

fn is_valid_park_id(park_id: &str) -> bool {
    park_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_timestamp(
    request: &ApiRequest,
    field: &'static str,
    missing: RequestError,
) -> Result<i64, RequestError> {
    let value = request.single(field).ok_or(missing)?;
    value
        .parse::<i64>()
        .map_err(|_| RequestError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

impl ProductionParams {
    /// Checks `park_ids`, `start_timestamp` and `end_timestamp`, in that order.
    ///
    /// Park ids become table names in the query text, so anything outside
    /// `[A-Za-z0-9_]` is rejected.
    pub fn from_request(request: &ApiRequest) -> Result<Self, RequestError> {
        let park_ids = request.list("park_ids");
        if park_ids.is_empty() {
            return Err(RequestError::MissingParkIds);
        }
        if let Some(invalid) = park_ids.iter().find(|id| !is_valid_park_id(id)) {
            return Err(RequestError::InvalidParkId(invalid.clone()));
        }

        let start = parse_timestamp(
            request,
            "start_timestamp",
            RequestError::MissingStartTimestamp,
        )?;
        let end = parse_timestamp(request, "end_timestamp", RequestError::MissingEndTimestamp)?;
        let range = TimeRange::from_millis(start, end)?;

        Ok(Self { park_ids, range })
    }
}

/// Reads `energy_types` as lowercase keys (`wind`, `solar`), case-insensitively.
///
/// Unrecognised keys are ignored, but at least one must be recognised.
pub fn parse_energy_types(request: &ApiRequest) -> Result<Vec<EnergyType>, RequestError> {
    let requested = request.list("energy_types");
    if requested.is_empty() {
        return Err(RequestError::MissingEnergyTypes);
    }

    let mut energy_types: Vec<EnergyType> = Vec::new();
    for name in &requested {
        match EnergyType::ALL
            .iter()
            .find(|energy_type| energy_type.key().eq_ignore_ascii_case(name))
        {
            Some(energy_type) if !energy_types.contains(energy_type) => {
                energy_types.push(*energy_type)
            }
            Some(_) => {}
            None => tracing::debug!("Ignoring unknown energy type {}", name),
        }
    }

    if energy_types.is_empty() {
        return Err(RequestError::InvalidEnergyTypes(requested.join(",")));
    }
    Ok(energy_types)
}

/// Serves both handlers over one query engine facade and park registry.
pub struct EnergyProductionService {
    athena: Athena,
    parks: Arc<dyn ParkRegistry>,
    sleeper: Arc<dyn Sleeper>,
}

impl EnergyProductionService {
    pub fn new(athena: Athena, parks: Arc<dyn ParkRegistry>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            athena,
            parks,
            sleeper,
        }
    }

    pub async fn handle(&self, kind: HandlerKind, request: &ApiRequest) -> ApiResponse {
        tracing::debug!("Dispatching request to {:?}", kind);
        match kind {
            HandlerKind::GetEnergyProduction => self.get_energy_production(request).await,
            HandlerKind::AggregateEnergyProduction => {
                self.aggregate_energy_production(request).await
            }
        }
    }

    /// Per-park readings for `park_ids` between the two timestamps.
    pub async fn get_energy_production(&self, request: &ApiRequest) -> ApiResponse {
        let params = match ProductionParams::from_request(request) {
            Ok(params) => params,
            Err(e) => return bad_request(e),
        };

        match self.fetch_readings(&params).await {
            Ok(readings) => {
                tracing::info!(
                    "Sending energy data: {} readings for {} parks",
                    readings.reading_count(),
                    readings.len()
                );
                ApiResponse::json(200, &readings)
            }
            Err(e) => internal_error("Failed to fetch energy production", e),
        }
    }

    /// Production totals per requested energy type over the same query.
    pub async fn aggregate_energy_production(&self, request: &ApiRequest) -> ApiResponse {
        let params = match ProductionParams::from_request(request) {
            Ok(params) => params,
            Err(e) => return bad_request(e),
        };
        let energy_types = match parse_energy_types(request) {
            Ok(energy_types) => energy_types,
            Err(e) => return bad_request(e),
        };

        let readings = match self.fetch_readings(&params).await {
            Ok(readings) => readings,
            Err(e) => return internal_error("Failed to fetch energy production", e),
        };
        let mut summary = match aggregate_production(&readings, self.parks.as_ref()).await {
            Ok(summary) => summary,
            Err(e) => return internal_error("Failed to aggregate energy production", e.into()),
        };
        summary.retain_types(&energy_types);

        tracing::info!("Production output energy: {:?}", summary);
        ApiResponse::json(200, &summary)
    }

    async fn fetch_readings(&self, params: &ProductionParams) -> Result<ParkReadings> {
        tracing::info!(
            "Querying {} parks from {} to {}",
            params.park_ids.len(),
            params.range.start(),
            params.range.end()
        );
        let execution = get_athena_query(
            &self.athena,
            &params.park_ids,
            &params.range,
            self.sleeper.as_ref(),
        )
        .await?;
        execution
            .collect_readings(self.athena.configuration().max_results)
            .await
    }
}
