//! Error types for the park energy-production service.
//!
//! Each component gets its own typed error so handlers can tell a rejected
//! request apart from a failed query or malformed engine output.

use thiserror::Error;

/// Result type alias using our custom error types.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type that encompasses all service errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Query engine communication errors
    #[error("query engine error")]
    Athena(#[from] AthenaError),

    /// Result set reshaping errors
    #[error("result parsing error")]
    Parse(#[from] ParseError),

    /// Park metadata lookup errors
    #[error("park registry error")]
    Registry(#[from] RegistryError),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable parsing failed
    #[error("failed to parse environment variables: {0}")]
    EnvParse(String),

    /// Required configuration value is missing
    #[error("missing required configuration: {0}")]
    Missing(String),

    /// Configuration value is invalid
    #[error("invalid configuration value for {field}: {message}")]
    Invalid { field: String, message: String },

    /// Parameter store lookup failed
    #[error("failed to read parameter '{name}': {message}")]
    Parameter { name: String, message: String },
}

/// Query engine communication errors.
#[derive(Error, Debug)]
pub enum AthenaError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Engine returned an error status
    #[error("server error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Query reached a terminal state in the configured failed set
    #[error("query {query_execution_id} finished with status {state}: {reason}")]
    QueryFailed {
        query_execution_id: String,
        state: String,
        reason: String,
    },
}

/// Errors raised while reshaping pivoted result rows.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A timestamp or energy value cell appeared before any park_id cell
    #[error("column '{column}' appeared before any park_id column")]
    MissingParkId { column: String },

    /// A cell the reshaper depends on was NULL
    #[error("column '{column}' has no value")]
    NullCell { column: String },

    /// Failed to parse a timestamp cell
    #[error("failed to parse date/time from '{text}': {message}")]
    DateTimeParse { text: String, message: String },

    /// Failed to parse an energy value cell
    #[error("failed to parse number from '{text}': {message}")]
    NumberParse { text: String, message: String },

    /// A reading was left without its timestamp or energy value
    #[error("incomplete reading for park '{park_id}'")]
    IncompleteReading { park_id: String },

    /// Row width differs from the result header
    #[error("row has {actual} cells but the header has {expected} columns")]
    ColumnCountMismatch { expected: usize, actual: usize },
}

/// Park metadata lookup errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Registry source could not be read
    #[error("failed to read park registry at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Registry source is not valid park JSON
    #[error("failed to decode park registry: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Caller mistakes in an inbound request. These map to a 400 response.
#[derive(Error, Debug, PartialEq)]
pub enum RequestError {
    #[error("No Park Ids provided")]
    MissingParkIds,

    #[error("No start timestamp provided")]
    MissingStartTimestamp,

    #[error("No end timestamp provided")]
    MissingEndTimestamp,

    #[error("No energy types provided")]
    MissingEnergyTypes,

    #[error("Invalid park id: {0}")]
    InvalidParkId(String),

    #[error("Invalid {field}: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("Invalid time range: {start} to {end}")]
    InvalidTimeRange { start: i64, end: i64 },

    #[error("Invalid energy types: {0}")]
    InvalidEnergyTypes(String),
}

impl ConfigError {
    /// Creates a new environment parse error.
    pub fn env_parse(err: impl std::fmt::Display) -> Self {
        Self::EnvParse(err.to_string())
    }

    /// Creates a new missing configuration error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }

    /// Creates a new invalid configuration error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new parameter lookup error.
    pub fn parameter(name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Parameter {
            name: name.into(),
            message: err.to_string(),
        }
    }
}

impl AthenaError {
    /// Creates a server error from HTTP status and response body.
    pub fn server_error(status: reqwest::StatusCode, body: String) -> Self {
        Self::ServerError {
            status: status.as_u16(),
            message: body,
        }
    }

    /// Creates a failed query error.
    pub fn query_failed(
        query_execution_id: impl Into<String>,
        state: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::QueryFailed {
            query_execution_id: query_execution_id.into(),
            state: state.into(),
            reason: reason.into(),
        }
    }
}

impl ParseError {
    /// Creates a missing park id error.
    pub fn missing_park_id(column: impl Into<String>) -> Self {
        Self::MissingParkId {
            column: column.into(),
        }
    }

    /// Creates a null cell error.
    pub fn null_cell(column: impl Into<String>) -> Self {
        Self::NullCell {
            column: column.into(),
        }
    }

    /// Creates a number parse error.
    pub fn number_parse(text: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::NumberParse {
            text: text.into(),
            message: err.to_string(),
        }
    }

    /// Creates a datetime parse error.
    pub fn datetime_parse(text: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::DateTimeParse {
            text: text.into(),
            message: err.to_string(),
        }
    }

    /// Creates an incomplete reading error.
    pub fn incomplete_reading(park_id: impl Into<String>) -> Self {
        Self::IncompleteReading {
            park_id: park_id.into(),
        }
    }
}
