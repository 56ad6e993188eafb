//! The narrow interface the service needs from the query engine.
//!
//! Everything engine-specific (wire format, transport) sits behind
//! [`QueryEngine`]; the query handle, pagination and reshaping only
//! see the decoded types below.

use crate::error::AthenaError;
use async_trait::async_trait;

/// Name and engine type of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
}

/// Engine-reported state of a query execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStatus {
    pub state: String,
    pub reason: String,
}

impl QueryStatus {
    pub fn new(state: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            reason: reason.into(),
        }
    }
}

/// One cell of a result row; `None` is an engine NULL.
pub type Cell = Option<String>;

/// One raw response from a paginated results fetch.
///
/// On the first page `rows[0]` is the column-name row; the engine does
/// not repeat it on later pages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResults {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<Cell>>,
    pub next_token: Option<String>,
}

/// Everything the engine needs to start a query.
#[derive(Debug, Clone, PartialEq)]
pub struct StartQueryExecution<'a> {
    pub query_string: &'a str,
    pub database: &'a str,
    pub output_location: &'a str,
}

/// Client-side view of the query engine.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Submits a query and returns its execution id without waiting for it.
    async fn start_query_execution(
        &self,
        request: StartQueryExecution<'_>,
    ) -> Result<String, AthenaError>;

    /// Fetches the current state of an execution.
    async fn get_query_execution(&self, query_execution_id: &str)
        -> Result<QueryStatus, AthenaError>;

    /// Fetches one page of results, continuing from `next_token` if given.
    async fn get_query_results(
        &self,
        query_execution_id: &str,
        next_token: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<QueryResults, AthenaError>;
}
