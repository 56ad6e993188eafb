use crate::athena::engine::{QueryEngine, QueryStatus, StartQueryExecution};
use crate::athena::pagination::ResultPages;
use crate::athena::query_builder::{build_query, TimeRange};
use crate::athena::result_parsing::format_paginated_query_results;
use crate::config::AthenaConfiguration;
use crate::error::{AthenaError, Result};
use crate::model::ParkReadings;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Suspends the caller between status checks.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Entry point for running queries against the engine with one stage's settings.
pub struct Athena {
    engine: Arc<dyn QueryEngine>,
    configuration: AthenaConfiguration,
    output_location: String,
}

impl Athena {
    pub fn new(
        engine: Arc<dyn QueryEngine>,
        configuration: AthenaConfiguration,
        output_location: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            configuration,
            output_location: output_location.into(),
        }
    }

    pub fn configuration(&self) -> &AthenaConfiguration {
        &self.configuration
    }

    /// Submits `query` against `database`; returns as soon as the engine accepts it.
    ///
    /// Results are written to the configured output location with SSE-S3
    /// encryption.
    pub async fn query(&self, query: &str, database: &str) -> Result<QueryExecution<'_>, AthenaError> {
        let query_execution_id = self
            .engine
            .start_query_execution(StartQueryExecution {
                query_string: query,
                database,
                output_location: &self.output_location,
            })
            .await?;
        tracing::debug!("Started query execution {}", query_execution_id);

        Ok(QueryExecution {
            query_execution_id,
            engine: self.engine.as_ref(),
            configuration: &self.configuration,
            status: None,
        })
    }
}

/// Handle to one submitted query.
///
/// The status is re-fetched on every access until it reaches a final state;
/// from then on the cached value is returned and the engine is not asked again.
pub struct QueryExecution<'a> {
    query_execution_id: String,
    engine: &'a dyn QueryEngine,
    configuration: &'a AthenaConfiguration,
    status: Option<QueryStatus>,
}

impl<'a> QueryExecution<'a> {
    pub fn id(&self) -> &str {
        &self.query_execution_id
    }

    fn is_terminal(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|status| self.configuration.query_statuses.is_terminal(&status.state))
    }

    /// Current status, fetched from the engine unless already final.
    pub async fn status(&mut self) -> Result<QueryStatus, AthenaError> {
        if let (true, Some(status)) = (self.is_terminal(), &self.status) {
            return Ok(status.clone());
        }
        let status = self
            .engine
            .get_query_execution(&self.query_execution_id)
            .await?;
        self.status = Some(status.clone());
        Ok(status)
    }

    /// Waits until the status reaches a final state and returns it.
    ///
    /// Each round fetches the status first and only sleeps if it is not final.
    /// There is no timeout: an execution that never finishes is waited on forever.
    pub async fn poll_for_status(&mut self, sleeper: &dyn Sleeper) -> Result<QueryStatus, AthenaError> {
        let interval = self.configuration.poll_interval();
        loop {
            let status = self.status().await?;
            if self.configuration.query_statuses.is_terminal(&status.state) {
                tracing::info!(
                    "Query status {} Reason: {}",
                    status.state,
                    status.reason
                );
                return Ok(status);
            }
            tracing::info!(
                "Waiting for query execution to complete, sleep for {}",
                self.configuration.query_status_poll_interval_seconds
            );
            sleeper.sleep(interval).await;
        }
    }

    /// Pages through the results, `max_results` rows at a time (engine default if `None`).
    pub fn result_pages(&self, max_results: Option<u32>) -> ResultPages<'_> {
        ResultPages::new(self.engine, &self.query_execution_id, max_results)
    }

    /// Fetches every page and reshapes the rows into per-park readings.
    pub async fn collect_readings(&self, max_results: Option<u32>) -> Result<ParkReadings> {
        format_paginated_query_results(self.result_pages(max_results)).await
    }
}

/// Builds the readings query for `park_ids`, submits it and waits for it to finish.
///
/// Fails with [`AthenaError::QueryFailed`] if the final state is in the
/// configured failed set; no results should be fetched in that case.
pub async fn get_athena_query<'a, S: AsRef<str>>(
    athena: &'a Athena,
    park_ids: &[S],
    range: &TimeRange,
    sleeper: &dyn Sleeper,
) -> Result<QueryExecution<'a>, AthenaError> {
    let query = build_query(park_ids, range);
    tracing::debug!("Query: {}", query);

    let mut execution = athena.query(&query, &athena.configuration.database).await?;
    let status = execution.poll_for_status(sleeper).await?;

    if athena.configuration.query_statuses.is_failed(&status.state) {
        tracing::error!(
            "Query Failed! Status {} Reason: {}",
            status.state,
            status.reason
        );
        return Err(AthenaError::query_failed(
            execution.id(),
            status.state,
            status.reason,
        ));
    }

    Ok(execution)
}
