//! In-memory query engine and sleeper for driving the query pipeline.

use crate::athena::engine::{QueryEngine, QueryResults, QueryStatus, StartQueryExecution};
use crate::athena::Sleeper;
use crate::error::AthenaError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

fn not_found(message: impl Into<String>) -> AthenaError {
    AthenaError::ServerError {
        status: 400,
        message: message.into(),
    }
}

/// A query engine that replays scripted statuses and result pages.
///
/// Each status call consumes the next scripted status; once they run out
/// the call fails. Result pages are chained by their continuation tokens:
/// no token returns the first page, token `t` returns the page after the
/// one that handed out `t`.
pub struct MockQueryEngine {
    query_execution_id: String,
    statuses: Mutex<VecDeque<QueryStatus>>,
    pages: Vec<QueryResults>,
    status_calls: AtomicUsize,
    submitted: Mutex<Vec<(String, String, String)>>,
    result_requests: Mutex<Vec<(Option<String>, Option<u32>)>>,
}

impl MockQueryEngine {
    pub fn new() -> Self {
        Self {
            query_execution_id: "q-1".to_string(),
            statuses: Mutex::new(VecDeque::new()),
            pages: Vec::new(),
            status_calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
            result_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_query_execution_id(mut self, id: impl Into<String>) -> Self {
        self.query_execution_id = id.into();
        self
    }

    pub fn with_statuses(self, statuses: Vec<QueryStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn with_pages(mut self, pages: Vec<QueryResults>) -> Self {
        self.pages = pages;
        self
    }

    /// Number of status fetches so far.
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// `(query_string, database, output_location)` of every submitted query.
    pub fn submitted(&self) -> Vec<(String, String, String)> {
        self.submitted.lock().unwrap().clone()
    }

    /// `(next_token, max_results)` of every results request, in order.
    pub fn result_requests(&self) -> Vec<(Option<String>, Option<u32>)> {
        self.result_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryEngine for MockQueryEngine {
    async fn start_query_execution(
        &self,
        request: StartQueryExecution<'_>,
    ) -> Result<String, AthenaError> {
        self.submitted.lock().unwrap().push((
            request.query_string.to_string(),
            request.database.to_string(),
            request.output_location.to_string(),
        ));
        Ok(self.query_execution_id.clone())
    }

    async fn get_query_execution(
        &self,
        query_execution_id: &str,
    ) -> Result<QueryStatus, AthenaError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| not_found(format!("no status scripted for {}", query_execution_id)))
    }

    async fn get_query_results(
        &self,
        _query_execution_id: &str,
        next_token: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<QueryResults, AthenaError> {
        self.result_requests
            .lock()
            .unwrap()
            .push((next_token.map(str::to_string), max_results));

        let index = match next_token {
            None => 0,
            Some(token) => {
                self.pages
                    .iter()
                    .position(|page| page.next_token.as_deref() == Some(token))
                    .ok_or_else(|| not_found(format!("unknown token {}", token)))?
                    + 1
            }
        };
        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| not_found(format!("no page at {}", index)))
    }
}

/// A sleeper that records requested durations and returns at once.
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self {
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
