//! Token-driven pagination over a finished query's results.
//!
//! The engine hands back an opaque continuation token with each page; a
//! missing token means the result set is exhausted. The column-name row
//! only appears at the top of the first page.

use crate::athena::engine::{Cell, ColumnInfo, QueryEngine};
use crate::error::AthenaError;
use futures::stream::{self, Stream};

/// Data rows of one page together with the shared result header.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Cursor {
    Start,
    Next(String),
    Exhausted,
}

/// Lazy, single-pass sequence of result pages.
///
/// Pages are requested strictly one after another, and never again once
/// the engine stops returning a continuation token.
pub struct ResultPages<'a> {
    engine: &'a dyn QueryEngine,
    query_execution_id: &'a str,
    max_results: Option<u32>,
    cursor: Cursor,
    columns: Vec<ColumnInfo>,
}

impl<'a> ResultPages<'a> {
    pub fn new(
        engine: &'a dyn QueryEngine,
        query_execution_id: &'a str,
        max_results: Option<u32>,
    ) -> Self {
        Self {
            engine,
            query_execution_id,
            max_results,
            cursor: Cursor::Start,
            columns: Vec::new(),
        }
    }

    /// Fetches the next page, or `None` once the results are exhausted.
    pub async fn next_page(&mut self) -> Result<Option<ResultPage>, AthenaError> {
        let next_token = match &self.cursor {
            Cursor::Exhausted => return Ok(None),
            Cursor::Start => None,
            Cursor::Next(token) => Some(token.clone()),
        };
        let is_first_page = self.cursor == Cursor::Start;

        let results = self
            .engine
            .get_query_results(self.query_execution_id, next_token.as_deref(), self.max_results)
            .await?;

        self.cursor = match results.next_token {
            Some(token) => Cursor::Next(token),
            None => Cursor::Exhausted,
        };

        let mut rows = results.rows;
        if is_first_page {
            self.columns = results.columns;
            if !rows.is_empty() {
                // header row: column names repeated as data
                rows.remove(0);
            }
        }

        Ok(Some(ResultPage {
            columns: self.columns.clone(),
            rows,
        }))
    }

    /// Turns the remaining pages into a stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<ResultPage, AthenaError>> + 'a {
        stream::try_unfold(self, |mut pages| async move {
            let page = pages.next_page().await?;
            Ok::<_, AthenaError>(page.map(|page| (page, pages)))
        })
    }
}
