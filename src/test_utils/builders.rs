//! Builders for engine wire payloads used by HTTP-level tests.

use serde_json::{json, Value};

/// Builds a `GetQueryResults` response body.
#[derive(Debug, Default)]
pub struct QueryResultsJsonBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    next_token: Option<String>,
}

impl QueryResultsJsonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the column metadata and adds the matching header row, as the
    /// engine does on a first page.
    pub fn with_header(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self.rows
            .push(columns.iter().map(|c| Some(c.to_string())).collect());
        self
    }

    pub fn add_row(mut self, cells: &[&str]) -> Self {
        self.rows
            .push(cells.iter().map(|c| Some(c.to_string())).collect());
        self
    }

    /// Adds a row where `None` cells are NULL.
    pub fn add_row_with_nulls(mut self, cells: &[Option<&str>]) -> Self {
        self.rows
            .push(cells.iter().map(|c| c.map(str::to_string)).collect());
        self
    }

    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    pub fn build(self) -> Value {
        let rows: Vec<Value> = self
            .rows
            .into_iter()
            .map(|row| {
                let data: Vec<Value> = row
                    .into_iter()
                    .map(|cell| match cell {
                        Some(value) => json!({ "VarCharValue": value }),
                        None => json!({}),
                    })
                    .collect();
                json!({ "Data": data })
            })
            .collect();
        let column_info: Vec<Value> = self
            .columns
            .iter()
            .map(|name| json!({ "Name": name, "Type": "varchar" }))
            .collect();

        let mut body = json!({
            "ResultSet": {
                "Rows": rows,
                "ResultSetMetadata": { "ColumnInfo": column_info }
            }
        });
        if let Some(token) = self.next_token {
            body["NextToken"] = json!(token);
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_results_json_builder() {
        let body = QueryResultsJsonBuilder::new()
            .with_header(&["park_id", "timestamp0"])
            .add_row_with_nulls(&[Some("park1"), None])
            .with_next_token("t1")
            .build();

        assert_eq!(
            body,
            json!({
                "ResultSet": {
                    "Rows": [
                        {"Data": [{"VarCharValue": "park_id"}, {"VarCharValue": "timestamp0"}]},
                        {"Data": [{"VarCharValue": "park1"}, {}]}
                    ],
                    "ResultSetMetadata": {"ColumnInfo": [
                        {"Name": "park_id", "Type": "varchar"},
                        {"Name": "timestamp0", "Type": "varchar"}
                    ]}
                },
                "NextToken": "t1"
            })
        );
    }
}
