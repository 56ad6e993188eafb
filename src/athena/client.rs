use crate::athena::engine::{QueryEngine, QueryResults, QueryStatus, StartQueryExecution};
use crate::athena::result_parsing::parse_query_result_metadata;
use crate::config::AthenaClientConfig;
use crate::error::AthenaError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client as HttpClient;
use serde_derive::{Deserialize, Serialize};

const TARGET_PREFIX: &str = "AmazonAthena";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const ENCRYPTION_OPTION: &str = "SSE_S3";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct StartQueryExecutionInput<'a> {
    query_string: &'a str,
    query_execution_context: QueryExecutionContext<'a>,
    result_configuration: ResultConfiguration<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct QueryExecutionContext<'a> {
    database: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ResultConfiguration<'a> {
    output_location: &'a str,
    encryption_configuration: EncryptionConfiguration,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EncryptionConfiguration {
    encryption_option: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StartQueryExecutionOutput {
    query_execution_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetQueryExecutionInput<'a> {
    query_execution_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetQueryExecutionOutput {
    query_execution: QueryExecution,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QueryExecution {
    status: Status,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Status {
    state: String,
    #[serde(default)]
    state_change_reason: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetQueryResultsInput<'a> {
    query_execution_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_results: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetQueryResultsOutput {
    result_set: ResultSet,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResultSet {
    #[serde(default)]
    rows: Vec<Row>,
    #[serde(default)]
    result_set_metadata: ResultSetMetadata,
}

/// Column metadata block of a results response.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ResultSetMetadata {
    #[serde(default)]
    pub column_info: Vec<WireColumnInfo>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct WireColumnInfo {
    pub name: String,
    #[serde(rename = "Type")]
    pub column_type: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Row {
    #[serde(default)]
    data: Vec<Datum>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Datum {
    #[serde(default)]
    var_char_value: Option<String>,
}

/// Query engine client speaking the Athena JSON 1.1 protocol over HTTP.
///
/// Requests are unsigned; `endpoint` must be a gateway that handles
/// authentication on the service's behalf.
pub struct Client {
    http_client: HttpClient,
    config: AthenaClientConfig,
}

impl Client {
    pub fn new(config: AthenaClientConfig) -> Self {
        let http_client = HttpClient::new();
        Self {
            http_client,
            config,
        }
    }

    async fn call<I, O>(&self, operation: &str, input: &I) -> Result<O, AthenaError>
    where
        I: serde::Serialize + Sync + ?Sized,
        O: serde::de::DeserializeOwned,
    {
        tracing::debug!("Calling {}.{}", TARGET_PREFIX, operation);
        let response = self
            .http_client
            .post(&self.config.endpoint)
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, operation))
            .header(CONTENT_TYPE, AMZ_JSON)
            .json(input)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json::<O>().await?)
        } else {
            let body = response.text().await?;
            Err(AthenaError::server_error(status, body))
        }
    }
}

#[async_trait]
impl QueryEngine for Client {
    async fn start_query_execution(
        &self,
        request: StartQueryExecution<'_>,
    ) -> Result<String, AthenaError> {
        let input = StartQueryExecutionInput {
            query_string: request.query_string,
            query_execution_context: QueryExecutionContext {
                database: request.database,
            },
            result_configuration: ResultConfiguration {
                output_location: request.output_location,
                encryption_configuration: EncryptionConfiguration {
                    encryption_option: ENCRYPTION_OPTION,
                },
            },
        };
        let output: StartQueryExecutionOutput = self.call("StartQueryExecution", &input).await?;
        Ok(output.query_execution_id)
    }

    async fn get_query_execution(
        &self,
        query_execution_id: &str,
    ) -> Result<QueryStatus, AthenaError> {
        let input = GetQueryExecutionInput { query_execution_id };
        let output: GetQueryExecutionOutput = self.call("GetQueryExecution", &input).await?;
        let status = output.query_execution.status;
        Ok(QueryStatus::new(
            status.state,
            status.state_change_reason.unwrap_or_default(),
        ))
    }

    async fn get_query_results(
        &self,
        query_execution_id: &str,
        next_token: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<QueryResults, AthenaError> {
        let input = GetQueryResultsInput {
            query_execution_id,
            next_token,
            max_results,
        };
        let output: GetQueryResultsOutput = self.call("GetQueryResults", &input).await?;
        Ok(QueryResults {
            columns: parse_query_result_metadata(&output.result_set.result_set_metadata),
            rows: output
                .result_set
                .rows
                .into_iter()
                .map(|row| row.data.into_iter().map(|d| d.var_char_value).collect())
                .collect(),
            next_token: output.next_token,
        })
    }
}
