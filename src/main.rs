//! Park energy-production query service
//!
//! Answers API-gateway style requests for wind and solar park readings by
//! querying an Athena-compatible analytics engine.
//!
//! # Flow
//!
//! One invocation handles one event:
//! - the event JSON is read from stdin;
//! - the configured handler validates it, runs the pivoted readings query and
//!   reshapes the paginated results (optionally summing them per energy type);
//! - the gateway response JSON is written to stdout.
//!
//! Logs go to stderr so stdout only ever carries the response.
//!
//! # Configuration
//!
//! - `LOG_LEVEL`: tracing level (default `info`)
//! - `SERVICE_STAGE`: block of the `athena_config` parameter to use (default `production`)
//! - `SERVICE_HANDLER`: `get_energy_production` or `aggregate_energy_production`
//! - `SERVICE_PARAMETER_DIR`: directory of parameter files; `PARAM_*` env vars otherwise
//! - `SERVICE_PARKS_FILE`: JSON array of park records
//! - `ATHENA_ENDPOINT`, `ATHENA_OUTPUT_LOCATION`: engine endpoint and result location;
//!   without an endpoint the stage's `database_region` selects the regional one

mod athena;
mod config;
mod error;
mod handler;
mod model;
mod parameter_store;
mod parks;
mod production;


use crate::athena::{Athena, TokioSleeper};
use crate::config::ServiceConfig;
use crate::handler::{ApiRequest, ApiResponse, EnergyProductionService, HandlerKind};
use crate::model::ParkRegistry;
use crate::parameter_store::{EnvParameterStore, FileParameterStore, ParameterStore};
use crate::parks::JsonParkRegistry;
use anyhow::Context;
use std::io::Read;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_app_config()?;
    tracing_subscriber::fmt()
        .with_max_level(app_config.log_level())
        .with_writer(std::io::stderr)
        .init();

    let service_config = config::load_service_config()?;

    let store = parameter_store(&service_config);
    let athena_configuration =
        config::get_athena_configuration(store.as_ref(), &service_config.stage)
            .context("Failed to load athena configuration")?;
    tracing::info!("Athena configuration: {:?}", athena_configuration);
    let client_config =
        config::load_athena_client_config(athena_configuration.database_region.as_deref())?;
    tracing::debug!("Athena endpoint: {}", client_config.endpoint);

    let parks = park_registry(&service_config)?;
    let engine = Arc::new(athena::Client::new(client_config.clone()));
    let athena = Athena::new(engine, athena_configuration, client_config.output_location);
    let service = EnergyProductionService::new(athena, parks, Arc::new(TokioSleeper));

    let mut event = String::new();
    std::io::stdin()
        .read_to_string(&mut event)
        .context("Failed to read event from stdin")?;

    let response = handle_event(&service, service_config.handler, &event).await;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

/// Parameter files when a directory is configured, `PARAM_*` env vars otherwise.
fn parameter_store(service_config: &ServiceConfig) -> Box<dyn ParameterStore> {
    match &service_config.parameter_dir {
        Some(dir) => Box::new(FileParameterStore::new(dir)),
        None => Box::new(EnvParameterStore),
    }
}

/// Loads the park registry; without a parks file every park is unknown.
fn park_registry(service_config: &ServiceConfig) -> anyhow::Result<Arc<dyn ParkRegistry>> {
    match &service_config.parks_file {
        Some(path) => {
            let registry = JsonParkRegistry::from_file(path)
                .with_context(|| format!("Failed to load parks from {}", path))?;
            Ok(Arc::new(registry))
        }
        None => {
            tracing::info!("No parks file configured, aggregation will find no parks");
            Ok(Arc::new(JsonParkRegistry::from_parks(Vec::new())))
        }
    }
}

/// Decodes one event and runs it through the selected handler.
async fn handle_event(
    service: &EnergyProductionService,
    kind: HandlerKind,
    event: &str,
) -> ApiResponse {
    match serde_json::from_str::<ApiRequest>(event) {
        Ok(request) => service.handle(kind, &request).await,
        Err(e) => {
            tracing::error!("Failed to decode event: {:?}", e);
            ApiResponse::message(400, "Invalid request event")
        }
    }
}
