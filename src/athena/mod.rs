mod client;
pub mod engine;
mod pagination;
mod query;
mod query_builder;
mod result_parsing;

pub use client::Client;
pub use query::{get_athena_query, Athena, Sleeper, TokioSleeper};
pub use query_builder::TimeRange;
