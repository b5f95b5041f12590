//! # covidpt
//!
//! A read-only JSON API over the Portuguese COVID-19 datasets published by the
//! DSSG Portugal project: the national daily counters and the per-county
//! counters.
//!
//! ## Architecture
//!
//! - **Data Layer**: fetches the CSV sources and parses them into immutable tables
//! - **Query Engine**: resolves dates, ranges, counties and the latest snapshot
//! - **API Layer**: axum handlers that decode paths and encode results as JSON

pub mod config;
pub mod data_loader;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod query;
pub mod state;
pub mod table;

pub use config::Config;
pub use error::{CovidPtError, Result};
pub use logging::{
    create_http_trace_layer, generate_request_id, init_tracing, log_request_error,
    log_table_load_stats, request_error_level,
};
pub use query::{execute, QueryDescriptor, QueryError, QueryOutput};
pub use state::AppState;
pub use table::{Date, Row, Table, TableKind, Value};
