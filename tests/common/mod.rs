//! Common test utilities for covidpt.
//!
//! This module provides shared utilities for testing the covidpt server.

pub mod http_client;
pub mod test_data;
