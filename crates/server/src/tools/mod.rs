//! MCP tool implementations.
//!
//! This module contains all tools exposed by the pagedate server.

pub mod date_batch;
pub mod date_extract;
