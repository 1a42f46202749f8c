//! Core types and shared functionality for pagedate.
//!
//! This crate provides:
//! - The `DateResult` data model and confidence table
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod result;

pub use config::{AppConfig, ConfigError, LlmConfig};
pub use error::Error;
pub use result::{CONFIDENCE_TABLE, Confidence, DateResult, ExtractionMethod, FieldDate, LlmSource};
