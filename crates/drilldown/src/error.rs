//! Error types for Drilldown operations.
//!
//! This module provides the main error type [`DrilldownError`] which wraps
//! the error conditions that escape the library. Layout-engine failures never
//! appear here: the orchestrator absorbs them and degrades the layout instead.

use std::io;

use thiserror::Error;

use crate::catalog::CatalogError;

/// The main error type for Drilldown operations.
#[derive(Debug, Error)]
pub enum DrilldownError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),

    #[error("Runtime error: {0}")]
    Runtime(String),
}
