//! Error type for the fallible edges of the model (files, snapshots, item lookups)
//!
//! The projection engine itself never fails; only I/O and caller lookups do.

use thiserror::Error;

/// Errors raised outside the pure projection engine
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No snapshot stored under the requested name
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    /// No line item with the given id in the requested list
    #[error("{kind} item not found: {id}")]
    ItemNotFound { kind: &'static str, id: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
