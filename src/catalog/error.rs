//! Error types for the interval catalog.

use thiserror::Error;

/// Interval catalog error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No interval carries the requested identity.
    #[error("Unknown interval identity: {0}")]
    NotFound(String),
}
