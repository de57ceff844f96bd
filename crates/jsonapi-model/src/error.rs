//! # Mapping-Layer Errors
//!
//! This module defines the common error types used throughout the mapping
//! layer. By centralizing error definitions, we ensure consistent error
//! handling across models, collections, and transports.

/// Errors surfaced by model operations (parse, save, fetch, destroy).
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The validation hook rejected the proposed attributes before any
    /// network call was made.
    #[error("Validation rejected attributes")]
    ValidationFailed,
    /// A payload passed the document guard but did not have the shape of
    /// a JSON:API resource.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    /// The model has no transport to dispatch persistence calls through.
    #[error("No transport configured")]
    NoTransport,
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors that can occur at the transport seam.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("Transport closed")]
    Closed,
    #[error("Transport dropped response channel")]
    Dropped,
    #[error("Request rejected: {0}")]
    Rejected(String),
}
