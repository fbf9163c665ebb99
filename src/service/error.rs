//! Error types for the prediction service boundary

use thiserror::Error;

/// Errors a prediction collaborator can surface.
///
/// All of these are recoverable: the form keeps its data and the user
/// may retry. They are converted to notices at the application boundary
/// and never crash the session.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never completed (connection refused, timeout,
    /// unexpected HTTP status with no readable body).
    #[error("prediction request failed: {0}")]
    Transport(String),

    /// The collaborator answered but could not produce a classification;
    /// carries its error string, which is shown to the user verbatim.
    #[error("{0}")]
    Upstream(String),

    /// The response arrived but did not match the wire contract.
    #[error("malformed prediction response: {0}")]
    MalformedResponse(String),
}
