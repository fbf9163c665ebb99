//! Trait abstraction for the prediction collaborator to enable mocking
//! in tests
//!
//! The application treats the collaborator as a black box: it may be a
//! remote HTTP endpoint or a model evaluated in-process, and callers
//! only rely on the call eventually resolving or failing.

use async_trait::async_trait;

use crate::state::{ModelSummary, PredictionOutcome};

use super::error::ServiceError;
use super::types::PredictionRequest;

/// Trait for prediction collaborator operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Classify a validated applicant feature vector
    async fn classify(&self, request: PredictionRequest)
        -> Result<PredictionOutcome, ServiceError>;

    /// Describe the model behind the collaborator (display only)
    async fn describe_model(&self) -> Result<ModelSummary, ServiceError>;
}
