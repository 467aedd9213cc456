//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionError, TopicError, TopicId};
use quiz_core::session::QuizStateError;

/// Errors emitted by topic catalogs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("topic {0} not found in catalog")]
    TopicNotFound(TopicId),
    #[error("failed to parse topic data: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Errors emitted by score sinks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScoreSinkError {
    #[error("score sink is not configured")]
    Disabled,
    #[error("score sink request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `QuizFlowService`.
///
/// Sink failures are deliberately absent: score reporting is fire-and-forget
/// and never surfaces to the flow's callers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizFlowError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    State(#[from] QuizStateError),
}
