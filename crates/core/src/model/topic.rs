use thiserror::Error;

use crate::model::ids::TopicId;
use crate::model::question::Question;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("topic title cannot be empty")]
    EmptyTitle,

    #[error("topic must contain at least one question")]
    NoQuestions,
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

/// A named quiz category bundling an ordered set of questions.
///
/// Immutable reference data supplied by a topic catalog; the session never
/// mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    id: TopicId,
    title: String,
    description: String,
    icon: String,
    questions: Vec<Question>,
}

impl Topic {
    /// Creates a validated topic.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::EmptyTitle` if the title is blank and
    /// `TopicError::NoQuestions` if the question list is empty.
    pub fn new(
        id: TopicId,
        title: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, TopicError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(TopicError::EmptyTitle);
        }
        if questions.is_empty() {
            return Err(TopicError::NoQuestions);
        }

        Ok(Self {
            id,
            title,
            description: description.into(),
            icon: icon.into(),
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> TopicId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Returns the question at the given 0-based index, if any.
    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
