use async_trait::async_trait;
use serde::Deserialize;

use quiz_core::model::{Question, Topic, TopicId};

use crate::error::CatalogError;

//
// ─── WIRE RECORDS ──────────────────────────────────────────────────────────────
//

/// Serialized form of a question as produced by quiz-generation backends.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

impl QuestionRecord {
    /// Validates this record into a core `Question`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Question` for malformed records.
    pub fn into_question(self) -> Result<Question, CatalogError> {
        Ok(Question::new(
            self.question,
            self.options,
            self.correct_answer,
            self.explanation,
        )?)
    }
}

/// Serialized form of a topic with its nested questions.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicRecord {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub questions: Vec<QuestionRecord>,
}

impl TopicRecord {
    /// Validates this record into a core `Topic`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Topic` or `CatalogError::Question` for
    /// malformed records.
    pub fn into_topic(self) -> Result<Topic, CatalogError> {
        let questions = self
            .questions
            .into_iter()
            .map(QuestionRecord::into_question)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Topic::new(
            TopicId::new(self.id),
            self.title,
            self.description,
            self.icon,
            questions,
        )?)
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Read-only supplier of topics and their question sets.
#[async_trait]
pub trait TopicCatalog: Send + Sync {
    /// All topics, in catalog order.
    async fn list_topics(&self) -> Result<Vec<Topic>, CatalogError>;

    /// One topic by id.
    async fn get_topic(&self, id: TopicId) -> Result<Topic, CatalogError>;
}

/// Catalog backed by an in-memory topic list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    topics: Vec<Topic>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new(topics: Vec<Topic>) -> Self {
        Self { topics }
    }

    /// Builds a catalog from a JSON array of topic records.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Json` for malformed JSON and validation errors
    /// for records the core model rejects.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let records: Vec<TopicRecord> = serde_json::from_str(raw)?;
        let topics = records
            .into_iter()
            .map(TopicRecord::into_topic)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(topics))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[async_trait]
impl TopicCatalog for InMemoryCatalog {
    async fn list_topics(&self) -> Result<Vec<Topic>, CatalogError> {
        Ok(self.topics.clone())
    }

    async fn get_topic(&self, id: TopicId) -> Result<Topic, CatalogError> {
        self.topics
            .iter()
            .find(|topic| topic.id() == id)
            .cloned()
            .ok_or(CatalogError::TopicNotFound(id))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
