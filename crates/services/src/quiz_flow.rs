use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{Topic, TopicId};
use quiz_core::results::QuizResults;
use quiz_core::session::QuizSession;

use crate::catalog::TopicCatalog;
use crate::error::QuizFlowError;
use crate::score_sink::{ScoreReport, ScoreSink};

/// Result of advancing a session by one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    pub is_complete: bool,
    /// Present exactly when this step entered `ShowingResults`.
    pub results: Option<QuizResults>,
}

/// Orchestrates quiz runs: topic lookup, session transitions, and
/// fire-and-forget score reporting.
#[derive(Clone)]
pub struct QuizFlowService {
    clock: Clock,
    catalog: Arc<dyn TopicCatalog>,
    sink: Arc<dyn ScoreSink>,
}

impl QuizFlowService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<dyn TopicCatalog>, sink: Arc<dyn ScoreSink>) -> Self {
        Self {
            clock,
            catalog,
            sink,
        }
    }

    /// All topics available for selection, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Catalog` when the catalog fails.
    pub async fn list_topics(&self) -> Result<Vec<Topic>, QuizFlowError> {
        Ok(self.catalog.list_topics().await?)
    }

    /// Starts a fresh `InProgress` session for the given topic.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Catalog` when the topic is missing.
    pub async fn start_quiz(&self, topic_id: TopicId) -> Result<QuizSession, QuizFlowError> {
        let topic = self.catalog.get_topic(topic_id).await?;
        let mut session = QuizSession::new();
        session.select_topic(topic, self.clock.now())?;
        Ok(session)
    }

    /// Advances the session one step. On the step that enters
    /// `ShowingResults`, computes the final figures and dispatches the score
    /// report to the sink without awaiting it; the results are returned
    /// before and regardless of whether the save completes or fails.
    ///
    /// Must be called within a tokio runtime so the dispatch can be spawned.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::State` when the session is not `InProgress`.
    pub fn advance(&self, session: &mut QuizSession) -> Result<AdvanceOutcome, QuizFlowError> {
        session.advance(self.clock.now())?;

        if !session.is_complete() {
            return Ok(AdvanceOutcome {
                is_complete: false,
                results: None,
            });
        }

        let results = session.results()?;
        if let Some(topic) = session.topic() {
            self.dispatch_report(topic.title().to_string(), &results);
        }

        Ok(AdvanceOutcome {
            is_complete: true,
            results: Some(results),
        })
    }

    /// Re-runs the same topic from the results screen.
    ///
    /// A restarted run that completes again dispatches a second report.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::State` outside `ShowingResults`.
    pub fn restart(&self, session: &mut QuizSession) -> Result<(), QuizFlowError> {
        session.restart(self.clock.now())?;
        Ok(())
    }

    fn dispatch_report(&self, topic: String, results: &QuizResults) {
        let report = ScoreReport {
            topic,
            score: results.score(),
            total_questions: results.total_questions(),
        };
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            match sink.save_score(&report).await {
                Ok(()) => log::debug!("score saved: {report:?}"),
                Err(err) => log::warn!("failed to save score: {err}"),
            }
        });
    }
}
