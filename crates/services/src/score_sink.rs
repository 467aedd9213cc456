use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::ScoreSinkError;

//
// ─── REPORT ────────────────────────────────────────────────────────────────────
//

/// Payload accepted by the external score sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub topic: String,
    pub score: u32,
    pub total_questions: u32,
}

//
// ─── SINK ──────────────────────────────────────────────────────────────────────
//

/// External system that durably records a completed quiz's result.
///
/// Callers treat success and failure identically: reporting is best-effort
/// and must never block or alter displayed results.
#[async_trait]
pub trait ScoreSink: Send + Sync {
    /// Persist one completed quiz result.
    ///
    /// # Errors
    ///
    /// Returns `ScoreSinkError` when the sink is unreachable or rejects the
    /// report.
    async fn save_score(&self, report: &ScoreReport) -> Result<(), ScoreSinkError>;
}

#[derive(Clone, Debug)]
pub struct ScoreSinkConfig {
    pub endpoint: String,
}

impl ScoreSinkConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let endpoint = env::var("QUIZ_SINK_URL").ok()?;
        if endpoint.trim().is_empty() {
            return None;
        }
        Some(Self { endpoint })
    }
}

/// Sink that POSTs score reports as JSON to an HTTP endpoint.
#[derive(Clone)]
pub struct HttpScoreSink {
    client: Client,
    config: Option<ScoreSinkConfig>,
}

impl HttpScoreSink {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ScoreSinkConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ScoreSinkConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl ScoreSink for HttpScoreSink {
    async fn save_score(&self, report: &ScoreReport) -> Result<(), ScoreSinkError> {
        let config = self.config.as_ref().ok_or(ScoreSinkError::Disabled)?;

        let response = self
            .client
            .post(&config.endpoint)
            .json(report)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScoreSinkError::HttpStatus(response.status()));
        }

        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
