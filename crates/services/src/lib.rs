#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod quiz_flow;
pub mod score_sink;
pub mod view;

pub use quiz_core::Clock;

pub use catalog::{InMemoryCatalog, QuestionRecord, TopicCatalog, TopicRecord};
pub use error::{CatalogError, QuizFlowError, ScoreSinkError};
pub use quiz_flow::{AdvanceOutcome, QuizFlowService};
pub use score_sink::{HttpScoreSink, ScoreReport, ScoreSink, ScoreSinkConfig};
pub use view::{OptionView, QuestionView, ResultsView};
