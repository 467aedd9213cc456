mod ids;
mod question;
mod topic;

pub use ids::{ParseIdError, TopicId};
pub use question::{Question, QuestionError};
pub use topic::{Topic, TopicError};
