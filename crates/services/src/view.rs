use chrono::{DateTime, Utc};

use quiz_core::session::{AnswerFeedback, QuizSession};

/// Labels shown next to answer options.
const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

//
// ─── QUESTION VIEW ─────────────────────────────────────────────────────────────
//

/// One renderable answer option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub label: &'static str,
    pub text: String,
    /// Staged but not committed.
    pub is_pending: bool,
}

/// Read-only snapshot of the current question for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub topic_title: String,
    /// e.g. "Question 2 of 5".
    pub counter: String,
    /// Progress bar fill, 0-100, based on position in the topic.
    pub progress_percent: u8,
    pub prompt: String,
    pub options: Vec<OptionView>,
    /// Feedback for the committed answer, when one exists.
    pub committed: Option<AnswerFeedback>,
    pub is_first: bool,
    pub is_last: bool,
}

impl QuestionView {
    /// Builds a view of the session's current question.
    ///
    /// Returns `None` outside the `InProgress` phase.
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Option<Self> {
        let topic = session.topic()?;
        let question = session.current_question()?;
        let index = session.current_index();
        let total = topic.question_count();
        let pending = session.pending_selection();

        let options = question
            .options()
            .iter()
            .enumerate()
            .map(|(i, text)| OptionView {
                label: OPTION_LABELS.get(i).copied().unwrap_or(""),
                text: text.clone(),
                is_pending: pending == Some(i),
            })
            .collect();

        // Position-based fill, matching "question n of total".
        let progress_percent = (((index + 1) as f64 / total as f64) * 100.0).round() as u8;

        Some(Self {
            topic_title: topic.title().to_string(),
            counter: format!("Question {} of {}", index + 1, total),
            progress_percent,
            prompt: question.prompt().to_string(),
            options,
            committed: session.feedback_for(index),
            is_first: index == 0,
            is_last: session.is_last_question(),
        })
    }
}

//
// ─── RESULTS VIEW ──────────────────────────────────────────────────────────────
//

/// Read-only snapshot of the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub topic_title: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u8,
    pub incorrect_count: u32,
    pub grade: String,
    pub completed_at: DateTime<Utc>,
}

impl ResultsView {
    /// Builds a view of the final results.
    ///
    /// Returns `None` outside the `ShowingResults` phase.
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Option<Self> {
        let topic = session.topic()?;
        let results = session.results().ok()?;
        let completed_at = session.completed_at()?;

        Some(Self {
            topic_title: topic.title().to_string(),
            score: results.score(),
            total_questions: results.total_questions(),
            percentage: results.percentage(),
            incorrect_count: results.incorrect_count(),
            grade: results.grade().to_string(),
            completed_at,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, Topic, TopicId};
    use quiz_core::session::QuizSession;
    use quiz_core::time::fixed_now;

    fn build_topic() -> Topic {
        let questions = vec![
            Question::new(
                "First?",
                vec!["a".to_string(), "b".to_string()],
                0,
                "e1",
            )
            .unwrap(),
            Question::new(
                "Second?",
                vec!["x".to_string(), "y".to_string(), "z".to_string()],
                2,
                "e2",
            )
            .unwrap(),
        ];
        Topic::new(TopicId::new(1), "History", "d", "📜", questions).unwrap()
    }

    #[test]
    fn question_view_renders_counter_labels_and_pending() {
        let mut session = QuizSession::new();
        session.select_topic(build_topic(), fixed_now()).unwrap();
        session.stage_selection(1).unwrap();

        let view = QuestionView::from_session(&session).unwrap();
        assert_eq!(view.counter, "Question 1 of 2");
        assert_eq!(view.progress_percent, 50);
        assert_eq!(view.prompt, "First?");
        assert_eq!(view.options.len(), 2);
        assert_eq!(view.options[0].label, "A");
        assert_eq!(view.options[1].label, "B");
        assert!(view.options[1].is_pending);
        assert!(!view.options[0].is_pending);
        assert!(view.committed.is_none());
        assert!(view.is_first);
        assert!(!view.is_last);
    }

    #[test]
    fn question_view_carries_committed_feedback_after_submit() {
        let mut session = QuizSession::new();
        session.select_topic(build_topic(), fixed_now()).unwrap();
        session.submit_answer(1).unwrap();

        let view = QuestionView::from_session(&session).unwrap();
        let committed = view.committed.unwrap();
        assert_eq!(committed.chosen, 1);
        assert!(!committed.is_correct);
        assert_eq!(committed.explanation, "e1");
    }

    #[test]
    fn question_view_is_none_outside_in_progress() {
        let session = QuizSession::new();
        assert!(QuestionView::from_session(&session).is_none());
    }

    #[test]
    fn results_view_snapshots_final_figures() {
        let mut session = QuizSession::new();
        session.select_topic(build_topic(), fixed_now()).unwrap();
        session.submit_answer(0).unwrap();
        session.advance(fixed_now()).unwrap();
        session.advance(fixed_now()).unwrap();

        let view = ResultsView::from_session(&session).unwrap();
        assert_eq!(view.topic_title, "History");
        assert_eq!(view.score, 1);
        assert_eq!(view.total_questions, 2);
        assert_eq!(view.percentage, 50);
        assert_eq!(view.incorrect_count, 1);
        assert_eq!(view.grade, "D");
        assert_eq!(view.completed_at, fixed_now());
    }

    #[test]
    fn results_view_is_none_before_completion() {
        let mut session = QuizSession::new();
        session.select_topic(build_topic(), fixed_now()).unwrap();
        assert!(ResultsView::from_session(&session).is_none());
    }
}
