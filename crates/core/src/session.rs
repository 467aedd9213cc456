use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::model::{Question, Topic};
use crate::results::QuizResults;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle phase of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// No topic chosen yet; the only way forward is `select_topic`.
    SelectingTopic,
    /// Walking the selected topic's questions.
    InProgress,
    /// Final score is frozen and readable; `restart` or `exit_to_topics` leave it.
    ShowingResults,
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuizPhase::SelectingTopic => "selecting-topic",
            QuizPhase::InProgress => "in-progress",
            QuizPhase::ShowingResults => "showing-results",
        };
        f.write_str(name)
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Misuse of the session state machine.
///
/// These are programming errors in the caller, not user-recoverable
/// conditions; operations invoked outside their valid phase fail loudly
/// instead of being silently ignored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizStateError {
    #[error("{operation} is not valid in the {phase} phase")]
    InvalidPhase {
        operation: &'static str,
        phase: QuizPhase,
    },

    #[error("option index {index} is out of range for {options} options")]
    OptionOutOfRange { index: usize, options: usize },

    #[error("current question already has a committed answer")]
    AlreadyAnswered,

    #[error("no pending selection to submit")]
    NoPendingSelection,
}

//
// ─── FEEDBACK & PROGRESS ───────────────────────────────────────────────────────
//

/// What the presentation layer needs to render feedback for a committed answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub chosen: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    pub explanation: String,
}

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State machine for one quiz run: topic selection, question traversal,
/// scoring, results.
///
/// Holds one answer slot per question. A slot, once committed, is never
/// overwritten; the score always equals the count of slots matching their
/// question's correct index. The pending selection is staged separately from
/// the committed slot and is cleared by submit and by navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    phase: QuizPhase,
    topic: Option<Topic>,
    current: usize,
    answers: Vec<Option<usize>>,
    score: u32,
    pending: Option<usize>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    /// Creates a session in the `SelectingTopic` phase with no topic.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: QuizPhase::SelectingTopic,
            topic: None,
            current: 0,
            answers: Vec::new(),
            score: 0,
            pending: None,
            started_at: None,
            completed_at: None,
        }
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    /// 0-based index of the question currently shown. Meaningless outside
    /// `InProgress`.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase != QuizPhase::InProgress {
            return None;
        }
        self.topic.as_ref().and_then(|t| t.question(self.current))
    }

    /// The committed answer slot for the given question index.
    ///
    /// `None` means unanswered (or index out of range).
    #[must_use]
    pub fn committed_answer(&self, index: usize) -> Option<usize> {
        self.answers.get(index).copied().flatten()
    }

    /// Feedback for a previously committed answer, for read-only re-display
    /// when revisiting a question.
    #[must_use]
    pub fn feedback_for(&self, index: usize) -> Option<AnswerFeedback> {
        let chosen = self.committed_answer(index)?;
        let question = self.topic.as_ref()?.question(index)?;
        Some(Self::feedback(question, chosen))
    }

    /// The staged, uncommitted selection for the current question, if any.
    #[must_use]
    pub fn pending_selection(&self) -> Option<usize> {
        self.pending
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == QuizPhase::ShowingResults
    }

    /// True when the current question is the topic's last one.
    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 == self.answers.len()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.answers.len();
        let answered = self.answers.iter().filter(|slot| slot.is_some()).count();
        QuizProgress {
            total,
            answered,
            remaining: total - answered,
            is_complete: self.is_complete(),
        }
    }

    /// Final figures for the run.
    ///
    /// # Errors
    ///
    /// Returns `QuizStateError::InvalidPhase` outside `ShowingResults`; the
    /// score is not final until the session completes.
    pub fn results(&self) -> Result<QuizResults, QuizStateError> {
        self.require_phase("results", QuizPhase::ShowingResults)?;
        let total = u32::try_from(self.answers.len()).unwrap_or(u32::MAX);
        Ok(QuizResults::compute(self.score, total))
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Selects a topic and enters `InProgress` at question 0 with a clean
    /// score and all slots unanswered.
    ///
    /// `now` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `QuizStateError::InvalidPhase` outside `SelectingTopic`.
    pub fn select_topic(&mut self, topic: Topic, now: DateTime<Utc>) -> Result<(), QuizStateError> {
        self.require_phase("select_topic", QuizPhase::SelectingTopic)?;

        self.answers = vec![None; topic.question_count()];
        self.topic = Some(topic);
        self.current = 0;
        self.score = 0;
        self.pending = None;
        self.started_at = Some(now);
        self.completed_at = None;
        self.phase = QuizPhase::InProgress;
        Ok(())
    }

    /// Stages a selection for the current question without committing it.
    ///
    /// # Errors
    ///
    /// Returns `QuizStateError::InvalidPhase` outside `InProgress`,
    /// `OptionOutOfRange` for a bad index, and `AlreadyAnswered` when the
    /// current slot is already committed.
    pub fn stage_selection(&mut self, option_index: usize) -> Result<(), QuizStateError> {
        let question = self.current_question_checked("stage_selection")?;
        if option_index >= question.option_count() {
            return Err(QuizStateError::OptionOutOfRange {
                index: option_index,
                options: question.option_count(),
            });
        }
        if self.answers[self.current].is_some() {
            return Err(QuizStateError::AlreadyAnswered);
        }
        self.pending = Some(option_index);
        Ok(())
    }

    /// Commits an answer for the current question.
    ///
    /// If the slot is already committed this is an idempotent no-op that
    /// returns the original feedback, so repeated clicks cannot double-count
    /// the score. Clears the pending selection.
    ///
    /// # Errors
    ///
    /// Returns `QuizStateError::InvalidPhase` outside `InProgress` and
    /// `OptionOutOfRange` for an index past the current question's options.
    pub fn submit_answer(
        &mut self,
        option_index: usize,
    ) -> Result<AnswerFeedback, QuizStateError> {
        let question = self.current_question_checked("submit_answer")?;
        if option_index >= question.option_count() {
            return Err(QuizStateError::OptionOutOfRange {
                index: option_index,
                options: question.option_count(),
            });
        }

        if let Some(existing) = self.answers[self.current] {
            // First submission is final.
            let feedback = Self::feedback(question, existing);
            self.pending = None;
            return Ok(feedback);
        }

        let feedback = Self::feedback(question, option_index);
        self.answers[self.current] = Some(option_index);
        if feedback.is_correct {
            self.score += 1;
        }
        self.pending = None;
        Ok(feedback)
    }

    /// Commits the staged selection, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `QuizStateError::NoPendingSelection` when nothing is staged;
    /// otherwise behaves like [`QuizSession::submit_answer`].
    pub fn submit_pending(&mut self) -> Result<AnswerFeedback, QuizStateError> {
        let pending = self.pending.ok_or(QuizStateError::NoPendingSelection)?;
        self.submit_answer(pending)
    }

    /// Moves to the next question, or to `ShowingResults` from the last one.
    ///
    /// An answer is not required: a skipped slot stays unanswered and counts
    /// as incorrect in the final score. Clears the pending selection.
    ///
    /// # Errors
    ///
    /// Returns `QuizStateError::InvalidPhase` outside `InProgress`.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<(), QuizStateError> {
        self.require_phase("advance", QuizPhase::InProgress)?;
        self.pending = None;

        if self.current + 1 >= self.answers.len() {
            self.completed_at = Some(now);
            self.phase = QuizPhase::ShowingResults;
        } else {
            self.current += 1;
        }
        Ok(())
    }

    /// Moves back one question. A no-op at index 0.
    ///
    /// Committed answers for revisited questions stay readable via
    /// [`QuizSession::feedback_for`]; the score is untouched. Clears the
    /// pending selection.
    ///
    /// # Errors
    ///
    /// Returns `QuizStateError::InvalidPhase` outside `InProgress`.
    pub fn retreat(&mut self) -> Result<(), QuizStateError> {
        self.require_phase("retreat", QuizPhase::InProgress)?;
        self.pending = None;

        if self.current > 0 {
            self.current -= 1;
        }
        Ok(())
    }

    /// Re-runs the same topic from question 0 with a clean score and all
    /// slots unanswered.
    ///
    /// # Errors
    ///
    /// Returns `QuizStateError::InvalidPhase` outside `ShowingResults`.
    pub fn restart(&mut self, now: DateTime<Utc>) -> Result<(), QuizStateError> {
        self.require_phase("restart", QuizPhase::ShowingResults)?;

        for slot in &mut self.answers {
            *slot = None;
        }
        self.current = 0;
        self.score = 0;
        self.pending = None;
        self.started_at = Some(now);
        self.completed_at = None;
        self.phase = QuizPhase::InProgress;
        Ok(())
    }

    /// Drops the topic and all progress and returns to `SelectingTopic`.
    /// Valid from any phase.
    pub fn exit_to_topics(&mut self) {
        *self = Self::new();
    }

    //
    // ─── INTERNAL ──────────────────────────────────────────────────────────────
    //

    fn require_phase(
        &self,
        operation: &'static str,
        expected: QuizPhase,
    ) -> Result<(), QuizStateError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(QuizStateError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    fn current_question_checked(
        &self,
        operation: &'static str,
    ) -> Result<&Question, QuizStateError> {
        self.require_phase(operation, QuizPhase::InProgress)?;
        self.topic
            .as_ref()
            .and_then(|t| t.question(self.current))
            .ok_or(QuizStateError::InvalidPhase {
                operation,
                phase: self.phase,
            })
    }

    fn feedback(question: &Question, chosen: usize) -> AnswerFeedback {
        AnswerFeedback {
            chosen,
            correct_index: question.correct_index(),
            is_correct: question.is_correct(chosen),
            explanation: question.explanation().to_string(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, Topic, TopicId};
    use crate::results::Grade;
    use crate::time::fixed_now;

    /// Topic with one question per entry in `correct`; every question offers
    /// options 0..=2 and explanation "E<n>".
    fn build_topic(correct: &[usize]) -> Topic {
        let questions = correct
            .iter()
            .enumerate()
            .map(|(i, &correct_index)| {
                Question::new(
                    format!("Q{i}?"),
                    vec!["a".to_string(), "b".to_string(), "c".to_string()],
                    correct_index,
                    format!("E{i}"),
                )
                .unwrap()
            })
            .collect();
        Topic::new(TopicId::new(1), "Test Topic", "desc", "🧪", questions).unwrap()
    }

    fn in_progress(correct: &[usize]) -> QuizSession {
        let mut session = QuizSession::new();
        session.select_topic(build_topic(correct), fixed_now()).unwrap();
        session
    }

    /// The invariant the score must always satisfy.
    fn recount(session: &QuizSession) -> u32 {
        let topic = session.topic().unwrap();
        (0..topic.question_count())
            .filter(|&i| {
                session
                    .committed_answer(i)
                    .is_some_and(|chosen| topic.question(i).unwrap().is_correct(chosen))
            })
            .count() as u32
    }

    #[test]
    fn fresh_session_is_selecting_topic() {
        let session = QuizSession::new();
        assert_eq!(session.phase(), QuizPhase::SelectingTopic);
        assert!(session.topic().is_none());
        assert_eq!(session.score(), 0);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn select_topic_enters_in_progress_at_question_zero() {
        let session = in_progress(&[0, 1]);
        assert_eq!(session.phase(), QuizPhase::InProgress);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.started_at(), Some(fixed_now()));
        assert_eq!(session.current_question().unwrap().prompt(), "Q0?");
        assert_eq!(session.progress().total, 2);
        assert_eq!(session.progress().answered, 0);
    }

    #[test]
    fn select_topic_outside_selecting_topic_fails() {
        let mut session = in_progress(&[0]);
        let err = session
            .select_topic(build_topic(&[0]), fixed_now())
            .unwrap_err();
        assert_eq!(
            err,
            QuizStateError::InvalidPhase {
                operation: "select_topic",
                phase: QuizPhase::InProgress,
            }
        );
    }

    #[test]
    fn skipping_everything_scores_zero() {
        let mut session = in_progress(&[0, 1, 2]);
        session.advance(fixed_now()).unwrap();
        session.advance(fixed_now()).unwrap();
        session.advance(fixed_now()).unwrap();

        assert_eq!(session.phase(), QuizPhase::ShowingResults);
        let results = session.results().unwrap();
        assert_eq!(results.score(), 0);
        assert_eq!(results.incorrect_count(), 3);
    }

    #[test]
    fn submit_answer_records_and_scores() {
        let mut session = in_progress(&[1]);
        let feedback = session.submit_answer(1).unwrap();
        assert!(feedback.is_correct);
        assert_eq!(feedback.chosen, 1);
        assert_eq!(feedback.correct_index, 1);
        assert_eq!(feedback.explanation, "E0");
        assert_eq!(session.score(), 1);
        assert_eq!(session.committed_answer(0), Some(1));
    }

    #[test]
    fn submit_answer_is_idempotent_per_question() {
        let mut session = in_progress(&[1]);
        let first = session.submit_answer(2).unwrap();
        assert!(!first.is_correct);
        assert_eq!(session.score(), 0);

        // Second call, even with the correct index, keeps the first answer.
        let second = session.submit_answer(1).unwrap();
        assert_eq!(second, first);
        assert_eq!(session.score(), 0);
        assert_eq!(session.committed_answer(0), Some(2));
    }

    #[test]
    fn repeated_correct_submission_does_not_double_count() {
        let mut session = in_progress(&[0]);
        session.submit_answer(0).unwrap();
        session.submit_answer(0).unwrap();
        session.submit_answer(0).unwrap();
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn submit_answer_rejects_out_of_range_index() {
        let mut session = in_progress(&[0]);
        let err = session.submit_answer(3).unwrap_err();
        assert_eq!(
            err,
            QuizStateError::OptionOutOfRange {
                index: 3,
                options: 3
            }
        );
        assert_eq!(session.committed_answer(0), None);
    }

    #[test]
    fn submit_answer_outside_in_progress_fails() {
        let mut session = QuizSession::new();
        let err = session.submit_answer(0).unwrap_err();
        assert!(matches!(
            err,
            QuizStateError::InvalidPhase {
                operation: "submit_answer",
                phase: QuizPhase::SelectingTopic,
            }
        ));
    }

    #[test]
    fn advance_increments_until_last_then_shows_results() {
        let mut session = in_progress(&[0, 0, 0]);
        session.advance(fixed_now()).unwrap();
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.phase(), QuizPhase::InProgress);

        session.advance(fixed_now()).unwrap();
        assert_eq!(session.current_index(), 2);
        assert!(session.is_last_question());

        session.advance(fixed_now()).unwrap();
        assert_eq!(session.phase(), QuizPhase::ShowingResults);
        assert_eq!(session.completed_at(), Some(fixed_now()));

        let err = session.advance(fixed_now()).unwrap_err();
        assert!(matches!(err, QuizStateError::InvalidPhase { .. }));
    }

    #[test]
    fn retreat_at_zero_is_a_noop() {
        let mut session = in_progress(&[0, 0]);
        session.retreat().unwrap();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.phase(), QuizPhase::InProgress);
    }

    #[test]
    fn retreat_restores_committed_feedback_without_mutating_score() {
        let mut session = in_progress(&[1, 2]);
        session.submit_answer(1).unwrap();
        session.advance(fixed_now()).unwrap();
        session.retreat().unwrap();

        assert_eq!(session.current_index(), 0);
        let feedback = session.feedback_for(0).unwrap();
        assert!(feedback.is_correct);
        assert_eq!(feedback.chosen, 1);
        assert_eq!(session.score(), 1);

        // Revisiting cannot change the committed slot.
        session.submit_answer(0).unwrap();
        assert_eq!(session.committed_answer(0), Some(1));
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn score_always_matches_recount_over_mixed_navigation() {
        let mut session = in_progress(&[1, 0, 2, 2]);
        session.submit_answer(1).unwrap(); // correct
        session.advance(fixed_now()).unwrap();
        session.submit_answer(2).unwrap(); // incorrect
        session.advance(fixed_now()).unwrap();
        session.retreat().unwrap();
        session.submit_answer(0).unwrap(); // no-op, slot committed
        session.advance(fixed_now()).unwrap();
        session.submit_answer(2).unwrap(); // correct
        session.advance(fixed_now()).unwrap();
        // Q3 skipped.
        assert_eq!(session.score(), recount(&session));
        session.advance(fixed_now()).unwrap();

        assert_eq!(session.phase(), QuizPhase::ShowingResults);
        assert_eq!(session.score(), 2);
        assert_eq!(session.score(), recount(&session));
    }

    #[test]
    fn restart_equals_freshly_selected_session() {
        let topic = build_topic(&[0, 1]);
        let mut restarted = QuizSession::new();
        restarted.select_topic(topic.clone(), fixed_now()).unwrap();
        restarted.submit_answer(0).unwrap();
        restarted.advance(fixed_now()).unwrap();
        restarted.advance(fixed_now()).unwrap();
        restarted.restart(fixed_now()).unwrap();

        let mut fresh = QuizSession::new();
        fresh.select_topic(topic, fixed_now()).unwrap();

        assert_eq!(restarted, fresh);
    }

    #[test]
    fn restart_outside_showing_results_fails() {
        let mut session = in_progress(&[0]);
        let err = session.restart(fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            QuizStateError::InvalidPhase {
                operation: "restart",
                phase: QuizPhase::InProgress,
            }
        ));
    }

    #[test]
    fn exit_to_topics_is_valid_from_any_phase() {
        let mut session = QuizSession::new();
        session.exit_to_topics();
        assert_eq!(session.phase(), QuizPhase::SelectingTopic);

        let mut session = in_progress(&[0]);
        session.exit_to_topics();
        assert_eq!(session, QuizSession::new());

        let mut session = in_progress(&[0]);
        session.advance(fixed_now()).unwrap();
        session.exit_to_topics();
        assert_eq!(session, QuizSession::new());
    }

    #[test]
    fn pending_selection_is_staged_separately_and_cleared_on_submit() {
        let mut session = in_progress(&[1]);
        session.stage_selection(2).unwrap();
        assert_eq!(session.pending_selection(), Some(2));
        assert_eq!(session.committed_answer(0), None);

        // Re-staging overwrites the pending choice, not the slot.
        session.stage_selection(1).unwrap();
        assert_eq!(session.pending_selection(), Some(1));

        let feedback = session.submit_pending().unwrap();
        assert!(feedback.is_correct);
        assert_eq!(session.pending_selection(), None);
        assert_eq!(session.committed_answer(0), Some(1));
    }

    #[test]
    fn pending_selection_is_cleared_by_navigation() {
        let mut session = in_progress(&[0, 0]);
        session.stage_selection(2).unwrap();
        session.advance(fixed_now()).unwrap();
        assert_eq!(session.pending_selection(), None);

        session.stage_selection(1).unwrap();
        session.retreat().unwrap();
        assert_eq!(session.pending_selection(), None);
        assert_eq!(session.committed_answer(0), None);
        assert_eq!(session.committed_answer(1), None);
    }

    #[test]
    fn stage_selection_on_answered_question_fails() {
        let mut session = in_progress(&[0]);
        session.submit_answer(0).unwrap();
        let err = session.stage_selection(1).unwrap_err();
        assert_eq!(err, QuizStateError::AlreadyAnswered);
    }

    #[test]
    fn submit_pending_without_stage_fails() {
        let mut session = in_progress(&[0]);
        let err = session.submit_pending().unwrap_err();
        assert_eq!(err, QuizStateError::NoPendingSelection);
    }

    #[test]
    fn results_before_completion_fail() {
        let session = in_progress(&[0]);
        let err = session.results().unwrap_err();
        assert!(matches!(
            err,
            QuizStateError::InvalidPhase {
                operation: "results",
                phase: QuizPhase::InProgress,
            }
        ));
    }

    #[test]
    fn worked_example_three_questions() {
        // Correct indices [1, 0, 2]; submitted [1, 1, 2] -> 2 correct.
        let mut session = in_progress(&[1, 0, 2]);
        session.submit_answer(1).unwrap();
        session.advance(fixed_now()).unwrap();
        session.submit_answer(1).unwrap();
        session.advance(fixed_now()).unwrap();
        session.submit_answer(2).unwrap();
        session.advance(fixed_now()).unwrap();

        let results = session.results().unwrap();
        assert_eq!(results.score(), 2);
        assert_eq!(results.percentage(), 67);
        assert_eq!(results.incorrect_count(), 1);
        assert_eq!(results.grade(), Grade::C);
    }

    #[test]
    fn worked_example_skip_counts_as_incorrect() {
        // Answer Q0 correctly, skip Q1 entirely.
        let mut session = in_progress(&[0, 1]);
        session.submit_answer(0).unwrap();
        session.advance(fixed_now()).unwrap();
        session.advance(fixed_now()).unwrap();

        let results = session.results().unwrap();
        assert_eq!(results.score(), 1);
        assert_eq!(results.percentage(), 50);
        assert_eq!(results.grade(), Grade::D);
        assert_eq!(results.incorrect_count(), 1);
    }
}
