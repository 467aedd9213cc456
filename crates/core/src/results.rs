use std::fmt;

//
// ─── GRADE ─────────────────────────────────────────────────────────────────────
//

/// Letter grade derived from the final percentage via fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Maps a 0-100 percentage onto a letter grade.
    ///
    /// Thresholds: >=90 A+, >=80 A, >=70 B, >=60 C, >=50 D, else F.
    #[must_use]
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            90..=u8::MAX => Grade::APlus,
            80..=89 => Grade::A,
            70..=79 => Grade::B,
            60..=69 => Grade::C,
            50..=59 => Grade::D,
            _ => Grade::F,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// Final figures for a completed quiz run.
///
/// Unanswered questions count as incorrect, so `incorrect_count` is always
/// `total_questions - score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResults {
    score: u32,
    total_questions: u32,
    percentage: u8,
    incorrect_count: u32,
    grade: Grade,
}

impl QuizResults {
    /// Computes results from a final score and the question total.
    ///
    /// `total_questions` is never zero for a validated topic; a zero total is
    /// treated as 0%.
    #[must_use]
    pub fn compute(score: u32, total_questions: u32) -> Self {
        let percentage = if total_questions == 0 {
            0
        } else {
            let ratio = f64::from(score) / f64::from(total_questions);
            // round() stays within 0-100 because score <= total.
            (ratio * 100.0).round() as u8
        };

        Self {
            score,
            total_questions,
            percentage,
            incorrect_count: total_questions.saturating_sub(score),
            grade: Grade::from_percentage(percentage),
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    #[must_use]
    pub fn incorrect_count(&self) -> u32 {
        self.incorrect_count
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
