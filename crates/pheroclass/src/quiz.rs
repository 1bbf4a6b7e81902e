//! Taking a quiz and presenting its result

use chrono::Utc;
use pheroclass_classroom::{ContractAddress, Question, Quiz, QuizResult};
use thiserror::Error;

pub const QUIZ_EXPIRED_MESSAGE: &str = "This quiz has expired and can no longer be taken";

/// Current wall-clock time in milliseconds since the epoch
pub fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizFlowError {
    #[error("The quiz is not in progress")]
    NotInProgress,

    #[error("Question {0} does not exist")]
    NoSuchQuestion(usize),

    #[error("Option {option} does not exist for question {question}")]
    NoSuchOption { question: usize, option: u64 },

    #[error("Please answer all questions before submitting")]
    Unanswered { remaining: usize },
}

/// One student's pass through a quiz
///
/// `NotAttempted → InProgress → Submitted → Scored`. Progress lives only in
/// memory: dropping an in-progress session loses every answer and the
/// contract records nothing until the full answer vector is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizSession {
    NotAttempted,
    InProgress {
        questions: Vec<Question>,
        answers: Vec<Option<u64>>,
        current: usize,
    },
    Submitted {
        answers: Vec<u64>,
    },
    Scored(QuizResult),
}

impl QuizSession {
    pub fn start(questions: Vec<Question>) -> Self {
        let answers = vec![None; questions.len()];
        Self::InProgress {
            questions,
            answers,
            current: 0,
        }
    }

    /// Pick an option for a question
    pub fn answer(&mut self, question: usize, option: u64) -> Result<(), QuizFlowError> {
        let Self::InProgress {
            questions, answers, ..
        } = self
        else {
            return Err(QuizFlowError::NotInProgress);
        };
        let asked = questions.get(question).ok_or(QuizFlowError::NoSuchQuestion(question))?;
        if option as usize >= asked.options.len() {
            return Err(QuizFlowError::NoSuchOption { question, option });
        }
        answers[question] = Some(option);
        Ok(())
    }

    pub fn current_question(&self) -> Option<(usize, &Question)> {
        match self {
            Self::InProgress {
                questions, current, ..
            } => questions.get(*current).map(|q| (*current, q)),
            _ => None,
        }
    }

    pub fn next_question(&mut self) {
        if let Self::InProgress {
            questions, current, ..
        } = self
        {
            if *current + 1 < questions.len() {
                *current += 1;
            }
        }
    }

    pub fn previous_question(&mut self) {
        if let Self::InProgress { current, .. } = self {
            *current = current.saturating_sub(1);
        }
    }

    /// Answers given so far, `None` where a question is still open
    pub fn answers(&self) -> &[Option<u64>] {
        match self {
            Self::InProgress { answers, .. } => answers,
            _ => &[],
        }
    }

    /// The full answer vector, once every question has an answer
    pub fn completed_answers(&self) -> Result<Vec<u64>, QuizFlowError> {
        let Self::InProgress { answers, .. } = self else {
            return Err(QuizFlowError::NotInProgress);
        };
        let remaining = answers.iter().filter(|a| a.is_none()).count();
        if remaining > 0 {
            return Err(QuizFlowError::Unanswered { remaining });
        }
        Ok(answers.iter().flatten().copied().collect())
    }

    /// Move to `Submitted`, returning the answers to send
    pub fn submit(&mut self) -> Result<Vec<u64>, QuizFlowError> {
        let answers = self.completed_answers()?;
        *self = Self::Submitted {
            answers: answers.clone(),
        };
        Ok(answers)
    }

    pub fn scored(&mut self, result: QuizResult) {
        *self = Self::Scored(result);
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress { .. })
    }
}

/// How a quiz is listed to a student
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStatus {
    Available,
    Expired,
    /// Attempted; shown as completed even after expiry
    Completed,
}

impl QuizStatus {
    pub fn of(quiz: &Quiz, result: Option<&QuizResult>, now_ms: u64) -> Self {
        if result.is_some_and(|r| r.has_attempted) {
            Self::Completed
        } else if quiz.is_expired(now_ms) {
            Self::Expired
        } else {
            Self::Available
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Expired => "Expired",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Excellent,
    Good,
    Passed,
    NeedsPractice,
}

impl Verdict {
    pub fn from_percentage(percentage: u64) -> Self {
        match percentage {
            90.. => Self::Excellent,
            70.. => Self::Good,
            50.. => Self::Passed,
            _ => Self::NeedsPractice,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent work!",
            Self::Good => "Good job!",
            Self::Passed => "You passed, but there's room for improvement.",
            Self::NeedsPractice => "You might need more practice.",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Self::Excellent => "You've mastered this material!",
            Self::Good => "You have a good understanding of the material.",
            Self::Passed => "Keep studying to improve your knowledge.",
            Self::NeedsPractice => "Consider reviewing the material and retaking the quiz.",
        }
    }

    /// Whether the result is shown as a success
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Excellent | Self::Good)
    }
}

/// A scored attempt as shown to the student
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResultView {
    pub quiz_title: String,
    pub score: u64,
    pub total_questions: u64,
    pub percentage: u64,
    pub attempted_at: u64,
    pub verdict: Verdict,
}

impl QuizResultView {
    pub fn new(quiz_title: impl Into<String>, result: &QuizResult) -> Self {
        let percentage = result.percentage();
        Self {
            quiz_title: quiz_title.into(),
            score: result.score,
            total_questions: result.total_questions,
            percentage,
            attempted_at: result.attempted_at,
            verdict: Verdict::from_percentage(percentage),
        }
    }
}

/// One row of the teacher's results table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentQuizResult {
    pub name: String,
    pub address: ContractAddress,
    pub score: u64,
    pub total_questions: u64,
    pub attempted_at: u64,
}

impl StudentQuizResult {
    pub fn percentage(&self) -> u64 {
        QuizResult {
            has_attempted: true,
            score: self.score,
            attempted_at: self.attempted_at,
            total_questions: self.total_questions,
        }
        .percentage()
    }
}
