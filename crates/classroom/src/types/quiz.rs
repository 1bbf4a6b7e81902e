//! Quiz types

use serde::{Deserialize, Serialize};

use super::ContractAddress;
use crate::error::ClassroomError;

/// A quiz contract deployed by the quiz factory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizContractInfo {
    pub address: ContractAddress,
    pub owner: ContractAddress,
    pub created_at: u64,
}

/// A quiz inside a quiz contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub created_at: u64,
    /// Expiry as given at creation (milliseconds since the epoch)
    pub expires_at: u64,
    pub lecture_id: u64,
    pub is_active: bool,
    pub question_count: u64,
}

impl Quiz {
    /// Past its expiry at `now_ms` (milliseconds since the epoch)
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at
    }
}

/// A question as shown to a student; the correct option stays on-chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub text: String,
    pub options: Vec<String>,
}

/// A question as authored by the teacher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
}

impl QuestionDraft {
    pub fn new(text: impl Into<String>, options: Vec<String>, correct_option_index: usize) -> Self {
        Self {
            text: text.into(),
            options,
            correct_option_index,
        }
    }

    /// Two or more non-empty options, non-empty text, correct index in range
    pub fn validate(&self) -> Result<(), ClassroomError> {
        if self.text.trim().is_empty() {
            return Err(ClassroomError::invalid_parameter("question", "text cannot be empty"));
        }
        if self.options.len() < 2 {
            return Err(ClassroomError::invalid_parameter(
                "question",
                "at least two options are required",
            ));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(ClassroomError::invalid_parameter("question", "options cannot be empty"));
        }
        if self.correct_option_index >= self.options.len() {
            return Err(ClassroomError::invalid_parameter(
                "question",
                format!(
                    "correct option {} out of range for {} options",
                    self.correct_option_index,
                    self.options.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Input for creating a quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuiz {
    pub title: String,
    pub description: String,
    pub expires_at: u64,
    pub lecture_id: u64,
}

/// A student's recorded attempt at a quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizResult {
    pub has_attempted: bool,
    pub score: u64,
    pub attempted_at: u64,
    pub total_questions: u64,
}

impl QuizResult {
    /// Score as a rounded percentage; 0 for a quiz with no questions
    pub fn percentage(&self) -> u64 {
        if self.total_questions == 0 {
            return 0;
        }
        ((self.score as f64 / self.total_questions as f64) * 100.0).round() as u64
    }
}
