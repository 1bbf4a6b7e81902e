//! Quiz question generation through a chat completions API
//!
//! The model is asked for a JSON document shaped like
//! `{"questions": [{"question": "…", "answers": {"<option>": "correct" | "incorrect"}}]}`.
//! Nothing enforces that shape, so the reply is parsed best-effort and any
//! deviation fails the whole generation.

use async_trait::async_trait;
use pheroclass_classroom::QuestionDraft;
use serde::Deserialize;
use serde_json::{Value, json};
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

#[derive(Debug, Error)]
pub enum QuizGenError {
    #[error("No API key configured for quiz generation (set QUIZGEN_API_KEY)")]
    MissingApiKey,

    #[error("Quiz generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Quiz generation failed with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("The reply is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("The reply has no questions")]
    MissingQuestions,

    #[error("Question {index} is malformed: {message}")]
    MalformedQuestion { index: usize, message: String },
}

pub type Result<T> = std::result::Result<T, QuizGenError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizGenConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub question_count: usize,
    pub options_per_question: usize,
    pub timeout_secs: u64,
}

impl Default for QuizGenConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            question_count: 5,
            options_per_question: 4,
            timeout_secs: 60,
        }
    }
}

impl QuizGenConfig {
    /// Defaults overridden by `QUIZGEN_ENDPOINT`, `QUIZGEN_MODEL` and `QUIZGEN_API_KEY`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: env::var("QUIZGEN_ENDPOINT").unwrap_or(defaults.endpoint),
            model: env::var("QUIZGEN_MODEL").unwrap_or(defaults.model),
            api_key: env::var("QUIZGEN_API_KEY").ok().filter(|k| !k.is_empty()),
            ..defaults
        }
    }

    /// The instruction sent to the model
    pub fn prompt(&self, title: &str, description: &str) -> String {
        format!(
            "Generate me a quiz with {count} questions, {options} answers each, one correct. \
             It should be in JSON format. Title: {title}, Description: {description}. \
             Only return the required JSON and nothing else, a sample json is \
             {{\"questions\": [{{\"question\": \"What is linux?\", \"answers\": {{\"Bill Gates\": \"incorrect\", \
             \"Linus Torvalds\": \"correct\", \"Steve Jobs\": \"incorrect\", \"Mark Zuckerberg\": \"incorrect\"}}}}]}}. \
             The answers object maps the actual answer text to \"correct\" or \"incorrect\"; \
             do not use placeholder keys like answer1 or answer2.",
            count = self.question_count,
            options = self.options_per_question,
        )
    }
}

/// Source of generated questions
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, title: &str, description: &str) -> Result<Vec<QuestionDraft>>;
}

/// Remove a Markdown code fence around the reply, with or without a language tag
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(newline) if rest[..newline].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[newline + 1..],
        _ => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

/// Turn the model's reply into question drafts
///
/// Option order follows the order of the `answers` object in the reply.
pub fn parse_reply(content: &str) -> Result<Vec<QuestionDraft>> {
    let body = strip_code_fences(content);
    let value: Value = serde_json::from_str(body).map_err(|e| QuizGenError::InvalidJson(e.to_string()))?;

    let entries = match value.get("questions") {
        Some(Value::Array(items)) => items.clone(),
        Some(single @ Value::Object(_)) => vec![single.clone()],
        _ => return Err(QuizGenError::MissingQuestions),
    };
    if entries.is_empty() {
        return Err(QuizGenError::MissingQuestions);
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_question(index, entry))
        .collect()
}

fn parse_question(index: usize, entry: &Value) -> Result<QuestionDraft> {
    let malformed = |message: &str| QuizGenError::MalformedQuestion {
        index,
        message: message.to_string(),
    };

    let text = entry
        .get("question")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| malformed("missing question text"))?;
    let answers = entry
        .get("answers")
        .and_then(Value::as_object)
        .ok_or_else(|| malformed("missing answers"))?;

    let options: Vec<String> = answers.keys().cloned().collect();
    let correct = answers
        .values()
        .position(|v| v.as_str().is_some_and(|s| s.trim().eq_ignore_ascii_case("correct")))
        .ok_or_else(|| malformed("no answer marked correct"))?;

    let draft = QuestionDraft::new(text.trim(), options, correct);
    draft.validate().map_err(|e| malformed(&e.to_string()))?;
    Ok(draft)
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Chat completions client
pub struct QuizGenClient {
    config: QuizGenConfig,
    client: reqwest::Client,
}

impl QuizGenClient {
    pub fn new(config: QuizGenConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &QuizGenConfig {
        &self.config
    }
}

#[async_trait]
impl QuestionGenerator for QuizGenClient {
    async fn generate(&self, title: &str, description: &str) -> Result<Vec<QuestionDraft>> {
        let api_key = self.config.api_key.as_deref().ok_or(QuizGenError::MissingApiKey)?;
        let prompt = self.config.prompt(title, description);
        debug!("Quiz generation prompt: {}", prompt);

        let request_body = json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Quiz generation failed with status {}", status);
            return Err(QuizGenError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatResponse = response.json().await?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(QuizGenError::MissingQuestions)?;
        debug!("Quiz generation reply: {}", content);

        let questions = parse_reply(&content)?;
        info!("Generated {} questions for quiz '{}'", questions.len(), title);
        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"```json
{
  "questions": [
    {
      "question": "What is Linux?",
      "answers": {
        "A browser": "incorrect",
        "An operating system kernel": "correct",
        "A database": "incorrect",
        "A compiler": "incorrect"
      }
    },
    {
      "question": "Who created Linux?",
      "answers": {
        "Linus Torvalds": "correct",
        "Bill Gates": "incorrect",
        "Steve Jobs": "incorrect",
        "Mark Zuckerberg": "incorrect"
      }
    }
  ]
}
```"#;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```{}```"), "{}");
    }

    #[test]
    fn test_parse_reply_keeps_option_order() {
        let questions = parse_reply(REPLY).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].text, "What is Linux?");
        assert_eq!(questions[0].options[0], "A browser");
        assert_eq!(questions[0].correct_option_index, 1);
        assert_eq!(questions[1].correct_option_index, 0);
    }

    #[test]
    fn test_single_question_object_is_accepted() {
        let reply = r#"{"questions": {"question": "2 + 2?", "answers": {"3": "incorrect", "4": "correct"}}}"#;
        let questions = parse_reply(reply).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_option_index, 1);
    }

    #[test]
    fn test_missing_questions_key_fails() {
        let reply = r#"{"quiz": [{"question": "2 + 2?", "answers": {"4": "correct", "5": "incorrect"}}]}"#;
        assert!(matches!(parse_reply(reply), Err(QuizGenError::MissingQuestions)));
        assert!(matches!(parse_reply(r#"{"questions": []}"#), Err(QuizGenError::MissingQuestions)));
    }

    #[test]
    fn test_malformed_entries_fail() {
        let no_correct = r#"{"questions": [{"question": "Q", "answers": {"a": "incorrect", "b": "incorrect"}}]}"#;
        assert!(matches!(
            parse_reply(no_correct),
            Err(QuizGenError::MalformedQuestion { index: 0, .. })
        ));

        let no_text = r#"{"questions": [{"answers": {"a": "correct", "b": "incorrect"}}]}"#;
        assert!(matches!(parse_reply(no_text), Err(QuizGenError::MalformedQuestion { .. })));

        assert!(matches!(parse_reply("Sure! Here is your quiz."), Err(QuizGenError::InvalidJson(_))));
    }

    #[test]
    fn test_prompt_mentions_counts_and_topic() {
        let prompt = QuizGenConfig::default().prompt("Rust", "Ownership basics");
        assert!(prompt.contains("5 questions, 4 answers each"));
        assert!(prompt.contains("Title: Rust, Description: Ownership basics"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_reported_before_sending() {
        let client = QuizGenClient::new(QuizGenConfig::default()).unwrap();
        assert!(matches!(
            client.generate("Rust", "Ownership").await,
            Err(QuizGenError::MissingApiKey)
        ));
    }
}
