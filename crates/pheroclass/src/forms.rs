//! Dashboard forms
//!
//! Each form validates minimally and turns into a typed submission. The
//! contracts remain the authority on anything beyond presence and shape.

use pheroclass_classroom::{ContractAddress, NewQuiz, QuestionDraft};
use thiserror::Error;

/// Largest note document accepted for upload
pub const MAX_NOTE_FILE_BYTES: usize = 10 * 1024 * 1024;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Digits ether has after the decimal point
const ETHER_DECIMALS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill all the required fields")]
    MissingFields,

    #[error("Please fill all question texts and options")]
    IncompleteQuestions,

    #[error("Please upload a PDF file")]
    InvalidFileType,

    #[error("Maximum file size is 10MB")]
    FileTooLarge,

    #[error("Please fill in all fields and select a PDF file")]
    MissingUpload,

    #[error("Invalid {field}: {message}")]
    Invalid { field: String, message: String },
}

impl FormError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// A form that can be submitted
pub trait Form {
    type Submission;

    fn submission(&self) -> Result<Self::Submission, FormError>;
}

/// A form together with its submitting flag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState<F> {
    form: F,
    submitting: bool,
}

impl<F: Form> FormState<F> {
    pub fn new(form: F) -> Self {
        Self {
            form,
            submitting: false,
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    /// Editing is refused while a submission is in flight
    pub fn form_mut(&mut self) -> Option<&mut F> {
        if self.submitting { None } else { Some(&mut self.form) }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validate and flag the form as submitting
    pub fn begin_submit(&mut self) -> Result<F::Submission, FormError> {
        let submission = self.form.submission()?;
        self.submitting = true;
        Ok(submission)
    }

    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }
}

fn required(value: &str) -> Result<String, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FormError::MissingFields)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Check an ether amount typed by the user
///
/// Accepts plain decimal notation with at most 18 fractional digits and a
/// value above zero. Returns the trimmed input.
pub fn validate_price(price: &str) -> Result<String, FormError> {
    let price = price.trim();
    if price.is_empty() {
        return Err(FormError::MissingFields);
    }

    let (whole, fraction) = price.split_once('.').unwrap_or((price, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(FormError::invalid("price", "not a number"));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(FormError::invalid("price", format!("'{}' is not a decimal amount", price)));
    }
    if fraction.len() > ETHER_DECIMALS {
        return Err(FormError::invalid("price", "at most 18 decimal places"));
    }
    if whole.chars().chain(fraction.chars()).all(|c| c == '0') {
        return Err(FormError::invalid("price", "must be greater than zero"));
    }
    Ok(price.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateClassForm {
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClass {
    pub name: String,
    pub symbol: String,
}

impl Form for CreateClassForm {
    type Submission = NewClass;

    fn submission(&self) -> Result<NewClass, FormError> {
        Ok(NewClass {
            name: required(&self.name)?,
            symbol: required(&self.symbol)?,
        })
    }
}

/// Enrollment of one student
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub address: String,
    pub name: String,
    /// Free-form notes kept by the teacher; not stored on-chain
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub address: ContractAddress,
    pub name: String,
}

impl Form for StudentForm {
    type Submission = Enrollment;

    fn submission(&self) -> Result<Enrollment, FormError> {
        let address = required(&self.address)?;
        let address = ContractAddress::parse(&address)
            .map_err(|e| FormError::invalid("student address", e.to_string()))?;
        Ok(Enrollment {
            address,
            name: required(&self.name)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LectureForm {
    pub topic: String,
}

impl Form for LectureForm {
    type Submission = String;

    fn submission(&self) -> Result<String, FormError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(FormError::invalid("lecture", "Lecture topic is required."));
        }
        Ok(topic.to_string())
    }
}

fn blank_question() -> QuestionDraft {
    QuestionDraft::new("", vec![String::new(), String::new()], 0)
}

/// Quiz editor: metadata plus an editable list of questions
///
/// Starts with one blank two-option question. The last question cannot be
/// removed and no question drops below two options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateQuizForm {
    pub title: String,
    pub description: String,
    /// Expiry as unix milliseconds
    pub expires_at: Option<u64>,
    pub lecture_id: Option<u64>,
    questions: Vec<QuestionDraft>,
}

impl Default for CreateQuizForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            expires_at: None,
            lecture_id: None,
            questions: vec![blank_question()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSubmission {
    pub quiz: NewQuiz,
    pub questions: Vec<QuestionDraft>,
}

impl CreateQuizForm {
    pub fn questions(&self) -> &[QuestionDraft] {
        &self.questions
    }

    pub fn add_question(&mut self) {
        self.questions.push(blank_question());
    }

    pub fn remove_question(&mut self, index: usize) {
        if self.questions.len() > 1 && index < self.questions.len() {
            self.questions.remove(index);
        }
    }

    pub fn set_question_text(&mut self, index: usize, text: impl Into<String>) {
        if let Some(question) = self.questions.get_mut(index) {
            question.text = text.into();
        }
    }

    pub fn add_option(&mut self, question: usize) {
        if let Some(question) = self.questions.get_mut(question) {
            question.options.push(String::new());
        }
    }

    pub fn set_option(&mut self, question: usize, option: usize, text: impl Into<String>) {
        if let Some(slot) = self
            .questions
            .get_mut(question)
            .and_then(|q| q.options.get_mut(option))
        {
            *slot = text.into();
        }
    }

    /// Remove an option, keeping the correct answer pointing at the same text
    ///
    /// Removing the correct option itself resets the answer to the first option.
    pub fn remove_option(&mut self, question: usize, option: usize) {
        let Some(question) = self.questions.get_mut(question) else {
            return;
        };
        if question.options.len() <= 2 || option >= question.options.len() {
            return;
        }
        question.options.remove(option);
        if option == question.correct_option_index {
            question.correct_option_index = 0;
        } else if option < question.correct_option_index {
            question.correct_option_index -= 1;
        }
    }

    pub fn set_correct_option(&mut self, question: usize, option: usize) {
        if let Some(question) = self.questions.get_mut(question) {
            if option < question.options.len() {
                question.correct_option_index = option;
            }
        }
    }

    /// Swap in generated questions; an empty list leaves the editor as is
    pub fn replace_questions(&mut self, questions: Vec<QuestionDraft>) {
        if !questions.is_empty() {
            self.questions = questions;
        }
    }
}

impl Form for CreateQuizForm {
    type Submission = QuizSubmission;

    fn submission(&self) -> Result<QuizSubmission, FormError> {
        let title = required(&self.title)?;
        let description = required(&self.description)?;
        let expires_at = self.expires_at.ok_or(FormError::MissingFields)?;
        let lecture_id = self
            .lecture_id
            .filter(|id| *id > 0)
            .ok_or(FormError::MissingFields)?;

        if self
            .questions
            .iter()
            .any(|q| q.text.trim().is_empty() || q.options.iter().any(|o| o.trim().is_empty()))
        {
            return Err(FormError::IncompleteQuestions);
        }
        for question in &self.questions {
            question
                .validate()
                .map_err(|e| FormError::invalid("question", e.to_string()))?;
        }

        Ok(QuizSubmission {
            quiz: NewQuiz {
                title,
                description,
                expires_at,
                lecture_id,
            },
            questions: self.questions.clone(),
        })
    }
}

/// A document picked for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl NoteFile {
    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / (1024.0 * 1024.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadNotesForm {
    pub title: String,
    pub description: String,
    /// Price in ether
    pub price: String,
    pub lecture_id: Option<u64>,
    file: Option<NoteFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteUpload {
    pub file: NoteFile,
    pub title: String,
    pub description: String,
    pub price: String,
    pub lecture_id: u64,
}

impl UploadNotesForm {
    /// Attach a document; anything but a PDF of at most 10MB is refused
    /// and leaves the previous selection in place
    pub fn attach(&mut self, file: NoteFile) -> Result<(), FormError> {
        if file.content_type != PDF_CONTENT_TYPE {
            return Err(FormError::InvalidFileType);
        }
        if file.bytes.len() > MAX_NOTE_FILE_BYTES {
            return Err(FormError::FileTooLarge);
        }
        self.file = Some(file);
        Ok(())
    }

    pub fn file(&self) -> Option<&NoteFile> {
        self.file.as_ref()
    }
}

impl Form for UploadNotesForm {
    type Submission = NoteUpload;

    fn submission(&self) -> Result<NoteUpload, FormError> {
        let missing = |_| FormError::MissingUpload;
        let file = self.file.clone().ok_or(FormError::MissingUpload)?;
        let title = required(&self.title).map_err(missing)?;
        let description = required(&self.description).map_err(missing)?;
        let lecture_id = self
            .lecture_id
            .filter(|id| *id > 0)
            .ok_or(FormError::MissingUpload)?;
        let price = match validate_price(&self.price) {
            Err(FormError::MissingFields) => return Err(FormError::MissingUpload),
            other => other?,
        };

        Ok(NoteUpload {
            file,
            title,
            description,
            price,
            lecture_id,
        })
    }
}

/// New price for a note the user created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceForm {
    pub price: String,
}

impl Form for PriceForm {
    type Submission = String;

    fn submission(&self) -> Result<String, FormError> {
        validate_price(&self.price)
    }
}
