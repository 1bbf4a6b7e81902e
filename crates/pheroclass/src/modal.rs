//! Popups shown over a dashboard
//!
//! At most one popup is open at a time. Each kind carries exactly the data
//! it shows.

use pheroclass_classroom::{AttendeeRecord, ContractAddress, LectureKey, QuizKey};

use crate::forms::{CreateQuizForm, FormState};
use crate::qr::{AttendancePayload, QrScanner};
use crate::quiz::{QuizResultView, QuizSession, StudentQuizResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    AddStudent {
        class: ContractAddress,
    },
    CreateClass,
    CreateQuiz {
        quiz_contract: ContractAddress,
        class: ContractAddress,
        form: FormState<CreateQuizForm>,
    },
    /// Teacher shows the check-in code of a lecture
    AttendanceQr {
        lecture: LectureKey,
        payload: AttendancePayload,
    },
    AttendanceRecords {
        lecture: LectureKey,
        records: Vec<AttendeeRecord>,
    },
    TakeQuiz {
        quiz: QuizKey,
        title: String,
        session: QuizSession,
    },
    QuizResult(QuizResultView),
    /// Every student's result for one quiz
    QuizResultsTable {
        quiz: QuizKey,
        title: String,
        rows: Vec<StudentQuizResult>,
    },
    UploadNotes {
        notes_contract: ContractAddress,
    },
    QrScanner(QrScanner),
    Loading {
        title: String,
        message: String,
    },
}

impl Modal {
    pub fn title(&self) -> String {
        match self {
            Self::AddStudent { .. } => "Add New Student".to_string(),
            Self::CreateClass => "Create New Class".to_string(),
            Self::CreateQuiz { .. } => "Create New Quiz".to_string(),
            Self::AttendanceQr { .. } => "Take Attendance".to_string(),
            Self::AttendanceRecords { .. } => "Attendance Records".to_string(),
            Self::TakeQuiz { title, .. } => format!("Quiz: {}", title),
            Self::QuizResult(view) => format!("Quiz Results: {}", view.quiz_title),
            Self::QuizResultsTable { title, .. } => format!("Results: {}", title),
            Self::UploadNotes { .. } => "Upload Notes".to_string(),
            Self::QrScanner(_) => "Scan Attendance QR Code".to_string(),
            Self::Loading { title, .. } => title.clone(),
        }
    }
}

/// Holds the open popup, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalHost {
    current: Option<Modal>,
}

impl ModalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `modal`, replacing whatever was open
    pub fn open(&mut self, modal: Modal) {
        self.current = Some(modal);
    }

    /// Close the popup, discarding its state
    pub fn close(&mut self) -> Option<Modal> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&Modal> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Modal> {
        self.current.as_mut()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn title(&self) -> Option<String> {
        self.current.as_ref().map(Modal::title)
    }

    pub fn quiz_form_mut(&mut self) -> Option<&mut FormState<CreateQuizForm>> {
        match self.current.as_mut() {
            Some(Modal::CreateQuiz { form, .. }) => Some(form),
            _ => None,
        }
    }

    pub fn quiz_session_mut(&mut self) -> Option<(&QuizKey, &mut QuizSession)> {
        match self.current.as_mut() {
            Some(Modal::TakeQuiz { quiz, session, .. }) => Some((quiz, session)),
            _ => None,
        }
    }

    pub fn scanner_mut(&mut self) -> Option<&mut QrScanner> {
        match self.current.as_mut() {
            Some(Modal::QrScanner(scanner)) => Some(scanner),
            _ => None,
        }
    }
}
