//! # PheroClass
//!
//! Client side of the PheroClass classroom: a teacher dashboard to run
//! classes, lectures, quizzes and note approval, and a student dashboard to
//! check in by QR code, take quizzes and trade notes.
//!
//! Everything on chain goes through the [`Classroom`] trait, so the
//! dashboards run unchanged against the Ethereum binding or a test double.
//!
//! ```no_run
//! use pheroclass::{StudentDashboard, WalletSession};
//! use pheroclass_ethereum::{EthereumClassroom, EthereumClassroomConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let classroom = Arc::new(EthereumClassroom::new(EthereumClassroomConfig::default())?);
//! let session = WalletSession::connect(classroom.as_ref()).await?;
//! let mut dashboard = StudentDashboard::new(classroom, session.account);
//! dashboard.load().await;
//! # Ok(())
//! # }
//! ```

pub mod dashboard;
pub mod export;
pub mod fanout;
pub mod forms;
pub mod marketplace;
pub mod modal;
pub mod qr;
pub mod quiz;
pub mod quizgen;
pub mod router;
pub mod state;
pub mod wallet;

pub use dashboard::{
    ClassBoard, LoadState, StudentAction, StudentDashboard, StudentTab, TeacherAction, TeacherDashboard,
    TeacherTab,
};
pub use forms::{
    CreateClassForm, CreateQuizForm, Form, FormError, FormState, LectureForm, NoteFile, PriceForm, StudentForm,
    UploadNotesForm,
};
pub use marketplace::{NoteAffordance, NoteListing, NotesBoard};
pub use modal::{Modal, ModalHost};
pub use qr::{AttendancePayload, QrScanner, ScanError, ScanState};
pub use quiz::{QuizFlowError, QuizResultView, QuizSession, QuizStatus, StudentQuizResult, Verdict};
pub use quizgen::{QuestionGenerator, QuizGenClient, QuizGenConfig, QuizGenError};
pub use router::{Role, Route, Router};
pub use state::{BusySet, EntityMap, StatusKind, StatusMessage};
pub use wallet::WalletSession;

pub use pheroclass_classroom::Classroom;
