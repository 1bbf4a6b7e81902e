//! Student dashboard
//!
//! Classes the account is enrolled in, attendance check-in by QR code, quizzes
//! and the notes marketplace.

use pheroclass_classroom::{
    AttendanceReceipt, Classroom, ContractAddress, LectureKey, QuizKey, QuizResult, has_attended,
};
use pheroclass_storage::{DEFAULT_GATEWAY, FileStore};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{ClassBoard, LoadState, load_class, load_quizzes};
use crate::fanout::{DEFAULT_FETCH_CONCURRENCY, fan_out};
use crate::forms::UploadNotesForm;
use crate::marketplace::NotesBoard;
use crate::modal::{Modal, ModalHost};
use crate::qr::QrScanner;
use crate::quiz::{QUIZ_EXPIRED_MESSAGE, QuizResultView, QuizSession, QuizStatus, now_millis};
use crate::state::{BusySet, EntityMap, StatusMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StudentTab {
    #[default]
    Attendance,
    Quizzes,
    Notes,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum StudentAction {
    MarkAttendance(LectureKey),
    TakeQuiz(QuizKey),
    SubmitQuiz(QuizKey),
    RefreshQuizzes,
}

pub struct StudentDashboard {
    classroom: Arc<dyn Classroom>,
    account: ContractAddress,
    concurrency: usize,
    gateway: String,
    /// Wall clock in milliseconds, compared against quiz expiry
    clock: fn() -> u64,
    board: ClassBoard,
    tab: StudentTab,
    modal: ModalHost,
    status: Option<StatusMessage>,
    busy: BusySet<StudentAction>,
    /// Own attendance flags per class, in lecture order
    attendance: EntityMap<ContractAddress, Vec<bool>>,
    quiz_results: EntityMap<QuizKey, QuizResult>,
    notes_boards: EntityMap<ContractAddress, NotesBoard>,
}

impl StudentDashboard {
    pub fn new(classroom: Arc<dyn Classroom>, account: ContractAddress) -> Self {
        Self {
            classroom,
            account,
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            gateway: DEFAULT_GATEWAY.to_string(),
            clock: now_millis,
            board: ClassBoard::default(),
            tab: StudentTab::default(),
            modal: ModalHost::new(),
            status: None,
            busy: BusySet::new(),
            attendance: EntityMap::new(),
            quiz_results: EntityMap::new(),
            notes_boards: EntityMap::new(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = gateway.into();
        self
    }

    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    pub fn account(&self) -> &ContractAddress {
        &self.account
    }

    pub fn board(&self) -> &ClassBoard {
        &self.board
    }

    pub fn select_class(&mut self, class: &ContractAddress) -> bool {
        self.board.select_class(class)
    }

    pub fn tab(&self) -> StudentTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: StudentTab) {
        self.tab = tab;
    }

    pub fn modal(&self) -> &ModalHost {
        &self.modal
    }

    pub fn modal_mut(&mut self) -> &mut ModalHost {
        &mut self.modal
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn is_busy(&self, action: &StudentAction) -> bool {
        self.busy.is_busy(action)
    }

    pub fn is_idle(&self) -> bool {
        self.busy.is_idle() && self.notes_boards.iter().all(|(_, b)| !b.is_uploading())
    }

    pub fn has_attended(&self, lecture: &LectureKey) -> bool {
        self.attendance
            .get(&lecture.class)
            .is_some_and(|flags| has_attended(flags, lecture.lecture_id))
    }

    pub fn quiz_result(&self, quiz: &QuizKey) -> Option<&QuizResult> {
        self.quiz_results.get(quiz)
    }

    /// Listing status of a loaded quiz
    pub fn quiz_status(&self, quiz: &QuizKey) -> Option<QuizStatus> {
        let details = self.board.quiz(quiz)?;
        Some(QuizStatus::of(details, self.quiz_results.get(quiz), (self.clock)()))
    }

    fn is_expired(&self, quiz: &QuizKey) -> bool {
        self.board.quiz(quiz).is_some_and(|q| q.is_expired((self.clock)()))
    }

    fn quiz_title(&self, quiz: &QuizKey) -> String {
        self.board
            .quiz(quiz)
            .map(|q| q.title.clone())
            .unwrap_or_else(|| format!("Quiz {}", quiz.quiz_id))
    }

    // ===== Loading =====

    /// Load the classes the account may attend and everything read per class
    pub async fn load(&mut self) {
        self.board.load_state = LoadState::Loading;
        let classes = match self.classroom.fetch_eligible_classes(&self.account).await {
            Ok(classes) => classes,
            Err(e) => {
                error!("Failed to load classes of {}: {}", self.account, e);
                self.board.load_state = if self.board.classes.is_empty() {
                    LoadState::Empty
                } else {
                    LoadState::Loaded
                };
                self.status = Some(StatusMessage::from_error(
                    "Failed to load classes. Please refresh the page.",
                    &e,
                ));
                return;
            }
        };
        info!("{} is enrolled in {} classes", self.account, classes.len());
        let addresses: Vec<ContractAddress> = classes.iter().map(|c| c.address.clone()).collect();
        self.board.set_classes(classes);

        let classroom = self.classroom.as_ref();
        let concurrency = self.concurrency;
        let snapshots = fan_out("class", addresses.clone(), concurrency, |class| async move {
            load_class(classroom, &class, concurrency).await
        })
        .await;
        for (class, snapshot) in snapshots {
            self.board.apply(class, snapshot);
        }

        let attendance = fan_out("attendance", addresses, concurrency, |class| async move {
            classroom.fetch_own_attendance(&class).await
        })
        .await;
        for (class, flags) in attendance {
            self.attendance.insert(class, flags);
        }

        self.load_quiz_results().await;
        self.sync_notes_boards().await;
    }

    /// Read the account's result for every known quiz
    async fn load_quiz_results(&mut self) {
        let quizzes: Vec<QuizKey> = self
            .board
            .quizzes
            .iter()
            .flat_map(|(contract, list)| list.iter().map(|q| QuizKey::new(contract.clone(), q.id)))
            .collect();
        let classroom = self.classroom.as_ref();
        let account = &self.account;
        let results = fan_out("quiz result", quizzes, self.concurrency, |quiz| async move {
            classroom.fetch_quiz_result(&quiz.contract, quiz.quiz_id, account).await
        })
        .await;
        for (quiz, result) in results {
            self.quiz_results.insert(quiz, result);
        }
    }

    async fn sync_notes_boards(&mut self) {
        let contracts: Vec<(ContractAddress, ContractAddress)> = self
            .board
            .notes_contracts
            .iter()
            .map(|(class, notes)| (class.clone(), notes.clone()))
            .collect();
        for (class, notes_contract) in contracts {
            let stale = self
                .notes_boards
                .get(&class)
                .is_none_or(|b| b.notes_contract() != &notes_contract);
            if stale {
                let board = NotesBoard::new(self.classroom.clone(), notes_contract, self.account.clone())
                    .with_gateway(self.gateway.clone())
                    .with_concurrency(self.concurrency);
                self.notes_boards.insert(class.clone(), board);
            }
            if let Some(board) = self.notes_boards.get_mut(&class) {
                board.refresh_marketplace(None).await;
                board.refresh_my_notes().await;
            }
        }
    }

    async fn refresh_attendance(&mut self, class: &ContractAddress) {
        match self.classroom.fetch_own_attendance(class).await {
            Ok(flags) => {
                self.attendance.insert(class.clone(), flags);
            }
            Err(e) => warn!("Failed to refresh attendance of {}: {}", class, e),
        }
    }

    // ===== Attendance =====

    pub async fn mark_attendance(&mut self, lecture: LectureKey) -> Option<AttendanceReceipt> {
        let action = StudentAction::MarkAttendance(lecture.clone());
        if !self.busy.begin(action.clone()) {
            return None;
        }
        let outcome = self
            .classroom
            .mark_attendance(&lecture.class, lecture.lecture_id)
            .await;
        self.busy.finish(&action);

        match outcome {
            Ok(receipt) => {
                info!("Marked attendance for {} in {}", lecture, receipt.tx_hash);
                self.status = Some(StatusMessage::success("Attendance marked successfully!"));
                self.refresh_attendance(&lecture.class).await;
                Some(receipt)
            }
            Err(e) => {
                error!("Failed to mark attendance for {}: {}", lecture, e);
                self.status = Some(StatusMessage::error(e.user_message()));
                None
            }
        }
    }

    pub fn open_qr_scanner(&mut self) {
        self.modal.open(Modal::QrScanner(QrScanner::new()));
    }

    /// Handle one read from the scanner
    ///
    /// A valid code for the selected class closes the scanner and marks
    /// attendance. An unreadable code leaves the scanner open in its failed
    /// state; a code for another class closes it. Neither writes anything.
    pub async fn scan_qr(&mut self, raw: &str) -> Option<AttendanceReceipt> {
        let scanned = self.modal.scanner_mut()?.scan(raw)?;
        let payload = match scanned {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Unusable attendance code: {}", e);
                self.status = Some(StatusMessage::error(e.to_string()));
                return None;
            }
        };

        self.modal.close();
        if self.board.selected_class.as_ref() != Some(&payload.class_address) {
            warn!(
                "Attendance code for {} scanned while {:?} is selected",
                payload.class_address, self.board.selected_class
            );
            self.status = Some(StatusMessage::error(
                "The scanned QR code is for a different class than the one you have selected.",
            ));
            return None;
        }
        self.mark_attendance(LectureKey::new(payload.class_address, payload.lecture_id))
            .await
    }

    pub fn camera_error(&mut self, message: &str) {
        warn!("Camera unavailable: {}", message);
        if let Some(scanner) = self.modal.scanner_mut() {
            scanner.camera_failed(message);
        }
        self.status = Some(StatusMessage::error(
            "Error accessing camera. Please check camera permissions and try again.",
        ));
    }

    pub fn retry_scan(&mut self) {
        if let Some(scanner) = self.modal.scanner_mut() {
            scanner.retry();
        }
    }

    // ===== Quizzes =====

    /// Start a quiz, or show the result when it was already attempted
    ///
    /// A quiz is attempted at most once, so questions are only read for a
    /// quiz without a recorded attempt. An expired quiz is refused without
    /// reading anything.
    pub async fn take_quiz(&mut self, quiz: QuizKey) {
        if self.quiz_results.get(&quiz).is_some_and(|r| r.has_attempted) {
            self.show_result(&quiz);
            return;
        }
        if self.is_expired(&quiz) {
            warn!("Refusing to start expired {}", quiz);
            self.status = Some(StatusMessage::error(QUIZ_EXPIRED_MESSAGE));
            return;
        }
        if self.attempted(&quiz).await {
            self.show_result(&quiz);
            return;
        }
        let action = StudentAction::TakeQuiz(quiz.clone());
        if !self.busy.begin(action.clone()) {
            return;
        }
        let outcome = self.classroom.fetch_quiz_questions(&quiz.contract, quiz.quiz_id).await;
        self.busy.finish(&action);

        match outcome {
            Ok(questions) => {
                debug!("Starting {} with {} questions", quiz, questions.len());
                let title = self.quiz_title(&quiz);
                self.modal.open(Modal::TakeQuiz {
                    quiz,
                    title,
                    session: QuizSession::start(questions),
                });
            }
            Err(e) => {
                error!("Failed to load questions of {}: {}", quiz, e);
                self.status = Some(StatusMessage::from_error(
                    "Failed to load quiz questions. Please try again.",
                    &e,
                ));
            }
        }
    }

    /// Whether the account has a recorded attempt, asking the chain when unknown
    async fn attempted(&mut self, quiz: &QuizKey) -> bool {
        if self.quiz_results.get(quiz).is_some_and(|r| r.has_attempted) {
            return true;
        }
        match self
            .classroom
            .fetch_quiz_result(&quiz.contract, quiz.quiz_id, &self.account)
            .await
        {
            Ok(result) => {
                self.quiz_results.insert(quiz.clone(), result);
                result.has_attempted
            }
            Err(e) => {
                warn!("Failed to read result of {}: {}", quiz, e);
                false
            }
        }
    }

    fn show_result(&mut self, quiz: &QuizKey) {
        if let Some(result) = self.quiz_results.get(quiz).copied() {
            let view = QuizResultView::new(self.quiz_title(quiz), &result);
            self.modal.open(Modal::QuizResult(view));
        }
    }

    /// Answer a question of the quiz being taken
    pub fn answer(&mut self, question: usize, option: u64) {
        let Some((_, session)) = self.modal.quiz_session_mut() else {
            return;
        };
        if let Err(e) = session.answer(question, option) {
            self.status = Some(StatusMessage::error(e.to_string()));
        }
    }

    /// Send the answers of the quiz being taken in one write
    ///
    /// Nothing is sent while a question is unanswered or once the quiz has
    /// expired. A failed write keeps the answers so the student can submit
    /// again.
    pub async fn submit_quiz(&mut self) -> Option<QuizResult> {
        let (quiz, answers) = {
            let (quiz, session) = self.modal.quiz_session_mut()?;
            match session.completed_answers() {
                Ok(answers) => (quiz.clone(), answers),
                Err(e) => {
                    self.status = Some(StatusMessage::error(e.to_string()));
                    return None;
                }
            }
        };
        if self.is_expired(&quiz) {
            warn!("Refusing to submit expired {}", quiz);
            self.status = Some(StatusMessage::error(QUIZ_EXPIRED_MESSAGE));
            return None;
        }
        let action = StudentAction::SubmitQuiz(quiz.clone());
        if !self.busy.begin(action.clone()) {
            return None;
        }
        let outcome = self
            .classroom
            .submit_quiz(&quiz.contract, quiz.quiz_id, &answers)
            .await;
        self.busy.finish(&action);

        if let Err(e) = outcome {
            error!("Failed to submit {}: {}", quiz, e);
            self.status = Some(StatusMessage::from_error("Failed to submit quiz. Please try again.", &e));
            return None;
        }
        info!("Submitted {} answers for {}", answers.len(), quiz);
        if let Some((_, session)) = self.modal.quiz_session_mut() {
            if let Err(e) = session.submit() {
                debug!("Quiz session already left progress: {}", e);
            }
        }

        match self
            .classroom
            .fetch_quiz_result(&quiz.contract, quiz.quiz_id, &self.account)
            .await
        {
            Ok(result) => {
                self.quiz_results.insert(quiz.clone(), result);
                if let Some((_, session)) = self.modal.quiz_session_mut() {
                    session.scored(result);
                }
                self.show_result(&quiz);
                Some(result)
            }
            Err(e) => {
                warn!("Submitted {} but could not read the result: {}", quiz, e);
                self.modal.close();
                self.status = Some(StatusMessage::success("Quiz submitted successfully!"));
                None
            }
        }
    }

    pub async fn view_quiz_result(&mut self, quiz: &QuizKey) {
        if self.attempted(quiz).await {
            self.show_result(quiz);
        } else {
            self.status = Some(StatusMessage::info("You haven't attempted this quiz yet."));
        }
    }

    /// Re-read the quizzes and own results of `class`
    pub async fn refresh_quizzes(&mut self, class: &ContractAddress) {
        let action = StudentAction::RefreshQuizzes;
        if !self.busy.begin(action.clone()) {
            return;
        }
        let outcome = self.classroom.fetch_class_quiz_contracts(class).await;
        self.busy.finish(&action);

        match outcome {
            Ok(contracts) => {
                let quizzes = load_quizzes(self.classroom.as_ref(), contracts.clone(), self.concurrency).await;
                self.board.quiz_contracts.insert(class.clone(), contracts);
                for (contract, list) in quizzes {
                    self.board.quizzes.insert(contract, list);
                }
                self.load_quiz_results().await;
                self.status = Some(StatusMessage::success("Quizzes refreshed successfully!"));
            }
            Err(e) => {
                error!("Failed to refresh quizzes of {}: {}", class, e);
                self.status = Some(StatusMessage::from_error(
                    "Failed to refresh quizzes. Please try again.",
                    &e,
                ));
            }
        }
    }

    // ===== Notes =====

    pub fn notes_board(&self, class: &ContractAddress) -> Option<&NotesBoard> {
        self.notes_boards.get(class)
    }

    /// The notes board of `class`, flagging classes without one
    pub fn notes_board_mut(&mut self, class: &ContractAddress) -> Option<&mut NotesBoard> {
        if !self.notes_boards.contains(class) {
            self.status = Some(StatusMessage::error("Notes feature is not available for this class."));
            return None;
        }
        self.notes_boards.get_mut(class)
    }

    pub fn open_upload_notes(&mut self, class: &ContractAddress) -> bool {
        let Some(notes_contract) = self.board.notes_contract_of(class).cloned() else {
            self.status = Some(StatusMessage::error("Notes feature is not available for this class."));
            return false;
        };
        self.modal.open(Modal::UploadNotes { notes_contract });
        true
    }

    /// Upload notes for `class`; the popup closes once the note exists
    pub async fn upload_notes(
        &mut self,
        class: &ContractAddress,
        store: &dyn FileStore,
        form: &UploadNotesForm,
    ) -> Option<u64> {
        let board = self.notes_board_mut(class)?;
        let created = board.upload(store, form).await;
        let failed = board.status().is_some_and(StatusMessage::is_error);
        if !failed {
            self.modal.close();
        }
        created
    }

    pub async fn purchase_note(&mut self, class: &ContractAddress, note_id: u64) {
        if let Some(board) = self.notes_board_mut(class) {
            board.purchase(note_id).await;
        }
    }
}
