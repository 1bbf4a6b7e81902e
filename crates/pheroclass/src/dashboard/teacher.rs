//! Teacher dashboard
//!
//! Classes owned by the account with their lectures, attendance, quizzes and
//! notes approval.

use pheroclass_classroom::{
    AttendeeRecord, Classroom, ClassroomError, ClassroomResult, ContractAddress, LectureKey, QuizKey,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{ClassBoard, LoadState, load_class, load_quizzes};
use crate::export::{attendance_csv, quiz_results_csv, quiz_results_file_name};
use crate::fanout::{DEFAULT_FETCH_CONCURRENCY, fan_out};
use crate::forms::{CreateClassForm, CreateQuizForm, Form, FormState, LectureForm, QuizSubmission, StudentForm};
use crate::marketplace::NotesBoard;
use crate::modal::{Modal, ModalHost};
use crate::qr::AttendancePayload;
use crate::quiz::StudentQuizResult;
use crate::quizgen::QuestionGenerator;
use crate::state::{BusySet, EntityMap, StatusMessage};
use pheroclass_storage::DEFAULT_GATEWAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TeacherTab {
    #[default]
    Lectures,
    Quizzes,
    Notes,
}

/// Writes and slow reads a teacher can start; each runs at most once at a time
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TeacherAction {
    CreateClass,
    AddStudent(ContractAddress),
    CreateLecture(ContractAddress),
    ViewAttendance(LectureKey),
    DeployQuizContract,
    LinkQuizContract(ContractAddress),
    RefreshQuizContracts,
    GenerateQuestions,
    CreateQuiz(ContractAddress),
    DeactivateQuiz(QuizKey),
    ViewQuizResults(QuizKey),
    CreateNotesContract(ContractAddress),
}

pub struct TeacherDashboard {
    classroom: Arc<dyn Classroom>,
    account: ContractAddress,
    concurrency: usize,
    gateway: String,
    board: ClassBoard,
    tab: TeacherTab,
    modal: ModalHost,
    status: Option<StatusMessage>,
    busy: BusySet<TeacherAction>,
    owned_quiz_contracts: Vec<ContractAddress>,
    attendance_records: EntityMap<LectureKey, Vec<AttendeeRecord>>,
    quiz_results: EntityMap<QuizKey, Vec<StudentQuizResult>>,
    notes_boards: EntityMap<ContractAddress, NotesBoard>,
}

impl TeacherDashboard {
    pub fn new(classroom: Arc<dyn Classroom>, account: ContractAddress) -> Self {
        Self {
            classroom,
            account,
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            gateway: DEFAULT_GATEWAY.to_string(),
            board: ClassBoard::default(),
            tab: TeacherTab::default(),
            modal: ModalHost::new(),
            status: None,
            busy: BusySet::new(),
            owned_quiz_contracts: Vec::new(),
            attendance_records: EntityMap::new(),
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

    pub fn account(&self) -> &ContractAddress {
        &self.account
    }

    pub fn board(&self) -> &ClassBoard {
        &self.board
    }

    pub fn select_class(&mut self, class: &ContractAddress) -> bool {
        self.board.select_class(class)
    }

    pub fn tab(&self) -> TeacherTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: TeacherTab) {
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

    pub fn is_busy(&self, action: &TeacherAction) -> bool {
        self.busy.is_busy(action)
    }

    /// Nothing is in flight
    pub fn is_idle(&self) -> bool {
        self.busy.is_idle() && self.notes_boards.iter().all(|(_, b)| !b.is_uploading())
    }

    /// Quiz contracts deployed by the account, linked or not
    pub fn owned_quiz_contracts(&self) -> &[ContractAddress] {
        &self.owned_quiz_contracts
    }

    pub fn attendance_records(&self, lecture: &LectureKey) -> Option<&[AttendeeRecord]> {
        self.attendance_records.get(lecture).map(Vec::as_slice)
    }

    pub fn quiz_results(&self, quiz: &QuizKey) -> Option<&[StudentQuizResult]> {
        self.quiz_results.get(quiz).map(Vec::as_slice)
    }

    pub fn notes_board(&self, class: &ContractAddress) -> Option<&NotesBoard> {
        self.notes_boards.get(class)
    }

    pub fn notes_board_mut(&mut self, class: &ContractAddress) -> Option<&mut NotesBoard> {
        self.notes_boards.get_mut(class)
    }

    fn fail(&mut self, fallback: &str, e: &ClassroomError) {
        self.status = Some(StatusMessage::from_error(fallback, e));
    }

    // ===== Loading =====

    /// Load the owned classes and everything read per class
    pub async fn load(&mut self) {
        self.board.load_state = LoadState::Loading;
        let classes = match self.classroom.fetch_owned_classes(&self.account).await {
            Ok(classes) => classes,
            Err(e) => {
                error!("Failed to load classes of {}: {}", self.account, e);
                self.board.load_state = if self.board.classes.is_empty() {
                    LoadState::Empty
                } else {
                    LoadState::Loaded
                };
                self.fail("Failed to load classes. Please refresh the page.", &e);
                return;
            }
        };
        info!("Loaded {} classes owned by {}", classes.len(), self.account);
        let addresses: Vec<ContractAddress> = classes.iter().map(|c| c.address.clone()).collect();
        self.board.set_classes(classes);

        let classroom = self.classroom.as_ref();
        let concurrency = self.concurrency;
        let snapshots = fan_out("class", addresses, concurrency, |class| async move {
            load_class(classroom, &class, concurrency).await
        })
        .await;
        for (class, snapshot) in snapshots {
            self.board.apply(class, snapshot);
        }

        match self.classroom.fetch_owner_quiz_contracts(&self.account).await {
            Ok(contracts) => self.owned_quiz_contracts = contracts,
            Err(e) => warn!("Failed to fetch quiz contracts of {}: {}", self.account, e),
        }
        self.sync_notes_boards().await;
    }

    /// Reload one class after a write touched it
    async fn refresh_class(&mut self, class: &ContractAddress) {
        match load_class(self.classroom.as_ref(), class, self.concurrency).await {
            Ok(snapshot) => self.board.apply(class.clone(), snapshot),
            Err(e) => warn!("Failed to refresh class {}: {}", class, e),
        }
    }

    /// Keep one notes board per class that has a notes contract
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
                board.refresh_all().await;
            }
        }
    }

    // ===== Classes and students =====

    pub fn open_create_class(&mut self) {
        self.modal.open(Modal::CreateClass);
    }

    pub async fn create_class(&mut self, form: &CreateClassForm) {
        let class = match form.submission() {
            Ok(class) => class,
            Err(e) => {
                self.status = Some(StatusMessage::error(e.to_string()));
                return;
            }
        };
        let action = TeacherAction::CreateClass;
        if !self.busy.begin(action.clone()) {
            return;
        }
        let outcome = self.classroom.create_class(&class.name, &class.symbol).await;
        self.busy.finish(&action);

        match outcome {
            Ok(tx_hash) => {
                info!("Created class {} ({}) in {}", class.name, class.symbol, tx_hash);
                self.modal.close();
                self.status = Some(StatusMessage::success(format!("Class {} created successfully!", class.name)));
                self.load().await;
            }
            Err(e) => {
                error!("Failed to create class {}: {}", class.name, e);
                self.fail("Failed to create class. Please try again.", &e);
            }
        }
    }

    pub fn open_add_student(&mut self, class: ContractAddress) {
        self.modal.open(Modal::AddStudent { class });
    }

    pub async fn add_student(&mut self, class: &ContractAddress, form: &StudentForm) {
        let enrollment = match form.submission() {
            Ok(enrollment) => enrollment,
            Err(e) => {
                self.status = Some(StatusMessage::error(e.to_string()));
                return;
            }
        };
        let action = TeacherAction::AddStudent(class.clone());
        if !self.busy.begin(action.clone()) {
            return;
        }
        let outcome = self
            .classroom
            .mint_student(class, &enrollment.address, &enrollment.name)
            .await;
        self.busy.finish(&action);

        match outcome {
            Ok(tx_hash) => {
                info!("Enrolled {} in {} with {}", enrollment.address, class, tx_hash);
                self.modal.close();
                self.status = Some(StatusMessage::success(format!(
                    "Student {} added successfully!",
                    enrollment.name
                )));
            }
            Err(e) => {
                error!("Failed to add student {} to {}: {}", enrollment.address, class, e);
                self.fail("Failed to add student. Please try again.", &e);
            }
        }
    }

    // ===== Lectures and attendance =====

    pub async fn create_lecture(&mut self, class: &ContractAddress, form: &LectureForm) {
        let topic = match form.submission() {
            Ok(topic) => topic,
            Err(e) => {
                self.status = Some(StatusMessage::error(e.to_string()));
                return;
            }
        };
        let action = TeacherAction::CreateLecture(class.clone());
        if !self.busy.begin(action.clone()) {
            return;
        }
        let outcome = self.classroom.create_lecture(class, &topic).await;
        self.busy.finish(&action);

        match outcome {
            Ok(tx_hash) => {
                info!("Created lecture '{}' in {} with {}", topic, class, tx_hash);
                self.status = Some(StatusMessage::success(format!(
                    "Lecture \"{}\" created successfully!",
                    topic
                )));
                self.refresh_class(class).await;
            }
            Err(e) => {
                error!("Failed to create lecture in {}: {}", class, e);
                self.fail("Failed to create lecture. Please try again.", &e);
            }
        }
    }

    /// Show the check-in code students scan for a lecture
    pub fn take_attendance(&mut self, lecture: LectureKey) {
        let payload = AttendancePayload::new(lecture.class.clone(), lecture.lecture_id);
        debug!("Showing attendance code {}", payload.encode());
        self.modal.open(Modal::AttendanceQr { lecture, payload });
    }

    pub async fn view_attendance(&mut self, lecture: LectureKey) {
        let action = TeacherAction::ViewAttendance(lecture.clone());
        if !self.busy.begin(action.clone()) {
            return;
        }
        self.modal.open(Modal::Loading {
            title: "Attendance Records".to_string(),
            message: "Loading attendance records...".to_string(),
        });
        let outcome = self
            .classroom
            .fetch_attendance_roster(&lecture.class, lecture.lecture_id)
            .await;
        self.busy.finish(&action);

        match outcome {
            Ok(records) => {
                debug!("{} attendees at {}", records.len(), lecture);
                self.attendance_records.insert(lecture.clone(), records.clone());
                self.modal.open(Modal::AttendanceRecords { lecture, records });
            }
            Err(e) => {
                error!("Failed to fetch attendance of {}: {}", lecture, e);
                self.modal.close();
                self.fail("Failed to fetch attendance records. Please try again.", &e);
            }
        }
    }

    /// CSV of a lecture's attendance, once loaded and not empty
    pub fn attendance_csv(&mut self, lecture: &LectureKey) -> Option<String> {
        match self.attendance_records.get(lecture) {
            Some(records) if !records.is_empty() => Some(attendance_csv(records)),
            _ => {
                self.status = Some(StatusMessage::error("No attendance records available to download."));
                None
            }
        }
    }

    // ===== Quiz contracts =====

    pub async fn deploy_quiz_contract(&mut self) -> Option<ContractAddress> {
        let action = TeacherAction::DeployQuizContract;
        if !self.busy.begin(action.clone()) {
            return None;
        }
        let outcome = self.classroom.create_quiz_contract(&self.account).await;
        self.busy.finish(&action);

        match outcome {
            Ok(Some(contract)) => {
                info!("Deployed quiz contract {}", contract);
                self.status = Some(StatusMessage::success(format!("Quiz contract deployed at: {}", contract)));
                self.owned_quiz_contracts.push(contract.clone());
                Some(contract)
            }
            Ok(None) => {
                self.status = Some(StatusMessage::info(
                    "Quiz contract deployed. Refresh to see its address.",
                ));
                None
            }
            Err(e) => {
                error!("Failed to deploy quiz contract: {}", e);
                self.fail("Failed to deploy quiz contract. Please try again.", &e);
                None
            }
        }
    }

    /// Link an existing quiz contract, given as typed by the user
    pub async fn link_quiz_contract(&mut self, class: &ContractAddress, quiz_contract: &str) {
        let quiz_contract = quiz_contract.trim();
        if quiz_contract.is_empty() {
            self.status = Some(StatusMessage::error("Please enter a quiz contract address."));
            return;
        }
        let fallback = "Failed to link quiz contract. Please check the address and try again.";
        let quiz_contract = match ContractAddress::parse(quiz_contract) {
            Ok(address) => address,
            Err(e) => {
                warn!("Rejected quiz contract address '{}': {}", quiz_contract, e);
                self.status = Some(StatusMessage::error(fallback));
                return;
            }
        };
        let action = TeacherAction::LinkQuizContract(class.clone());
        if !self.busy.begin(action.clone()) {
            return;
        }
        let outcome = self.classroom.link_quiz_to_class(class, &quiz_contract).await;
        self.busy.finish(&action);

        match outcome {
            Ok(tx_hash) => {
                info!("Linked quiz contract {} to {} in {}", quiz_contract, class, tx_hash);
                self.status = Some(StatusMessage::success("Quiz contract linked successfully!"));
                self.refresh_class(class).await;
            }
            Err(e) => {
                error!("Failed to link {} to {}: {}", quiz_contract, class, e);
                self.fail(fallback, &e);
            }
        }
    }

    /// Deploy a fresh quiz contract and link it to `class`
    pub async fn deploy_and_link(&mut self, class: &ContractAddress) {
        let action = TeacherAction::LinkQuizContract(class.clone());
        if !self.busy.begin(action.clone()) {
            return;
        }
        self.status = Some(StatusMessage::info("Deploying new quiz contract..."));
        let outcome = self.deploy_then_link(class).await;
        self.busy.finish(&action);

        match outcome {
            Ok(contract) => {
                info!("Deployed and linked quiz contract {} to {}", contract, class);
                self.owned_quiz_contracts.push(contract);
                self.status = Some(StatusMessage::success("Quiz contract successfully deployed and linked!"));
                self.refresh_class(class).await;
            }
            Err(e) => {
                error!("Failed to deploy and link a quiz contract for {}: {}", class, e);
                self.status = Some(StatusMessage::error(format!("Failed to complete the process: {}", e)));
            }
        }
    }

    async fn deploy_then_link(&self, class: &ContractAddress) -> ClassroomResult<ContractAddress> {
        let contract = self
            .classroom
            .create_quiz_contract(&self.account)
            .await?
            .ok_or_else(|| ClassroomError::malformed("QuizContractCreated", "no creation event in the receipt"))?;
        self.classroom.link_quiz_to_class(class, &contract).await?;
        Ok(contract)
    }

    /// Re-read the quiz contracts linked to `class` and their quizzes
    pub async fn refresh_quiz_contracts(&mut self, class: &ContractAddress) {
        let action = TeacherAction::RefreshQuizContracts;
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
                self.status = Some(StatusMessage::success("Quiz contracts refreshed successfully!"));
            }
            Err(e) => {
                error!("Failed to refresh quiz contracts of {}: {}", class, e);
                self.fail("Failed to refresh quiz contracts. Please try again.", &e);
            }
        }
    }

    // ===== Quizzes =====

    /// Open the quiz editor for the first quiz contract linked to `class`
    pub fn open_create_quiz(&mut self, class: &ContractAddress) -> bool {
        let Some(quiz_contract) = self.board.quiz_contracts_of(class).first().cloned() else {
            self.status = Some(StatusMessage::error("Please link a quiz contract to this class first."));
            return false;
        };
        self.modal.open(Modal::CreateQuiz {
            quiz_contract,
            class: class.clone(),
            form: FormState::new(CreateQuizForm::default()),
        });
        true
    }

    /// Fill the open quiz editor with generated questions
    ///
    /// On any failure the questions already in the editor stay as they were.
    pub async fn generate_questions(&mut self, generator: &dyn QuestionGenerator) {
        let Some(state) = self.modal.quiz_form_mut() else {
            return;
        };
        let (title, description) = (state.form().title.clone(), state.form().description.clone());
        if title.trim().is_empty() {
            self.status = Some(StatusMessage::error("Please enter a quiz title first."));
            return;
        }
        let action = TeacherAction::GenerateQuestions;
        if !self.busy.begin(action.clone()) {
            return;
        }
        let outcome = generator.generate(&title, &description).await;
        self.busy.finish(&action);

        match outcome {
            Ok(questions) => {
                info!("Generated {} questions for '{}'", questions.len(), title);
                match self.modal.quiz_form_mut().and_then(FormState::form_mut) {
                    Some(form) => {
                        form.replace_questions(questions);
                        self.status = Some(StatusMessage::success("Questions generated successfully!"));
                    }
                    None => debug!("Quiz editor closed before generation finished"),
                }
            }
            Err(e) => {
                error!("Failed to generate questions for '{}': {}", title, e);
                self.status = Some(StatusMessage::error(
                    "An error occurred while generating the quiz. Please try again.",
                ));
            }
        }
    }

    /// Create the quiz in the open editor, then add its questions
    pub async fn submit_quiz_form(&mut self) -> Option<QuizKey> {
        let (quiz_contract, class, submission) = match self.modal.current_mut() {
            Some(Modal::CreateQuiz {
                quiz_contract,
                class,
                form,
            }) => match form.begin_submit() {
                Ok(submission) => (quiz_contract.clone(), class.clone(), submission),
                Err(e) => {
                    self.status = Some(StatusMessage::error(e.to_string()));
                    return None;
                }
            },
            _ => return None,
        };
        let action = TeacherAction::CreateQuiz(quiz_contract.clone());
        if !self.busy.begin(action.clone()) {
            self.finish_quiz_form();
            return None;
        }
        let title = submission.quiz.title.clone();
        let outcome = self.create_quiz_with_questions(&quiz_contract, submission).await;
        self.busy.finish(&action);
        self.finish_quiz_form();

        match outcome {
            Ok(quiz_id) => {
                info!("Created quiz {} '{}' in {}", quiz_id, title, quiz_contract);
                self.modal.close();
                self.status = Some(StatusMessage::success(format!("Quiz \"{}\" created successfully!", title)));
                self.refresh_class(&class).await;
                Some(QuizKey::new(quiz_contract, quiz_id))
            }
            Err(e) => {
                error!("Failed to create quiz '{}' in {}: {}", title, quiz_contract, e);
                self.fail("Failed to create quiz. Please try again.", &e);
                None
            }
        }
    }

    fn finish_quiz_form(&mut self) {
        if let Some(form) = self.modal.quiz_form_mut() {
            form.finish_submit();
        }
    }

    async fn create_quiz_with_questions(
        &self,
        quiz_contract: &ContractAddress,
        submission: QuizSubmission,
    ) -> ClassroomResult<u64> {
        let quiz_id = self
            .classroom
            .create_quiz(quiz_contract, &submission.quiz)
            .await?
            .ok_or_else(|| ClassroomError::malformed("QuizCreated", "no creation event in the receipt"))?;
        self.classroom
            .add_questions(quiz_contract, quiz_id, &submission.questions)
            .await?;
        Ok(quiz_id)
    }

    pub async fn deactivate_quiz(&mut self, quiz: &QuizKey) {
        let action = TeacherAction::DeactivateQuiz(quiz.clone());
        if !self.busy.begin(action.clone()) {
            return;
        }
        let outcome = self.classroom.deactivate_quiz(&quiz.contract, quiz.quiz_id).await;
        self.busy.finish(&action);

        match outcome {
            Ok(tx_hash) => {
                info!("Deactivated quiz {} in {}", quiz, tx_hash);
                self.status = Some(StatusMessage::success("Quiz deactivated successfully!"));
                match self.classroom.fetch_active_quizzes(&quiz.contract).await {
                    Ok(active) => {
                        self.board.quizzes.insert(quiz.contract.clone(), active);
                    }
                    Err(e) => warn!("Failed to reload quizzes of {}: {}", quiz.contract, e),
                }
            }
            Err(e) => {
                error!("Failed to deactivate quiz {}: {}", quiz, e);
                self.fail("Failed to deactivate quiz. Please try again.", &e);
            }
        }
    }

    /// Every enrolled student's result for a quiz of `class`
    ///
    /// Students who have not attempted the quiz are left out.
    pub async fn view_quiz_results(&mut self, class: &ContractAddress, quiz: QuizKey) {
        let action = TeacherAction::ViewQuizResults(quiz.clone());
        if !self.busy.begin(action.clone()) {
            return;
        }
        let title = self
            .board
            .quiz(&quiz)
            .map(|q| q.title.clone())
            .unwrap_or_else(|| format!("Quiz {}", quiz.quiz_id));
        let outcome = self.read_quiz_results(class, &quiz).await;
        self.busy.finish(&action);

        match outcome {
            Ok(rows) => {
                debug!("{} students attempted {}", rows.len(), quiz);
                self.quiz_results.insert(quiz.clone(), rows.clone());
                self.modal.open(Modal::QuizResultsTable { quiz, title, rows });
            }
            Err(e) => {
                error!("Failed to fetch results of {}: {}", quiz, e);
                self.fail("Failed to fetch quiz results. Please try again.", &e);
            }
        }
    }

    async fn read_quiz_results(
        &self,
        class: &ContractAddress,
        quiz: &QuizKey,
    ) -> ClassroomResult<Vec<StudentQuizResult>> {
        let students = self.classroom.fetch_students(class).await?;
        let addresses = students.iter().map(|s| s.address.clone()).collect();
        let classroom = self.classroom.as_ref();
        let results = fan_out("quiz result", addresses, self.concurrency, |student| async move {
            classroom.fetch_quiz_result(&quiz.contract, quiz.quiz_id, &student).await
        })
        .await;

        Ok(results
            .into_iter()
            .filter(|(_, result)| result.has_attempted)
            .map(|(address, result)| StudentQuizResult {
                name: students
                    .iter()
                    .find(|s| s.address == address)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
                address,
                score: result.score,
                total_questions: result.total_questions,
                attempted_at: result.attempted_at,
            })
            .collect())
    }

    /// File name and CSV of a quiz's loaded results
    pub fn quiz_results_csv(&mut self, quiz: &QuizKey) -> Option<(String, String)> {
        match self.quiz_results.get(quiz) {
            Some(rows) if !rows.is_empty() => {
                let title = self
                    .board
                    .quiz(quiz)
                    .map(|q| q.title.clone())
                    .unwrap_or_default();
                Some((quiz_results_file_name(quiz.quiz_id, &title), quiz_results_csv(rows)))
            }
            _ => {
                self.status = Some(StatusMessage::error("No quiz results available to download."));
                None
            }
        }
    }

    // ===== Notes =====

    pub async fn create_notes_contract(&mut self, class: &ContractAddress) {
        let Some(class_name) = self.board.class(class).map(|c| c.name.clone()) else {
            return;
        };
        let action = TeacherAction::CreateNotesContract(class.clone());
        if !self.busy.begin(action.clone()) {
            return;
        }
        let outcome = self
            .classroom
            .create_notes_contract(&self.account, &class_name, class)
            .await;
        self.busy.finish(&action);

        match outcome {
            Ok(contract) => {
                info!("Created notes contract {:?} for {}", contract, class);
                self.status = Some(StatusMessage::success("Notes contract created successfully!"));
                self.refresh_class(class).await;
                self.sync_notes_boards().await;
            }
            Err(e) => {
                error!("Failed to create notes contract for {}: {}", class, e);
                self.fail("Failed to create notes contract. Please try again.", &e);
            }
        }
    }
}
