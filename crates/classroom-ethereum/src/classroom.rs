//! Ethereum Classroom Implementation
//!
//! This module implements the `Classroom` trait against the six PheroClass
//! contracts. Every write builds the call, sends it from the configured key,
//! waits for the receipt and checks its status. Creation calls additionally
//! scan the receipt logs for the event carrying the new identifier.

use alloy::network::Ethereum;
use alloy::primitives::{Address, U256};
use alloy::providers::PendingTransactionBuilder;
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use pheroclass_classroom::*;
use std::future::Future;
use tracing::{debug, info, warn};

use crate::{
    abi::*,
    config::EthereumClassroomConfig,
    contract::ContractClient,
    conversions::*,
    error::{EthereumClassroomError, OperationContext, Result},
    networks, signing,
};

/// Ethereum classroom binding
///
/// Stateless apart from configuration: providers are created per operation
/// and nothing is cached between calls.
pub struct EthereumClassroom {
    contract: ContractClient,
}

/// Run a typed binding operation and convert its error for the caller
async fn run<T, F>(operation: &str, fut: F) -> ClassroomResult<T>
where
    F: Future<Output = Result<T>>,
{
    fut.await.during(operation)
}

fn call_error(e: alloy::contract::Error) -> EthereumClassroomError {
    EthereumClassroomError::from_call(e)
}

fn send_error(e: alloy::contract::Error) -> EthereumClassroomError {
    EthereumClassroomError::from_send(e)
}

impl EthereumClassroom {
    /// Create a new binding from configuration
    pub fn new(config: EthereumClassroomConfig) -> Result<Self> {
        config
            .validate()
            .map_err(EthereumClassroomError::Configuration)?;
        let contract = ContractClient::new(config)?;
        info!(
            "Classroom binding for chain {} via {} ({})",
            contract.chain_id(),
            contract.rpc_url(),
            if contract.has_wallet() { "read-write" } else { "read-only" }
        );
        Ok(Self { contract })
    }

    pub fn contract(&self) -> &ContractClient {
        &self.contract
    }

    fn concurrency(&self) -> usize {
        self.contract.config.fetch_concurrency.max(1)
    }

    fn caller(&self) -> Result<Address> {
        self.contract
            .signer_address()
            .ok_or(EthereumClassroomError::NoPrivateKey)
    }

    /// Wait for the receipt and fail on a reverted status
    async fn confirm(&self, pending: PendingTransactionBuilder<Ethereum>) -> Result<TransactionReceipt> {
        let receipt = pending
            .with_required_confirmations(self.contract.config.confirmation_blocks)
            .get_receipt()
            .await
            .map_err(EthereumClassroomError::from_pending)?;

        let tx_hash = format_tx_hash(receipt.transaction_hash);
        if !receipt.status() {
            return Err(EthereumClassroomError::Reverted { tx_hash });
        }
        debug!("Transaction {} confirmed", tx_hash);
        Ok(receipt)
    }

    /// Quiz details for a list of ids; unreadable quizzes are skipped
    async fn fetch_quiz_details(&self, quiz_contract: Address, ids: Vec<U256>) -> Result<Vec<Quiz>> {
        let provider = self.contract.create_provider()?;
        let contract = QuizContract::new(quiz_contract, &provider);
        let contract = &contract;

        let quizzes: Vec<Option<Quiz>> = stream::iter(ids)
            .map(|id| async move {
                match contract.getQuiz(id).call().await {
                    Ok(details) => Some(Quiz {
                        id: u256_to_u64(details.id),
                        title: details.title,
                        description: details.description,
                        created_at: u256_to_u64(details.createdAt),
                        expires_at: u256_to_u64(details.expiresAt),
                        lecture_id: u256_to_u64(details.lectureId),
                        is_active: details.isActive,
                        question_count: u256_to_u64(details.questionCount),
                    }),
                    Err(e) => {
                        warn!("Failed to read quiz {} details: {}", id, e);
                        None
                    }
                }
            })
            .buffered(self.concurrency())
            .collect()
            .await;

        Ok(quizzes.into_iter().flatten().collect())
    }

    async fn read_note_ids(&self, notes_contract: &ContractAddress, query: NoteQuery) -> Result<Vec<u64>> {
        let provider = self.contract.create_provider()?;
        let contract = NotesContract::new(to_alloy_address(notes_contract)?, &provider);
        let ids = match query {
            NoteQuery::All => contract.getAllNotes().call().await,
            NoteQuery::Approved => contract.getApprovedNotes().call().await,
            NoteQuery::Lecture(lecture_id) => {
                contract.getNotesForLecture(U256::from(lecture_id)).call().await
            }
            NoteQuery::CreatedBy(creator) => contract.getCreatedNotes(creator).call().await,
            NoteQuery::PurchasedBy(buyer) => contract.getPurchasedNotes(buyer).call().await,
        };
        Ok(u256_vec_to_u64(ids.map_err(call_error)?))
    }
}

/// Which id list of a notes contract to read
enum NoteQuery {
    All,
    Approved,
    Lecture(u64),
    CreatedBy(Address),
    PurchasedBy(Address),
}

fn convert_class(info: ClassFactory::ClassInfo) -> ClassInfo {
    ClassInfo {
        address: to_contract_address(info.classAddress),
        name: info.name,
        symbol: info.symbol,
    }
}

#[async_trait]
impl Classroom for EthereumClassroom {
    // ===== Identity =====

    fn account(&self) -> Option<ContractAddress> {
        self.contract.signer_address().map(to_contract_address)
    }

    fn chain_id(&self) -> u64 {
        self.contract.chain_id()
    }

    async fn verify_network(&self) -> ClassroomResult<()> {
        run("verify network", async {
            let provider = self.contract.create_provider()?;
            networks::verify_network(&provider, self.contract.chain_id()).await
        })
        .await
    }

    async fn balance(&self, account: &ContractAddress) -> ClassroomResult<String> {
        run("fetch balance", async {
            let provider = self.contract.create_provider()?;
            networks::balance_ether(&provider, to_alloy_address(account)?).await
        })
        .await
    }

    // ===== Class factory =====

    async fn create_class(&self, name: &str, symbol: &str) -> ClassroomResult<String> {
        run("create class", async {
            debug!("Creating class {} ({})", name, symbol);
            let provider = self.contract.create_provider_with_signer()?;
            let factory = ClassFactory::new(self.contract.class_factory, &provider);

            let pending = factory
                .createClass(name.to_string(), symbol.to_string())
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;
            Ok(format_tx_hash(receipt.transaction_hash))
        })
        .await
    }

    async fn fetch_classes(&self) -> ClassroomResult<Vec<ClassInfo>> {
        run("fetch classes", async {
            let provider = self.contract.create_provider()?;
            let factory = ClassFactory::new(self.contract.class_factory, &provider);
            let classes = factory.getClasses().call().await.map_err(call_error)?;
            Ok(classes.into_iter().map(convert_class).collect())
        })
        .await
    }

    async fn class_owner(&self, class: &ContractAddress) -> ClassroomResult<ContractAddress> {
        run("fetch class owner", async {
            let provider = self.contract.create_provider()?;
            let contract = ClassContract::new(to_alloy_address(class)?, &provider);
            let owner = contract.owner().call().await.map_err(call_error)?;
            Ok(to_contract_address(owner))
        })
        .await
    }

    async fn fetch_eligible_classes(&self, student: &ContractAddress) -> ClassroomResult<Vec<ClassInfo>> {
        run("fetch eligible classes", async {
            let provider = self.contract.create_provider()?;
            let factory = ClassFactory::new(self.contract.class_factory, &provider);
            let classes = factory
                .getEligibleClasses(to_alloy_address(student)?)
                .call()
                .await
                .map_err(call_error)?;
            Ok(classes.into_iter().map(convert_class).collect())
        })
        .await
    }

    // ===== Class contract =====

    async fn mint_student(
        &self,
        class: &ContractAddress,
        student: &ContractAddress,
        name: &str,
    ) -> ClassroomResult<String> {
        run("add student", async {
            debug!("Minting class token for {} ({}) in {}", name, student, class);
            let provider = self.contract.create_provider_with_signer()?;
            let contract = ClassContract::new(to_alloy_address(class)?, &provider);

            let pending = contract
                .mintNFT(to_alloy_address(student)?, name.to_string())
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;
            Ok(format_tx_hash(receipt.transaction_hash))
        })
        .await
    }

    async fn create_lecture(&self, class: &ContractAddress, topic: &str) -> ClassroomResult<String> {
        run("create lecture", async {
            debug!("Creating lecture '{}' in {}", topic, class);
            let provider = self.contract.create_provider_with_signer()?;
            let contract = ClassContract::new(to_alloy_address(class)?, &provider);

            let pending = contract
                .createLecture(topic.to_string())
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;
            Ok(format_tx_hash(receipt.transaction_hash))
        })
        .await
    }

    async fn fetch_lectures(&self, class: &ContractAddress) -> ClassroomResult<Vec<Lecture>> {
        run("fetch lectures", async {
            let provider = self.contract.create_provider()?;
            let contract = ClassContract::new(to_alloy_address(class)?, &provider);
            let lectures = contract.getLectures().call().await.map_err(call_error)?;
            Ok(lectures
                .into_iter()
                .map(|lecture| Lecture {
                    id: u256_to_u64(lecture.id),
                    topic: lecture.topic,
                    date: u256_to_u64(lecture.date),
                })
                .collect())
        })
        .await
    }

    async fn mark_attendance(
        &self,
        class: &ContractAddress,
        lecture_id: u64,
    ) -> ClassroomResult<AttendanceReceipt> {
        run("mark attendance", async {
            let signer = self.contract.signer()?;
            let timestamp_ms = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
            let signature = signing::sign_attendance(signer, lecture_id, timestamp_ms).await?;
            debug!(
                "Attendance signature for lecture {} at {}: {}",
                lecture_id, timestamp_ms, signature
            );

            info!("Marking attendance for lecture {} in class {}", lecture_id, class);
            let provider = self.contract.create_provider_with_signer()?;
            let contract = ClassContract::new(to_alloy_address(class)?, &provider);

            let pending = contract
                .markAttendance(U256::from(lecture_id))
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;
            let tx_hash = format_tx_hash(receipt.transaction_hash);
            info!("Attendance transaction {} confirmed", tx_hash);

            Ok(AttendanceReceipt {
                tx_hash,
                student: to_contract_address(signer.address()),
                lecture_id,
                timestamp_ms,
                signature,
            })
        })
        .await
    }

    async fn fetch_attendance_roster(
        &self,
        class: &ContractAddress,
        lecture_id: u64,
    ) -> ClassroomResult<Vec<AttendeeRecord>> {
        run("fetch attendance records", async {
            let provider = self.contract.create_provider()?;
            let contract = ClassContract::new(to_alloy_address(class)?, &provider);
            let roster = contract
                .getAllAttendance(U256::from(lecture_id))
                .call()
                .await
                .map_err(call_error)?;

            if roster.students.len() != roster.names.len() {
                warn!(
                    "Attendance roster for lecture {} has {} addresses but {} names",
                    lecture_id,
                    roster.students.len(),
                    roster.names.len()
                );
            }

            Ok(roster
                .students
                .into_iter()
                .zip(roster.names)
                .map(|(address, name)| AttendeeRecord {
                    address: to_contract_address(address),
                    name,
                })
                .collect())
        })
        .await
    }

    async fn fetch_own_attendance(&self, class: &ContractAddress) -> ClassroomResult<Vec<bool>> {
        run("fetch attendance", async {
            let caller = self.caller()?;
            let provider = self.contract.create_provider()?;
            let contract = ClassContract::new(to_alloy_address(class)?, &provider);
            contract
                .getOwnAttendance()
                .from(caller)
                .call()
                .await
                .map_err(call_error)
        })
        .await
    }

    async fn fetch_students(&self, class: &ContractAddress) -> ClassroomResult<Vec<Student>> {
        run("fetch students", async {
            let provider = self.contract.create_provider()?;
            let contract = ClassContract::new(to_alloy_address(class)?, &provider);
            let total = u256_to_u64(contract.totalSupply().call().await.map_err(call_error)?);
            debug!("Class {} has {} students", class, total);

            let contract = &contract;
            let students: Vec<Option<Student>> = stream::iter(1..=total)
                .map(|token_id| async move {
                    let owner = contract.ownerOf(U256::from(token_id)).call().await;
                    let name = contract.getStudentName(U256::from(token_id)).call().await;
                    match (owner, name) {
                        (Ok(owner), Ok(name)) => Some(Student {
                            token_id,
                            address: to_contract_address(owner),
                            name,
                        }),
                        (Err(e), _) | (_, Err(e)) => {
                            warn!("Failed to read student token {} in {}: {}", token_id, class, e);
                            None
                        }
                    }
                })
                .buffered(self.concurrency())
                .collect()
                .await;

            Ok(students.into_iter().flatten().collect())
        })
        .await
    }

    async fn link_quiz_to_class(
        &self,
        class: &ContractAddress,
        quiz_contract: &ContractAddress,
    ) -> ClassroomResult<String> {
        run("link quiz contract", async {
            debug!("Linking quiz contract {} to class {}", quiz_contract, class);
            let provider = self.contract.create_provider_with_signer()?;
            let factory = ClassFactory::new(self.contract.class_factory, &provider);

            let pending = factory
                .linkQuizToClass(to_alloy_address(class)?, to_alloy_address(quiz_contract)?)
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;
            Ok(format_tx_hash(receipt.transaction_hash))
        })
        .await
    }

    async fn fetch_class_quiz_contracts(&self, class: &ContractAddress) -> ClassroomResult<Vec<ContractAddress>> {
        run("fetch class quizzes", async {
            let provider = self.contract.create_provider()?;
            let factory = ClassFactory::new(self.contract.class_factory, &provider);
            let contracts = factory
                .getClassQuizzes(to_alloy_address(class)?)
                .call()
                .await
                .map_err(call_error)?;
            Ok(contracts.into_iter().map(to_contract_address).collect())
        })
        .await
    }

    // ===== Quiz factory =====

    async fn create_quiz_contract(&self, owner: &ContractAddress) -> ClassroomResult<Option<ContractAddress>> {
        run("create quiz contract", async {
            debug!("Deploying quiz contract for {}", owner);
            let provider = self.contract.create_provider_with_signer()?;
            let factory = QuizContractFactory::new(self.contract.quiz_factory, &provider);

            let pending = factory
                .createQuizContract(to_alloy_address(owner)?)
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;

            for log in receipt.inner.logs() {
                if let Ok(decoded) = log.log_decode::<QuizContractFactory::QuizContractCreated>() {
                    let address = to_contract_address(decoded.data().quizContractAddress);
                    info!("Quiz contract {} deployed", address);
                    return Ok(Some(address));
                }
            }

            warn!(
                "QuizContractCreated event not found in {}",
                format_tx_hash(receipt.transaction_hash)
            );
            Ok(None)
        })
        .await
    }

    async fn fetch_quiz_contracts(&self) -> ClassroomResult<Vec<QuizContractInfo>> {
        run("fetch quiz contracts", async {
            let provider = self.contract.create_provider()?;
            let factory = QuizContractFactory::new(self.contract.quiz_factory, &provider);
            let contracts = factory.getQuizContracts().call().await.map_err(call_error)?;
            Ok(contracts
                .into_iter()
                .map(|info| QuizContractInfo {
                    address: to_contract_address(info.contractAddress),
                    owner: to_contract_address(info.owner),
                    created_at: u256_to_u64(info.createdAt),
                })
                .collect())
        })
        .await
    }

    async fn fetch_owner_quiz_contracts(&self, owner: &ContractAddress) -> ClassroomResult<Vec<ContractAddress>> {
        run("fetch owner quiz contracts", async {
            let provider = self.contract.create_provider()?;
            let factory = QuizContractFactory::new(self.contract.quiz_factory, &provider);
            let contracts = factory
                .getOwnerQuizContracts(to_alloy_address(owner)?)
                .call()
                .await
                .map_err(call_error)?;
            Ok(contracts.into_iter().map(to_contract_address).collect())
        })
        .await
    }

    async fn quiz_contract_count(&self) -> ClassroomResult<u64> {
        run("fetch quiz contract count", async {
            let provider = self.contract.create_provider()?;
            let factory = QuizContractFactory::new(self.contract.quiz_factory, &provider);
            let count = factory.getQuizContractCount().call().await.map_err(call_error)?;
            Ok(u256_to_u64(count))
        })
        .await
    }

    // ===== Quiz contract =====

    async fn create_quiz(&self, quiz_contract: &ContractAddress, quiz: &NewQuiz) -> ClassroomResult<Option<u64>> {
        run("create quiz", async {
            debug!("Creating quiz '{}' for lecture {}", quiz.title, quiz.lecture_id);
            let provider = self.contract.create_provider_with_signer()?;
            let contract = QuizContract::new(to_alloy_address(quiz_contract)?, &provider);

            let pending = contract
                .createQuiz(
                    quiz.title.clone(),
                    quiz.description.clone(),
                    U256::from(quiz.expires_at),
                    U256::from(quiz.lecture_id),
                )
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;

            for log in receipt.inner.logs() {
                if let Ok(decoded) = log.log_decode::<QuizContract::QuizCreated>() {
                    let quiz_id = u256_to_u64(decoded.data().quizId);
                    info!("Quiz {} created in {}", quiz_id, quiz_contract);
                    return Ok(Some(quiz_id));
                }
            }

            warn!(
                "QuizCreated event not found in {}",
                format_tx_hash(receipt.transaction_hash)
            );
            Ok(None)
        })
        .await
    }

    async fn add_question(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
        question: &QuestionDraft,
    ) -> ClassroomResult<String> {
        question.validate()?;
        run("add question", async {
            let provider = self.contract.create_provider_with_signer()?;
            let contract = QuizContract::new(to_alloy_address(quiz_contract)?, &provider);

            let pending = contract
                .addQuestion(
                    U256::from(quiz_id),
                    question.text.clone(),
                    question.options.clone(),
                    U256::from(question.correct_option_index),
                )
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;
            Ok(format_tx_hash(receipt.transaction_hash))
        })
        .await
    }

    async fn add_questions(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
        questions: &[QuestionDraft],
    ) -> ClassroomResult<String> {
        for question in questions {
            question.validate()?;
        }
        run("add questions", async {
            debug!("Adding {} questions to quiz {}", questions.len(), quiz_id);
            let provider = self.contract.create_provider_with_signer()?;
            let contract = QuizContract::new(to_alloy_address(quiz_contract)?, &provider);

            let texts = questions.iter().map(|q| q.text.clone()).collect();
            let options = questions.iter().map(|q| q.options.clone()).collect();
            let correct = questions
                .iter()
                .map(|q| U256::from(q.correct_option_index))
                .collect();

            let pending = contract
                .addMultipleQuestions(U256::from(quiz_id), texts, options, correct)
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;
            Ok(format_tx_hash(receipt.transaction_hash))
        })
        .await
    }

    async fn submit_quiz(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
        answers: &[u64],
    ) -> ClassroomResult<String> {
        run("submit quiz", async {
            debug!("Submitting {} answers for quiz {}", answers.len(), quiz_id);
            let provider = self.contract.create_provider_with_signer()?;
            let contract = QuizContract::new(to_alloy_address(quiz_contract)?, &provider);

            let selected = answers.iter().map(|&a| U256::from(a)).collect();
            let pending = contract
                .submitQuiz(U256::from(quiz_id), selected)
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;
            Ok(format_tx_hash(receipt.transaction_hash))
        })
        .await
    }

    async fn fetch_active_quizzes(&self, quiz_contract: &ContractAddress) -> ClassroomResult<Vec<Quiz>> {
        run("fetch quizzes", async {
            let address = to_alloy_address(quiz_contract)?;
            let provider = self.contract.create_provider()?;
            let ids = QuizContract::new(address, &provider)
                .getActiveQuizzes()
                .call()
                .await
                .map_err(call_error)?;
            self.fetch_quiz_details(address, ids).await
        })
        .await
    }

    async fn fetch_lecture_quizzes(
        &self,
        quiz_contract: &ContractAddress,
        lecture_id: u64,
    ) -> ClassroomResult<Vec<Quiz>> {
        run("fetch lecture quizzes", async {
            let address = to_alloy_address(quiz_contract)?;
            let provider = self.contract.create_provider()?;
            let ids = QuizContract::new(address, &provider)
                .getQuizzesForLecture(U256::from(lecture_id))
                .call()
                .await
                .map_err(call_error)?;
            self.fetch_quiz_details(address, ids).await
        })
        .await
    }

    async fn fetch_quiz_questions(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
    ) -> ClassroomResult<Vec<Question>> {
        run("fetch quiz questions", async {
            let provider = self.contract.create_provider()?;
            let contract = QuizContract::new(to_alloy_address(quiz_contract)?, &provider);
            let ids = contract
                .getQuizQuestions(U256::from(quiz_id))
                .call()
                .await
                .map_err(call_error)?;

            let contract = &contract;
            let questions: Vec<Option<Question>> = stream::iter(ids)
                .map(|id| async move {
                    match contract.getQuestion(id).call().await {
                        Ok(details) => Some(Question {
                            id: u256_to_u64(id),
                            text: details.questionText,
                            options: details.options,
                        }),
                        Err(e) => {
                            warn!("Failed to read question {}: {}", id, e);
                            None
                        }
                    }
                })
                .buffered(self.concurrency())
                .collect()
                .await;

            Ok(questions.into_iter().flatten().collect())
        })
        .await
    }

    async fn fetch_quiz_result(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
        student: &ContractAddress,
    ) -> ClassroomResult<QuizResult> {
        run("fetch quiz results", async {
            let provider = self.contract.create_provider()?;
            let contract = QuizContract::new(to_alloy_address(quiz_contract)?, &provider);
            let score = contract
                .getQuizScore(to_alloy_address(student)?, U256::from(quiz_id))
                .call()
                .await
                .map_err(call_error)?;
            Ok(QuizResult {
                has_attempted: score.hasAttempted,
                score: u256_to_u64(score.score),
                attempted_at: u256_to_u64(score.attemptedAt),
                total_questions: u256_to_u64(score.totalQuestions),
            })
        })
        .await
    }

    async fn deactivate_quiz(&self, quiz_contract: &ContractAddress, quiz_id: u64) -> ClassroomResult<String> {
        run("deactivate quiz", async {
            let provider = self.contract.create_provider_with_signer()?;
            let contract = QuizContract::new(to_alloy_address(quiz_contract)?, &provider);
            let pending = contract
                .deactivateQuiz(U256::from(quiz_id))
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;
            Ok(format_tx_hash(receipt.transaction_hash))
        })
        .await
    }

    // ===== Notes factory =====

    async fn create_notes_contract(
        &self,
        owner: &ContractAddress,
        class_name: &str,
        class: &ContractAddress,
    ) -> ClassroomResult<Option<ContractAddress>> {
        run("create notes contract", async {
            debug!("Deploying notes contract for class {} ({})", class_name, class);
            let provider = self.contract.create_provider_with_signer()?;
            let factory = NotesFactory::new(self.contract.notes_factory, &provider);

            let pending = factory
                .createNotesContract(
                    to_alloy_address(owner)?,
                    class_name.to_string(),
                    to_alloy_address(class)?,
                )
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;

            for log in receipt.inner.logs() {
                if let Ok(decoded) = log.log_decode::<NotesFactory::NotesContractCreated>() {
                    let address = to_contract_address(decoded.data().notesContractAddress);
                    info!("Notes contract {} deployed for {}", address, class);
                    return Ok(Some(address));
                }
            }

            warn!(
                "NotesContractCreated event not found in {}",
                format_tx_hash(receipt.transaction_hash)
            );
            Ok(None)
        })
        .await
    }

    async fn fetch_notes_contracts(&self) -> ClassroomResult<Vec<NotesContractInfo>> {
        run("fetch notes contracts", async {
            let provider = self.contract.create_provider()?;
            let factory = NotesFactory::new(self.contract.notes_factory, &provider);
            let contracts = factory.getNotesContracts().call().await.map_err(call_error)?;
            Ok(contracts
                .into_iter()
                .map(|info| NotesContractInfo {
                    address: to_contract_address(info.contractAddress),
                    owner: to_contract_address(info.owner),
                    class_name: info.className,
                    created_at: u256_to_u64(info.createdAt),
                })
                .collect())
        })
        .await
    }

    async fn fetch_owner_notes_contracts(&self, owner: &ContractAddress) -> ClassroomResult<Vec<ContractAddress>> {
        run("fetch owner notes contracts", async {
            let provider = self.contract.create_provider()?;
            let factory = NotesFactory::new(self.contract.notes_factory, &provider);
            let contracts = factory
                .getOwnerNotesContracts(to_alloy_address(owner)?)
                .call()
                .await
                .map_err(call_error)?;
            Ok(contracts.into_iter().map(to_contract_address).collect())
        })
        .await
    }

    async fn notes_contract_for_class(&self, class: &ContractAddress) -> ClassroomResult<Option<ContractAddress>> {
        run("fetch notes contract", async {
            let provider = self.contract.create_provider()?;
            let factory = NotesFactory::new(self.contract.notes_factory, &provider);
            let address = factory
                .getNotesContractForClass(to_alloy_address(class)?)
                .call()
                .await
                .map_err(call_error)?;
            Ok(optional_address(address))
        })
        .await
    }

    // ===== Notes contract =====

    async fn create_note(&self, notes_contract: &ContractAddress, note: &NewNote) -> ClassroomResult<Option<u64>> {
        run("create note", async {
            let price = ether_to_wei(&note.price)?;
            debug!("Creating note '{}' priced {} wei", note.title, price);
            let provider = self.contract.create_provider_with_signer()?;
            let contract = NotesContract::new(to_alloy_address(notes_contract)?, &provider);

            let pending = contract
                .createNote(
                    note.title.clone(),
                    note.description.clone(),
                    note.ipfs_hash.clone(),
                    price,
                    U256::from(note.lecture_id),
                )
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;

            for log in receipt.inner.logs() {
                if let Ok(decoded) = log.log_decode::<NotesContract::NoteCreated>() {
                    let note_id = u256_to_u64(decoded.data().noteId);
                    info!("Note {} created in {}", note_id, notes_contract);
                    return Ok(Some(note_id));
                }
            }

            warn!(
                "NoteCreated event not found in {}",
                format_tx_hash(receipt.transaction_hash)
            );
            Ok(None)
        })
        .await
    }

    async fn approve_note(
        &self,
        notes_contract: &ContractAddress,
        note_id: u64,
        approved: bool,
    ) -> ClassroomResult<String> {
        let operation = if approved { "approve note" } else { "reject note" };
        run(operation, async {
            let provider = self.contract.create_provider_with_signer()?;
            let contract = NotesContract::new(to_alloy_address(notes_contract)?, &provider);
            let pending = contract
                .approveNote(U256::from(note_id), approved)
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;
            Ok(format_tx_hash(receipt.transaction_hash))
        })
        .await
    }

    async fn purchase_note(&self, notes_contract: &ContractAddress, note_id: u64) -> ClassroomResult<String> {
        run("purchase note", async {
            let provider = self.contract.create_provider_with_signer()?;
            let contract = NotesContract::new(to_alloy_address(notes_contract)?, &provider);

            // The price attached is whatever the contract holds right now
            let details = contract
                .getNoteDetails(U256::from(note_id))
                .call()
                .await
                .map_err(call_error)?;
            info!(
                "Purchasing note {} for {} ether",
                note_id,
                wei_to_ether_string(details.price)
            );

            let pending = contract
                .purchaseNote(U256::from(note_id))
                .value(details.price)
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;
            Ok(format_tx_hash(receipt.transaction_hash))
        })
        .await
    }

    async fn update_note_price(
        &self,
        notes_contract: &ContractAddress,
        note_id: u64,
        new_price: &str,
    ) -> ClassroomResult<String> {
        run("update note price", async {
            let price = ether_to_wei(new_price)?;
            let provider = self.contract.create_provider_with_signer()?;
            let contract = NotesContract::new(to_alloy_address(notes_contract)?, &provider);
            let pending = contract
                .updateNotePrice(U256::from(note_id), price)
                .send()
                .await
                .map_err(send_error)?;
            let receipt = self.confirm(pending).await?;
            Ok(format_tx_hash(receipt.transaction_hash))
        })
        .await
    }

    async fn has_purchased_note(
        &self,
        notes_contract: &ContractAddress,
        note_id: u64,
        user: &ContractAddress,
    ) -> ClassroomResult<bool> {
        run("check note purchase", async {
            let provider = self.contract.create_provider()?;
            let contract = NotesContract::new(to_alloy_address(notes_contract)?, &provider);
            contract
                .hasPurchasedNote(to_alloy_address(user)?, U256::from(note_id))
                .call()
                .await
                .map_err(call_error)
        })
        .await
    }

    async fn note_sales(&self, notes_contract: &ContractAddress, note_id: u64) -> ClassroomResult<u64> {
        run("fetch note sales", async {
            let provider = self.contract.create_provider()?;
            let contract = NotesContract::new(to_alloy_address(notes_contract)?, &provider);
            let sales = contract
                .getNoteSales(U256::from(note_id))
                .call()
                .await
                .map_err(call_error)?;
            Ok(u256_to_u64(sales))
        })
        .await
    }

    async fn fetch_all_note_ids(&self, notes_contract: &ContractAddress) -> ClassroomResult<Vec<u64>> {
        run("fetch notes", async {
            self.read_note_ids(notes_contract, NoteQuery::All).await
        })
        .await
    }

    async fn fetch_approved_note_ids(&self, notes_contract: &ContractAddress) -> ClassroomResult<Vec<u64>> {
        run("fetch approved notes", async {
            self.read_note_ids(notes_contract, NoteQuery::Approved).await
        })
        .await
    }

    async fn fetch_lecture_note_ids(
        &self,
        notes_contract: &ContractAddress,
        lecture_id: u64,
    ) -> ClassroomResult<Vec<u64>> {
        run("fetch lecture notes", async {
            self.read_note_ids(notes_contract, NoteQuery::Lecture(lecture_id)).await
        })
        .await
    }

    async fn fetch_created_note_ids(
        &self,
        notes_contract: &ContractAddress,
        creator: &ContractAddress,
    ) -> ClassroomResult<Vec<u64>> {
        run("fetch created notes", async {
            let creator = to_alloy_address(creator)?;
            self.read_note_ids(notes_contract, NoteQuery::CreatedBy(creator)).await
        })
        .await
    }

    async fn fetch_purchased_note_ids(
        &self,
        notes_contract: &ContractAddress,
        buyer: &ContractAddress,
    ) -> ClassroomResult<Vec<u64>> {
        run("fetch purchased notes", async {
            let buyer = to_alloy_address(buyer)?;
            self.read_note_ids(notes_contract, NoteQuery::PurchasedBy(buyer)).await
        })
        .await
    }

    async fn fetch_note(&self, notes_contract: &ContractAddress, note_id: u64) -> ClassroomResult<Note> {
        run("fetch note details", async {
            let provider = self.contract.create_provider()?;
            let contract = NotesContract::new(to_alloy_address(notes_contract)?, &provider);
            let details = contract
                .getNoteDetails(U256::from(note_id))
                .call()
                .await
                .map_err(call_error)?;
            Ok(Note {
                id: note_id,
                title: details.title,
                description: details.description,
                ipfs_hash: details.ipfsHash,
                creator: to_contract_address(details.creator),
                price: wei_to_ether_string(details.price),
                created_at: u256_to_u64(details.createdAt),
                lecture_id: u256_to_u64(details.lectureId),
                is_approved: details.isApproved,
                sales_count: u256_to_u64(details.salesCount),
            })
        })
        .await
    }
}
