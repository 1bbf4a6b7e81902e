//! Classroom Trait - the binding seam between dashboards and the deployed contracts
//!
//! This crate defines the `Classroom` trait which translates UI-level intents
//! (create a lecture, mark attendance, purchase a note) into contract calls and
//! returns plain, normalized read models. Implementations own the wire format;
//! callers never see chain integers or wei.

use async_trait::async_trait;
use tracing::warn;

pub mod error;
pub mod types;

pub use error::{ClassroomError, ClassroomResult, friendly_revert_message};
pub use types::*;

/// Main Classroom trait that every contract binding implements
///
/// Writes wait for the mined receipt and are never retried: resubmitting a
/// transaction risks executing it twice.
#[async_trait]
pub trait Classroom: Send + Sync {
    // ===== Identity =====

    /// Address of the signing account, if a signer is configured
    fn account(&self) -> Option<ContractAddress>;

    /// Chain the binding talks to
    fn chain_id(&self) -> u64;

    /// Fail with a wallet error unless the endpoint serves `chain_id()`
    async fn verify_network(&self) -> ClassroomResult<()>;

    /// Native balance of an account, in ether
    async fn balance(&self, account: &ContractAddress) -> ClassroomResult<String>;

    // ===== Class factory =====

    /// Create a new class contract owned by the caller
    async fn create_class(&self, name: &str, symbol: &str) -> ClassroomResult<String>;

    /// Every class registered in the factory
    async fn fetch_classes(&self) -> ClassroomResult<Vec<ClassInfo>>;

    /// Owner of a class contract
    async fn class_owner(&self, class: &ContractAddress) -> ClassroomResult<ContractAddress>;

    /// Classes a student holds a token for
    async fn fetch_eligible_classes(&self, student: &ContractAddress) -> ClassroomResult<Vec<ClassInfo>>;

    /// Classes owned by `owner`
    ///
    /// A class whose owner cannot be read is skipped.
    async fn fetch_owned_classes(&self, owner: &ContractAddress) -> ClassroomResult<Vec<ClassInfo>> {
        let classes = self.fetch_classes().await?;
        let mut owned = Vec::new();
        for class in classes {
            match self.class_owner(&class.address).await {
                Ok(class_owner) if &class_owner == owner => owned.push(class),
                Ok(_) => {}
                Err(e) => warn!("Failed to read owner of class {}: {}", class.address, e),
            }
        }
        Ok(owned)
    }

    // ===== Class contract =====

    /// Enroll a student by minting the class token to them
    async fn mint_student(
        &self,
        class: &ContractAddress,
        student: &ContractAddress,
        name: &str,
    ) -> ClassroomResult<String>;

    async fn create_lecture(&self, class: &ContractAddress, topic: &str) -> ClassroomResult<String>;

    async fn fetch_lectures(&self, class: &ContractAddress) -> ClassroomResult<Vec<Lecture>>;

    /// Check the caller in to a lecture
    async fn mark_attendance(
        &self,
        class: &ContractAddress,
        lecture_id: u64,
    ) -> ClassroomResult<AttendanceReceipt>;

    /// Students present at a lecture
    async fn fetch_attendance_roster(
        &self,
        class: &ContractAddress,
        lecture_id: u64,
    ) -> ClassroomResult<Vec<AttendeeRecord>>;

    /// The caller's attendance flags in lecture order (see `has_attended`)
    async fn fetch_own_attendance(&self, class: &ContractAddress) -> ClassroomResult<Vec<bool>>;

    /// Every student enrolled in a class
    async fn fetch_students(&self, class: &ContractAddress) -> ClassroomResult<Vec<Student>>;

    async fn link_quiz_to_class(
        &self,
        class: &ContractAddress,
        quiz_contract: &ContractAddress,
    ) -> ClassroomResult<String>;

    async fn fetch_class_quiz_contracts(&self, class: &ContractAddress) -> ClassroomResult<Vec<ContractAddress>>;

    // ===== Quiz factory =====

    /// Deploy a quiz contract; returns its address when the creation log is found
    async fn create_quiz_contract(&self, owner: &ContractAddress) -> ClassroomResult<Option<ContractAddress>>;

    async fn fetch_quiz_contracts(&self) -> ClassroomResult<Vec<QuizContractInfo>>;

    async fn fetch_owner_quiz_contracts(&self, owner: &ContractAddress) -> ClassroomResult<Vec<ContractAddress>>;

    async fn quiz_contract_count(&self) -> ClassroomResult<u64>;

    // ===== Quiz contract =====

    /// Create a quiz; returns its id when the creation log is found
    async fn create_quiz(&self, quiz_contract: &ContractAddress, quiz: &NewQuiz) -> ClassroomResult<Option<u64>>;

    async fn add_question(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
        question: &QuestionDraft,
    ) -> ClassroomResult<String>;

    /// Add several questions in a single transaction
    async fn add_questions(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
        questions: &[QuestionDraft],
    ) -> ClassroomResult<String>;

    /// Submit the full answer vector in one write
    async fn submit_quiz(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
        answers: &[u64],
    ) -> ClassroomResult<String>;

    async fn fetch_active_quizzes(&self, quiz_contract: &ContractAddress) -> ClassroomResult<Vec<Quiz>>;

    async fn fetch_lecture_quizzes(
        &self,
        quiz_contract: &ContractAddress,
        lecture_id: u64,
    ) -> ClassroomResult<Vec<Quiz>>;

    async fn fetch_quiz_questions(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
    ) -> ClassroomResult<Vec<Question>>;

    async fn fetch_quiz_result(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
        student: &ContractAddress,
    ) -> ClassroomResult<QuizResult>;

    async fn deactivate_quiz(&self, quiz_contract: &ContractAddress, quiz_id: u64) -> ClassroomResult<String>;

    // ===== Notes factory =====

    /// Deploy a notes contract for a class; returns its address when the creation log is found
    async fn create_notes_contract(
        &self,
        owner: &ContractAddress,
        class_name: &str,
        class: &ContractAddress,
    ) -> ClassroomResult<Option<ContractAddress>>;

    async fn fetch_notes_contracts(&self) -> ClassroomResult<Vec<NotesContractInfo>>;

    async fn fetch_owner_notes_contracts(&self, owner: &ContractAddress) -> ClassroomResult<Vec<ContractAddress>>;

    /// The notes contract of a class, `None` when the class has none
    async fn notes_contract_for_class(&self, class: &ContractAddress) -> ClassroomResult<Option<ContractAddress>>;

    // ===== Notes contract =====

    /// Create a note; returns its id when the creation log is found
    async fn create_note(&self, notes_contract: &ContractAddress, note: &NewNote) -> ClassroomResult<Option<u64>>;

    async fn approve_note(
        &self,
        notes_contract: &ContractAddress,
        note_id: u64,
        approved: bool,
    ) -> ClassroomResult<String>;

    /// Buy a note at the price the contract reports at call time
    async fn purchase_note(&self, notes_contract: &ContractAddress, note_id: u64) -> ClassroomResult<String>;

    /// Change a note's price; only future purchases are affected
    async fn update_note_price(
        &self,
        notes_contract: &ContractAddress,
        note_id: u64,
        new_price: &str,
    ) -> ClassroomResult<String>;

    async fn has_purchased_note(
        &self,
        notes_contract: &ContractAddress,
        note_id: u64,
        user: &ContractAddress,
    ) -> ClassroomResult<bool>;

    async fn note_sales(&self, notes_contract: &ContractAddress, note_id: u64) -> ClassroomResult<u64>;

    async fn fetch_all_note_ids(&self, notes_contract: &ContractAddress) -> ClassroomResult<Vec<u64>>;

    async fn fetch_approved_note_ids(&self, notes_contract: &ContractAddress) -> ClassroomResult<Vec<u64>>;

    async fn fetch_lecture_note_ids(
        &self,
        notes_contract: &ContractAddress,
        lecture_id: u64,
    ) -> ClassroomResult<Vec<u64>>;

    async fn fetch_created_note_ids(
        &self,
        notes_contract: &ContractAddress,
        creator: &ContractAddress,
    ) -> ClassroomResult<Vec<u64>>;

    async fn fetch_purchased_note_ids(
        &self,
        notes_contract: &ContractAddress,
        buyer: &ContractAddress,
    ) -> ClassroomResult<Vec<u64>>;

    async fn fetch_note(&self, notes_contract: &ContractAddress, note_id: u64) -> ClassroomResult<Note>;
}
