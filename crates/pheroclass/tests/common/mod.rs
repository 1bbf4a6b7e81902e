//! In-memory classroom used by the dashboard tests
//!
//! Behaves like the deployed contracts where the dashboards can tell the
//! difference: ids start at 1, a quiz takes one attempt per student, only
//! approved notes are listed and purchases are recorded per buyer. Every
//! operation is counted and any of them can be made to fail.

#![allow(dead_code)]

use async_trait::async_trait;
use pheroclass::quizgen::{QuestionGenerator, parse_reply};
use pheroclass_classroom::*;
use pheroclass_storage::{FileStore, StorageError, gateway_url};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

pub const CHAIN_ID: u64 = 50002;
pub const START_TIME: u64 = 1_700_000_000;

/// Wall clock for dashboards, a minute into the fake chain's history
pub fn clock() -> u64 {
    (START_TIME + 60) * 1000
}

pub fn addr(n: u64) -> ContractAddress {
    ContractAddress::parse(&format!("0x{:040x}", n)).unwrap()
}

pub fn teacher() -> ContractAddress {
    addr(0xA11CE)
}

pub fn student() -> ContractAddress {
    addr(0xB0B)
}

pub fn other_student() -> ContractAddress {
    addr(0xCA11)
}

#[derive(Debug, Clone)]
pub struct FakeClass {
    pub info: ClassInfo,
    pub owner: ContractAddress,
    pub students: Vec<Student>,
    pub lectures: Vec<Lecture>,
    pub attendance: BTreeMap<u64, Vec<ContractAddress>>,
    pub quiz_links: Vec<ContractAddress>,
}

#[derive(Debug, Clone)]
pub struct FakeQuiz {
    pub quiz: Quiz,
    pub questions: Vec<QuestionDraft>,
    pub results: BTreeMap<ContractAddress, QuizResult>,
}

#[derive(Debug, Clone)]
pub struct FakeQuizContract {
    pub info: QuizContractInfo,
    pub quizzes: Vec<FakeQuiz>,
}

#[derive(Debug, Clone)]
pub struct FakeNotesContract {
    pub info: NotesContractInfo,
    pub class: ContractAddress,
    pub notes: Vec<Note>,
    pub buyers: BTreeMap<u64, BTreeSet<ContractAddress>>,
}

#[derive(Debug)]
pub struct World {
    pub endpoint_chain_id: u64,
    pub now: u64,
    next_address: u64,
    next_tx: u64,
    pub balances: BTreeMap<ContractAddress, String>,
    pub classes: Vec<FakeClass>,
    pub quiz_contracts: Vec<FakeQuizContract>,
    pub notes_contracts: Vec<FakeNotesContract>,
    pub calls: BTreeMap<&'static str, usize>,
    /// Operations failing with a network error
    pub failing: BTreeSet<&'static str>,
    /// Operations reverting with the given message
    pub reverting: BTreeMap<&'static str, String>,
    /// Classes whose lectures cannot be read
    pub failing_lectures: BTreeSet<ContractAddress>,
}

impl Default for World {
    fn default() -> Self {
        Self {
            endpoint_chain_id: CHAIN_ID,
            now: START_TIME,
            next_address: 0x1000,
            next_tx: 1,
            balances: BTreeMap::new(),
            classes: Vec::new(),
            quiz_contracts: Vec::new(),
            notes_contracts: Vec::new(),
            calls: BTreeMap::new(),
            failing: BTreeSet::new(),
            reverting: BTreeMap::new(),
            failing_lectures: BTreeSet::new(),
        }
    }
}

impl World {
    fn new_address(&mut self) -> ContractAddress {
        self.next_address += 1;
        addr(self.next_address)
    }

    fn tx(&mut self) -> String {
        self.next_tx += 1;
        self.now += 12;
        format!("0x{:064x}", self.next_tx)
    }

    fn class(&self, class: &ContractAddress) -> ClassroomResult<&FakeClass> {
        self.classes
            .iter()
            .find(|c| &c.info.address == class)
            .ok_or_else(|| ClassroomError::not_found("class", class))
    }

    fn class_mut(&mut self, class: &ContractAddress) -> ClassroomResult<&mut FakeClass> {
        self.classes
            .iter_mut()
            .find(|c| &c.info.address == class)
            .ok_or_else(|| ClassroomError::not_found("class", class))
    }

    fn quiz_contract(&self, contract: &ContractAddress) -> ClassroomResult<&FakeQuizContract> {
        self.quiz_contracts
            .iter()
            .find(|q| &q.info.address == contract)
            .ok_or_else(|| ClassroomError::not_found("quiz contract", contract))
    }

    fn quiz_mut(&mut self, contract: &ContractAddress, quiz_id: u64) -> ClassroomResult<&mut FakeQuiz> {
        self.quiz_contracts
            .iter_mut()
            .find(|q| &q.info.address == contract)
            .and_then(|q| q.quizzes.iter_mut().find(|z| z.quiz.id == quiz_id))
            .ok_or_else(|| ClassroomError::not_found("quiz", quiz_id))
    }

    fn quiz(&self, contract: &ContractAddress, quiz_id: u64) -> ClassroomResult<&FakeQuiz> {
        self.quiz_contract(contract)?
            .quizzes
            .iter()
            .find(|z| z.quiz.id == quiz_id)
            .ok_or_else(|| ClassroomError::not_found("quiz", quiz_id))
    }

    fn notes(&self, contract: &ContractAddress) -> ClassroomResult<&FakeNotesContract> {
        self.notes_contracts
            .iter()
            .find(|n| &n.info.address == contract)
            .ok_or_else(|| ClassroomError::not_found("notes contract", contract))
    }

    fn notes_mut(&mut self, contract: &ContractAddress) -> ClassroomResult<&mut FakeNotesContract> {
        self.notes_contracts
            .iter_mut()
            .find(|n| &n.info.address == contract)
            .ok_or_else(|| ClassroomError::not_found("notes contract", contract))
    }

    // ===== Seeding =====

    pub fn add_class(&mut self, owner: &ContractAddress, name: &str, symbol: &str) -> ContractAddress {
        let address = self.new_address();
        self.classes.push(FakeClass {
            info: ClassInfo {
                address: address.clone(),
                name: name.to_string(),
                symbol: symbol.to_string(),
            },
            owner: owner.clone(),
            students: Vec::new(),
            lectures: Vec::new(),
            attendance: BTreeMap::new(),
            quiz_links: Vec::new(),
        });
        address
    }

    pub fn enroll(&mut self, class: &ContractAddress, student: &ContractAddress, name: &str) {
        if let Ok(c) = self.class_mut(class) {
            let token_id = c.students.len() as u64;
            c.students.push(Student {
                token_id,
                address: student.clone(),
                name: name.to_string(),
            });
        }
    }

    pub fn add_lecture(&mut self, class: &ContractAddress, topic: &str) -> u64 {
        let date = self.now;
        let c = self.class_mut(class).unwrap();
        let id = c.lectures.len() as u64 + 1;
        c.lectures.push(Lecture {
            id,
            topic: topic.to_string(),
            date,
        });
        id
    }

    pub fn add_quiz_contract(&mut self, owner: &ContractAddress) -> ContractAddress {
        let address = self.new_address();
        self.quiz_contracts.push(FakeQuizContract {
            info: QuizContractInfo {
                address: address.clone(),
                owner: owner.clone(),
                created_at: self.now,
            },
            quizzes: Vec::new(),
        });
        address
    }

    pub fn link(&mut self, class: &ContractAddress, quiz_contract: &ContractAddress) {
        self.class_mut(class).unwrap().quiz_links.push(quiz_contract.clone());
    }

    pub fn add_quiz(
        &mut self,
        contract: &ContractAddress,
        title: &str,
        lecture_id: u64,
        questions: Vec<QuestionDraft>,
    ) -> u64 {
        let now = self.now;
        let qc = self.quiz_contracts.iter_mut().find(|q| &q.info.address == contract).unwrap();
        let id = qc.quizzes.len() as u64 + 1;
        qc.quizzes.push(FakeQuiz {
            quiz: Quiz {
                id,
                title: title.to_string(),
                description: String::new(),
                created_at: now,
                expires_at: (now + 86_400) * 1000,
                lecture_id,
                is_active: true,
                question_count: questions.len() as u64,
            },
            questions,
            results: BTreeMap::new(),
        });
        id
    }

    pub fn add_notes_contract(&mut self, owner: &ContractAddress, class: &ContractAddress) -> ContractAddress {
        let address = self.new_address();
        let class_name = self.class(class).map(|c| c.info.name.clone()).unwrap_or_default();
        self.notes_contracts.push(FakeNotesContract {
            info: NotesContractInfo {
                address: address.clone(),
                owner: owner.clone(),
                class_name,
                created_at: self.now,
            },
            class: class.clone(),
            notes: Vec::new(),
            buyers: BTreeMap::new(),
        });
        address
    }

    pub fn add_note(
        &mut self,
        contract: &ContractAddress,
        creator: &ContractAddress,
        title: &str,
        price: &str,
        approved: bool,
    ) -> u64 {
        let now = self.now;
        let nc = self.notes_mut(contract).unwrap();
        let id = nc.notes.len() as u64 + 1;
        nc.notes.push(Note {
            id,
            title: title.to_string(),
            description: format!("{} notes", title),
            ipfs_hash: format!("bafy{}", id),
            creator: creator.clone(),
            price: price.to_string(),
            created_at: now,
            lecture_id: 1,
            is_approved: approved,
            sales_count: 0,
        });
        id
    }

    pub fn mark_present(&mut self, class: &ContractAddress, lecture_id: u64, student: &ContractAddress) {
        self.class_mut(class)
            .unwrap()
            .attendance
            .entry(lecture_id)
            .or_default()
            .push(student.clone());
    }
}

/// Fake binding acting as one account over a shared world
#[derive(Clone)]
pub struct FakeClassroom {
    pub world: Arc<Mutex<World>>,
    account: Option<ContractAddress>,
}

impl FakeClassroom {
    pub fn new(account: ContractAddress) -> Self {
        Self {
            world: Arc::new(Mutex::new(World::default())),
            account: Some(account),
        }
    }

    pub fn read_only() -> Self {
        Self {
            world: Arc::new(Mutex::new(World::default())),
            account: None,
        }
    }

    /// The same world seen by another account
    pub fn as_account(&self, account: ContractAddress) -> Self {
        Self {
            world: self.world.clone(),
            account: Some(account),
        }
    }

    pub fn world(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap()
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.world().calls.get(operation).copied().unwrap_or(0)
    }

    pub fn total_writes(&self) -> usize {
        const WRITES: [&str; 16] = [
            "create_class",
            "mint_student",
            "create_lecture",
            "mark_attendance",
            "link_quiz_to_class",
            "create_quiz_contract",
            "create_quiz",
            "add_question",
            "add_questions",
            "submit_quiz",
            "deactivate_quiz",
            "create_notes_contract",
            "create_note",
            "approve_note",
            "purchase_note",
            "update_note_price",
        ];
        WRITES.iter().map(|op| self.calls(op)).sum()
    }

    pub fn fail(&self, operation: &'static str) {
        self.world().failing.insert(operation);
    }

    pub fn revert(&self, operation: &'static str, message: &str) {
        self.world().reverting.insert(operation, message.to_string());
    }

    pub fn heal(&self, operation: &'static str) {
        let mut world = self.world();
        world.failing.remove(operation);
        world.reverting.remove(operation);
    }

    fn enter(&self, operation: &'static str) -> ClassroomResult<MutexGuard<'_, World>> {
        let mut world = self.world();
        *world.calls.entry(operation).or_default() += 1;
        if world.failing.contains(operation) {
            return Err(ClassroomError::network(format!("{} timed out", operation)));
        }
        if let Some(message) = world.reverting.get(operation) {
            return Err(ClassroomError::reverted(operation.replace('_', " "), message));
        }
        Ok(world)
    }

    fn enter_write(&self, operation: &'static str) -> ClassroomResult<(MutexGuard<'_, World>, ContractAddress)> {
        let world = self.enter(operation)?;
        let account = self
            .account
            .clone()
            .ok_or_else(|| ClassroomError::wallet("No private key configured"))?;
        Ok((world, account))
    }
}

fn revert(operation: &str, message: &str) -> ClassroomError {
    ClassroomError::reverted(operation.replace('_', " "), message)
}

#[async_trait]
impl Classroom for FakeClassroom {
    fn account(&self) -> Option<ContractAddress> {
        self.account.clone()
    }

    fn chain_id(&self) -> u64 {
        CHAIN_ID
    }

    async fn verify_network(&self) -> ClassroomResult<()> {
        let world = self.enter("verify_network")?;
        if world.endpoint_chain_id != CHAIN_ID {
            return Err(ClassroomError::wallet(format!(
                "Please switch to chain {} (connected to {})",
                CHAIN_ID, world.endpoint_chain_id
            )));
        }
        Ok(())
    }

    async fn balance(&self, account: &ContractAddress) -> ClassroomResult<String> {
        let world = self.enter("balance")?;
        Ok(world.balances.get(account).cloned().unwrap_or_else(|| "0".to_string()))
    }

    // ===== Class factory =====

    async fn create_class(&self, name: &str, symbol: &str) -> ClassroomResult<String> {
        let (mut world, account) = self.enter_write("create_class")?;
        world.add_class(&account, name, symbol);
        Ok(world.tx())
    }

    async fn fetch_classes(&self) -> ClassroomResult<Vec<ClassInfo>> {
        let world = self.enter("fetch_classes")?;
        Ok(world.classes.iter().map(|c| c.info.clone()).collect())
    }

    async fn class_owner(&self, class: &ContractAddress) -> ClassroomResult<ContractAddress> {
        let world = self.enter("class_owner")?;
        Ok(world.class(class)?.owner.clone())
    }

    async fn fetch_eligible_classes(&self, student: &ContractAddress) -> ClassroomResult<Vec<ClassInfo>> {
        let world = self.enter("fetch_eligible_classes")?;
        Ok(world
            .classes
            .iter()
            .filter(|c| c.students.iter().any(|s| &s.address == student))
            .map(|c| c.info.clone())
            .collect())
    }

    // ===== Class contract =====

    async fn mint_student(
        &self,
        class: &ContractAddress,
        student: &ContractAddress,
        name: &str,
    ) -> ClassroomResult<String> {
        let (mut world, account) = self.enter_write("mint_student")?;
        if world.class(class)?.owner != account {
            return Err(revert("mint_student", "Ownable: caller is not the owner"));
        }
        world.enroll(class, student, name);
        Ok(world.tx())
    }

    async fn create_lecture(&self, class: &ContractAddress, topic: &str) -> ClassroomResult<String> {
        let (mut world, account) = self.enter_write("create_lecture")?;
        if world.class(class)?.owner != account {
            return Err(revert("create_lecture", "Ownable: caller is not the owner"));
        }
        world.add_lecture(class, topic);
        Ok(world.tx())
    }

    async fn fetch_lectures(&self, class: &ContractAddress) -> ClassroomResult<Vec<Lecture>> {
        let world = self.enter("fetch_lectures")?;
        if world.failing_lectures.contains(class) {
            return Err(ClassroomError::network(format!("lectures of {} unavailable", class)));
        }
        Ok(world.class(class)?.lectures.clone())
    }

    async fn mark_attendance(
        &self,
        class: &ContractAddress,
        lecture_id: u64,
    ) -> ClassroomResult<AttendanceReceipt> {
        let (mut world, account) = self.enter_write("mark_attendance")?;
        let now = world.now;
        let c = world.class_mut(class)?;
        if !c.students.iter().any(|s| s.address == account) {
            return Err(revert("mark_attendance", "Not a student of this class"));
        }
        if lecture_id == 0 || lecture_id > c.lectures.len() as u64 {
            return Err(revert("mark_attendance", "Invalid lecture"));
        }
        let present = c.attendance.entry(lecture_id).or_default();
        if present.contains(&account) {
            return Err(revert("mark_attendance", "execution reverted: Attendance already marked"));
        }
        present.push(account.clone());
        let tx_hash = world.tx();
        Ok(AttendanceReceipt {
            tx_hash,
            student: account,
            lecture_id,
            timestamp_ms: now * 1000,
            signature: format!("0x{}", "ab".repeat(65)),
        })
    }

    async fn fetch_attendance_roster(
        &self,
        class: &ContractAddress,
        lecture_id: u64,
    ) -> ClassroomResult<Vec<AttendeeRecord>> {
        let world = self.enter("fetch_attendance_roster")?;
        let c = world.class(class)?;
        Ok(c.attendance
            .get(&lecture_id)
            .into_iter()
            .flatten()
            .map(|address| AttendeeRecord {
                address: address.clone(),
                name: c
                    .students
                    .iter()
                    .find(|s| &s.address == address)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn fetch_own_attendance(&self, class: &ContractAddress) -> ClassroomResult<Vec<bool>> {
        let world = self.enter("fetch_own_attendance")?;
        let c = world.class(class)?;
        let me = self.account.clone().unwrap_or_else(ContractAddress::zero);
        Ok(c.lectures
            .iter()
            .map(|l| c.attendance.get(&l.id).is_some_and(|p| p.contains(&me)))
            .collect())
    }

    async fn fetch_students(&self, class: &ContractAddress) -> ClassroomResult<Vec<Student>> {
        let world = self.enter("fetch_students")?;
        Ok(world.class(class)?.students.clone())
    }

    async fn link_quiz_to_class(
        &self,
        class: &ContractAddress,
        quiz_contract: &ContractAddress,
    ) -> ClassroomResult<String> {
        let (mut world, _) = self.enter_write("link_quiz_to_class")?;
        world.quiz_contract(quiz_contract)?;
        world.class(class)?;
        world.link(class, quiz_contract);
        Ok(world.tx())
    }

    async fn fetch_class_quiz_contracts(&self, class: &ContractAddress) -> ClassroomResult<Vec<ContractAddress>> {
        let world = self.enter("fetch_class_quiz_contracts")?;
        Ok(world.class(class)?.quiz_links.clone())
    }

    // ===== Quiz factory =====

    async fn create_quiz_contract(&self, owner: &ContractAddress) -> ClassroomResult<Option<ContractAddress>> {
        let (mut world, _) = self.enter_write("create_quiz_contract")?;
        let address = world.add_quiz_contract(owner);
        world.tx();
        Ok(Some(address))
    }

    async fn fetch_quiz_contracts(&self) -> ClassroomResult<Vec<QuizContractInfo>> {
        let world = self.enter("fetch_quiz_contracts")?;
        Ok(world.quiz_contracts.iter().map(|q| q.info.clone()).collect())
    }

    async fn fetch_owner_quiz_contracts(&self, owner: &ContractAddress) -> ClassroomResult<Vec<ContractAddress>> {
        let world = self.enter("fetch_owner_quiz_contracts")?;
        Ok(world
            .quiz_contracts
            .iter()
            .filter(|q| &q.info.owner == owner)
            .map(|q| q.info.address.clone())
            .collect())
    }

    async fn quiz_contract_count(&self) -> ClassroomResult<u64> {
        let world = self.enter("quiz_contract_count")?;
        Ok(world.quiz_contracts.len() as u64)
    }

    // ===== Quiz contract =====

    async fn create_quiz(&self, quiz_contract: &ContractAddress, quiz: &NewQuiz) -> ClassroomResult<Option<u64>> {
        let (mut world, account) = self.enter_write("create_quiz")?;
        if world.quiz_contract(quiz_contract)?.info.owner != account {
            return Err(revert("create_quiz", "Ownable: caller is not the owner"));
        }
        let id = world.add_quiz(quiz_contract, &quiz.title, quiz.lecture_id, Vec::new());
        let fake = world.quiz_mut(quiz_contract, id)?;
        fake.quiz.description = quiz.description.clone();
        fake.quiz.expires_at = quiz.expires_at;
        world.tx();
        Ok(Some(id))
    }

    async fn add_question(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
        question: &QuestionDraft,
    ) -> ClassroomResult<String> {
        let (mut world, _) = self.enter_write("add_question")?;
        question.validate()?;
        let fake = world.quiz_mut(quiz_contract, quiz_id)?;
        fake.questions.push(question.clone());
        fake.quiz.question_count = fake.questions.len() as u64;
        Ok(world.tx())
    }

    async fn add_questions(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
        questions: &[QuestionDraft],
    ) -> ClassroomResult<String> {
        let (mut world, _) = self.enter_write("add_questions")?;
        for question in questions {
            question.validate()?;
        }
        let fake = world.quiz_mut(quiz_contract, quiz_id)?;
        fake.questions.extend(questions.iter().cloned());
        fake.quiz.question_count = fake.questions.len() as u64;
        Ok(world.tx())
    }

    async fn submit_quiz(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
        answers: &[u64],
    ) -> ClassroomResult<String> {
        let (mut world, account) = self.enter_write("submit_quiz")?;
        let now = world.now;
        let fake = world.quiz_mut(quiz_contract, quiz_id)?;
        if !fake.quiz.is_active {
            return Err(revert("submit_quiz", "Quiz is not active"));
        }
        if fake.results.get(&account).is_some_and(|r| r.has_attempted) {
            return Err(revert("submit_quiz", "Quiz already attempted"));
        }
        if answers.len() != fake.questions.len() {
            return Err(revert("submit_quiz", "Answer count mismatch"));
        }
        let score = fake
            .questions
            .iter()
            .zip(answers)
            .filter(|(q, a)| q.correct_option_index as u64 == **a)
            .count() as u64;
        let total_questions = fake.questions.len() as u64;
        fake.results.insert(
            account,
            QuizResult {
                has_attempted: true,
                score,
                attempted_at: now,
                total_questions,
            },
        );
        Ok(world.tx())
    }

    async fn fetch_active_quizzes(&self, quiz_contract: &ContractAddress) -> ClassroomResult<Vec<Quiz>> {
        let world = self.enter("fetch_active_quizzes")?;
        Ok(world
            .quiz_contract(quiz_contract)?
            .quizzes
            .iter()
            .filter(|z| z.quiz.is_active)
            .map(|z| z.quiz.clone())
            .collect())
    }

    async fn fetch_lecture_quizzes(
        &self,
        quiz_contract: &ContractAddress,
        lecture_id: u64,
    ) -> ClassroomResult<Vec<Quiz>> {
        let world = self.enter("fetch_lecture_quizzes")?;
        Ok(world
            .quiz_contract(quiz_contract)?
            .quizzes
            .iter()
            .filter(|z| z.quiz.lecture_id == lecture_id)
            .map(|z| z.quiz.clone())
            .collect())
    }

    async fn fetch_quiz_questions(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
    ) -> ClassroomResult<Vec<Question>> {
        let world = self.enter("fetch_quiz_questions")?;
        Ok(world
            .quiz(quiz_contract, quiz_id)?
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| Question {
                id: i as u64,
                text: q.text.clone(),
                options: q.options.clone(),
            })
            .collect())
    }

    async fn fetch_quiz_result(
        &self,
        quiz_contract: &ContractAddress,
        quiz_id: u64,
        student: &ContractAddress,
    ) -> ClassroomResult<QuizResult> {
        let world = self.enter("fetch_quiz_result")?;
        Ok(world
            .quiz(quiz_contract, quiz_id)?
            .results
            .get(student)
            .copied()
            .unwrap_or_default())
    }

    async fn deactivate_quiz(&self, quiz_contract: &ContractAddress, quiz_id: u64) -> ClassroomResult<String> {
        let (mut world, _) = self.enter_write("deactivate_quiz")?;
        world.quiz_mut(quiz_contract, quiz_id)?.quiz.is_active = false;
        Ok(world.tx())
    }

    // ===== Notes factory =====

    async fn create_notes_contract(
        &self,
        owner: &ContractAddress,
        _class_name: &str,
        class: &ContractAddress,
    ) -> ClassroomResult<Option<ContractAddress>> {
        let (mut world, _) = self.enter_write("create_notes_contract")?;
        world.class(class)?;
        let address = world.add_notes_contract(owner, class);
        world.tx();
        Ok(Some(address))
    }

    async fn fetch_notes_contracts(&self) -> ClassroomResult<Vec<NotesContractInfo>> {
        let world = self.enter("fetch_notes_contracts")?;
        Ok(world.notes_contracts.iter().map(|n| n.info.clone()).collect())
    }

    async fn fetch_owner_notes_contracts(&self, owner: &ContractAddress) -> ClassroomResult<Vec<ContractAddress>> {
        let world = self.enter("fetch_owner_notes_contracts")?;
        Ok(world
            .notes_contracts
            .iter()
            .filter(|n| &n.info.owner == owner)
            .map(|n| n.info.address.clone())
            .collect())
    }

    async fn notes_contract_for_class(&self, class: &ContractAddress) -> ClassroomResult<Option<ContractAddress>> {
        let world = self.enter("notes_contract_for_class")?;
        Ok(world
            .notes_contracts
            .iter()
            .find(|n| &n.class == class)
            .map(|n| n.info.address.clone()))
    }

    // ===== Notes contract =====

    async fn create_note(&self, notes_contract: &ContractAddress, note: &NewNote) -> ClassroomResult<Option<u64>> {
        let (mut world, account) = self.enter_write("create_note")?;
        world.notes(notes_contract)?;
        let id =world.add_note(notes_contract, &account, &note.title, &note.price, false);
        let stored = world
            .notes_mut(notes_contract)?
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| ClassroomError::not_found("note", id))?;
        stored.description = note.description.clone();
        stored.ipfs_hash = note.ipfs_hash.clone();
        stored.lecture_id = note.lecture_id;
        world.tx();
        Ok(Some(id))
    }

    async fn approve_note(
        &self,
        notes_contract: &ContractAddress,
        note_id: u64,
        approved: bool,
    ) -> ClassroomResult<String> {
        let (mut world, account) = self.enter_write("approve_note")?;
        let nc = world.notes_mut(notes_contract)?;
        if nc.info.owner != account {
            return Err(revert("approve_note", "Only the instructor can approve notes"));
        }
        let note = nc
            .notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or_else(|| ClassroomError::not_found("note", note_id))?;
        note.is_approved = approved;
        Ok(world.tx())
    }

    async fn purchase_note(&self, notes_contract: &ContractAddress, note_id: u64) -> ClassroomResult<String> {
        let (mut world, account) = self.enter_write("purchase_note")?;
        let nc = world.notes_mut(notes_contract)?;
        let note = nc
            .notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or_else(|| ClassroomError::not_found("note", note_id))?;
        if !note.is_approved {
            return Err(revert("purchase_note", "Note is not approved"));
        }
        if !nc.buyers.entry(note_id).or_default().insert(account) {
            return Err(revert("purchase_note", "Already purchased"));
        }
        note.sales_count += 1;
        Ok(world.tx())
    }

    async fn update_note_price(
        &self,
        notes_contract: &ContractAddress,
        note_id: u64,
        new_price: &str,
    ) -> ClassroomResult<String> {
        let (mut world, account) = self.enter_write("update_note_price")?;
        let note = world
            .notes_mut(notes_contract)?
            .notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or_else(|| ClassroomError::not_found("note", note_id))?;
        if note.creator != account {
            return Err(revert("update_note_price", "Only the creator can change the price"));
        }
        note.price = new_price.to_string();
        Ok(world.tx())
    }

    async fn has_purchased_note(
        &self,
        notes_contract: &ContractAddress,
        note_id: u64,
        user: &ContractAddress,
    ) -> ClassroomResult<bool> {
        let world = self.enter("has_purchased_note")?;
        Ok(world
            .notes(notes_contract)?
            .buyers
            .get(&note_id)
            .is_some_and(|b| b.contains(user)))
    }

    async fn note_sales(&self, notes_contract: &ContractAddress, note_id: u64) -> ClassroomResult<u64> {
        let world = self.enter("note_sales")?;
        Ok(world
            .notes(notes_contract)?
            .buyers
            .get(&note_id)
            .map_or(0, |b| b.len() as u64))
    }

    async fn fetch_all_note_ids(&self, notes_contract: &ContractAddress) -> ClassroomResult<Vec<u64>> {
        let world = self.enter("fetch_all_note_ids")?;
        Ok(world.notes(notes_contract)?.notes.iter().map(|n| n.id).collect())
    }

    async fn fetch_approved_note_ids(&self, notes_contract: &ContractAddress) -> ClassroomResult<Vec<u64>> {
        let world = self.enter("fetch_approved_note_ids")?;
        Ok(world
            .notes(notes_contract)?
            .notes
            .iter()
            .filter(|n| n.is_approved)
            .map(|n| n.id)
            .collect())
    }

    async fn fetch_lecture_note_ids(
        &self,
        notes_contract: &ContractAddress,
        lecture_id: u64,
    ) -> ClassroomResult<Vec<u64>> {
        let world = self.enter("fetch_lecture_note_ids")?;
        Ok(world
            .notes(notes_contract)?
            .notes
            .iter()
            .filter(|n| n.lecture_id == lecture_id)
            .map(|n| n.id)
            .collect())
    }

    async fn fetch_created_note_ids(
        &self,
        notes_contract: &ContractAddress,
        creator: &ContractAddress,
    ) -> ClassroomResult<Vec<u64>> {
        let world = self.enter("fetch_created_note_ids")?;
        Ok(world
            .notes(notes_contract)?
            .notes
            .iter()
            .filter(|n| &n.creator == creator)
            .map(|n| n.id)
            .collect())
    }

    async fn fetch_purchased_note_ids(
        &self,
        notes_contract: &ContractAddress,
        buyer: &ContractAddress,
    ) -> ClassroomResult<Vec<u64>> {
        let world = self.enter("fetch_purchased_note_ids")?;
        Ok(world
            .notes(notes_contract)?
            .buyers
            .iter()
            .filter(|(_, buyers)| buyers.contains(buyer))
            .map(|(id, _)| *id)
            .collect())
    }

    async fn fetch_note(&self, notes_contract: &ContractAddress, note_id: u64) -> ClassroomResult<Note> {
        let world = self.enter("fetch_note")?;
        world
            .notes(notes_contract)?
            .notes
            .iter()
            .find(|n| n.id == note_id)
            .cloned()
            .ok_or_else(|| ClassroomError::not_found("note", note_id))
    }
}

/// File store that keeps uploads in memory
#[derive(Default)]
pub struct FakeFileStore {
    pub uploads: Mutex<Vec<(String, usize)>>,
    pub fail: bool,
}

#[async_trait]
impl FileStore for FakeFileStore {
    async fn upload(&self, file_name: &str, _content_type: &str, bytes: Vec<u8>) -> pheroclass_storage::Result<String> {
        if self.fail {
            return Err(StorageError::Rejected {
                status: 401,
                message: "invalid token".to_string(),
            });
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((file_name.to_string(), bytes.len()));
        Ok(format!("ipfs://bafyupload{}", uploads.len()))
    }

    fn gateway_url(&self, cid: &str) -> String {
        gateway_url("ipfs.io", cid)
    }
}

/// Question generator answering with a fixed model reply
pub struct CannedGenerator {
    pub reply: String,
}

#[async_trait]
impl QuestionGenerator for CannedGenerator {
    async fn generate(&self, _title: &str, _description: &str) -> pheroclass::quizgen::Result<Vec<QuestionDraft>> {
        parse_reply(&self.reply)
    }
}

pub fn question(text: &str, correct: usize) -> QuestionDraft {
    QuestionDraft::new(
        text,
        vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()],
        correct,
    )
}

pub fn pdf(bytes: usize) -> pheroclass::NoteFile {
    pheroclass::NoteFile {
        name: "week1.pdf".to_string(),
        content_type: pheroclass::forms::PDF_CONTENT_TYPE.to_string(),
        bytes: vec![b'%'; bytes],
    }
}
