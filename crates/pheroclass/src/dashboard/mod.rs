//! Role dashboards
//!
//! A dashboard loads its classes once, then reads per class: lectures,
//! linked quiz contracts with their quizzes, and the notes contract. Reads for
//! different classes run concurrently and a class that fails to load is
//! skipped. Every user action sets a busy flag, performs one write, updates
//! the affected slice of state and leaves a status message.

pub mod student;
pub mod teacher;

pub use student::{StudentAction, StudentDashboard, StudentTab};
pub use teacher::{TeacherAction, TeacherDashboard, TeacherTab};

use pheroclass_classroom::{Classroom, ClassInfo, ClassroomResult, ContractAddress, Lecture, Quiz, QuizKey};
use tracing::{debug, warn};

use crate::fanout::fan_out;
use crate::state::EntityMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    /// Loaded, but the account has no classes
    Empty,
    Loaded,
}

/// Everything read for one class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSnapshot {
    pub lectures: Vec<Lecture>,
    pub quiz_contracts: Vec<ContractAddress>,
    pub quizzes: Vec<(ContractAddress, Vec<Quiz>)>,
    pub notes_contract: Option<ContractAddress>,
}

/// Read one class
///
/// Lectures are required; quiz and notes reads that fail are logged and
/// left empty.
pub async fn load_class(
    classroom: &dyn Classroom,
    class: &ContractAddress,
    concurrency: usize,
) -> ClassroomResult<ClassSnapshot> {
    let lectures = classroom.fetch_lectures(class).await?;

    let quiz_contracts = match classroom.fetch_class_quiz_contracts(class).await {
        Ok(contracts) => contracts,
        Err(e) => {
            warn!("Failed to fetch quiz contracts of class {}: {}", class, e);
            Vec::new()
        }
    };
    let quizzes = load_quizzes(classroom, quiz_contracts.clone(), concurrency).await;

    let notes_contract = match classroom.notes_contract_for_class(class).await {
        Ok(contract) => contract,
        Err(e) => {
            warn!("Failed to fetch notes contract of class {}: {}", class, e);
            None
        }
    };

    debug!(
        "Class {}: {} lectures, {} quiz contracts, notes contract {:?}",
        class,
        lectures.len(),
        quiz_contracts.len(),
        notes_contract
    );
    Ok(ClassSnapshot {
        lectures,
        quiz_contracts,
        quizzes,
        notes_contract,
    })
}

/// Active quizzes of each quiz contract
pub async fn load_quizzes(
    classroom: &dyn Classroom,
    quiz_contracts: Vec<ContractAddress>,
    concurrency: usize,
) -> Vec<(ContractAddress, Vec<Quiz>)> {
    fan_out("quizzes", quiz_contracts, concurrency, |contract| async move {
        classroom.fetch_active_quizzes(&contract).await
    })
    .await
}

/// Classes and their per-class read models
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassBoard {
    pub load_state: LoadState,
    pub classes: Vec<ClassInfo>,
    pub selected_class: Option<ContractAddress>,
    pub lectures: EntityMap<ContractAddress, Vec<Lecture>>,
    pub quiz_contracts: EntityMap<ContractAddress, Vec<ContractAddress>>,
    pub quizzes: EntityMap<ContractAddress, Vec<Quiz>>,
    pub notes_contracts: EntityMap<ContractAddress, ContractAddress>,
}

impl Default for ClassBoard {
    fn default() -> Self {
        Self {
            load_state: LoadState::Loading,
            classes: Vec::new(),
            selected_class: None,
            lectures: EntityMap::new(),
            quiz_contracts: EntityMap::new(),
            quizzes: EntityMap::new(),
            notes_contracts: EntityMap::new(),
        }
    }
}

impl ClassBoard {
    /// Replace the class list, keeping the selection when it still exists
    pub fn set_classes(&mut self, classes: Vec<ClassInfo>) {
        let keep = self
            .selected_class
            .as_ref()
            .is_some_and(|selected| classes.iter().any(|c| &c.address == selected));
        if !keep {
            self.selected_class = classes.first().map(|c| c.address.clone());
        }
        self.load_state = if classes.is_empty() {
            LoadState::Empty
        } else {
            LoadState::Loaded
        };
        self.classes = classes;
    }

    pub fn apply(&mut self, class: ContractAddress, snapshot: ClassSnapshot) {
        self.lectures.insert(class.clone(), snapshot.lectures);
        self.quiz_contracts.insert(class.clone(), snapshot.quiz_contracts);
        for (contract, quizzes) in snapshot.quizzes {
            self.quizzes.insert(contract, quizzes);
        }
        match snapshot.notes_contract {
            Some(notes) => {
                self.notes_contracts.insert(class, notes);
            }
            None => {
                self.notes_contracts.remove(&class);
            }
        }
    }

    /// Select a class the account has; unknown addresses are ignored
    pub fn select_class(&mut self, class: &ContractAddress) -> bool {
        if self.classes.iter().any(|c| &c.address == class) {
            self.selected_class = Some(class.clone());
            true
        } else {
            false
        }
    }

    pub fn class(&self, class: &ContractAddress) -> Option<&ClassInfo> {
        self.classes.iter().find(|c| &c.address == class)
    }

    pub fn lectures_of(&self, class: &ContractAddress) -> &[Lecture] {
        self.lectures.get(class).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn quiz_contracts_of(&self, class: &ContractAddress) -> &[ContractAddress] {
        self.quiz_contracts.get(class).map(Vec::as_slice).unwrap_or_default()
    }

    /// Quizzes of every quiz contract linked to `class`
    pub fn quizzes_of(&self, class: &ContractAddress) -> Vec<(QuizKey, &Quiz)> {
        self.quiz_contracts_of(class)
            .iter()
            .flat_map(|contract| {
                self.quizzes
                    .get(contract)
                    .into_iter()
                    .flatten()
                    .map(move |quiz| (QuizKey::new(contract.clone(), quiz.id), quiz))
            })
            .collect()
    }

    pub fn quiz(&self, key: &QuizKey) -> Option<&Quiz> {
        self.quizzes.get(&key.contract)?.iter().find(|q| q.id == key.quiz_id)
    }

    pub fn notes_contract_of(&self, class: &ContractAddress) -> Option<&ContractAddress> {
        self.notes_contracts.get(class)
    }
}
