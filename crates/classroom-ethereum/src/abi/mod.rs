//! Contract ABI bindings module
//!
//! Alloy-generated bindings for the factory and instance contracts of a
//! PheroClass deployment.

pub mod class;
pub mod notes;
pub mod quiz;

pub use class::{ClassContract, ClassFactory};
pub use notes::{NotesContract, NotesFactory};
pub use quiz::{QuizContract, QuizContractFactory};
