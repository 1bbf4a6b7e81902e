//! Read models shared by every classroom binding

pub mod address;
pub mod class;
pub mod note;
pub mod quiz;

pub use address::*;
pub use class::*;
pub use note::*;
pub use quiz::*;
