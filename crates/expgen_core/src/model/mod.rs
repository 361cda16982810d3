//! Experiment model produced by the parser and consumed by the generator.

pub mod experiment;
pub mod layout;
pub mod response;
pub mod trial;

pub use experiment::{Experiment, Instruction, DEFAULT_RESULTS_FILENAME};
pub use layout::{Frame, Position, TextControl};
pub use response::{Response, ResponseKind};
pub use trial::{Trial, TrialStep, TrialType};
