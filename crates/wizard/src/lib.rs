//! Book creation wizard: a declarative step graph and the session state
//! machine that walks it.

pub mod answer;
pub mod export;
pub mod session;
pub mod steps;

pub use answer::{Answer, AnswerValue};
pub use session::{AnswerOutcome, WizardSession, WizardSnapshot};
pub use steps::{GraphError, InputKind, Step, StepChoice, StepGraph, StepId, Validator};
