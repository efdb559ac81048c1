use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    answer::{Answer, AnswerValue},
    steps::{GraphError, Step, StepGraph, StepId},
};

/// What `WizardSession::answer` did with a submitted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Advanced { from: StepId, to: StepId },
    /// The step's validator refused the value; nothing changed.
    Rejected { step: StepId },
}

/// In-memory state of one pass through a [`StepGraph`].
///
/// The answer list doubles as navigation history: each entry records the
/// step it was given for, and going back pops the most recent one.
#[derive(Debug, Clone)]
pub struct WizardSession {
    graph: Arc<StepGraph>,
    current_step: StepId,
    answers: Vec<Answer>,
    is_complete: bool,
    is_writing: bool,
    temp_input: String,
}

/// Read-only view handed to the presentation layer after each operation.
#[derive(Debug, Clone, Serialize)]
pub struct WizardSnapshot<'a> {
    pub current_step: StepId,
    pub step: &'a Step,
    pub progress: usize,
    pub answers: &'a [Answer],
    pub is_complete: bool,
    pub is_writing: bool,
    pub temp_input: &'a str,
}

impl WizardSession {
    pub fn new(graph: Arc<StepGraph>) -> Self {
        let current_step = graph.initial();
        let mut session = Self {
            graph,
            current_step,
            answers: Vec::new(),
            is_complete: false,
            is_writing: false,
            temp_input: String::new(),
        };
        session.is_complete = session.current_step == session.graph.terminal();
        session
    }

    pub fn book_wizard() -> Result<Self, GraphError> {
        Ok(Self::new(Arc::new(StepGraph::book_wizard()?)))
    }

    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    /// Returns the session to the entry step with no answers. Idempotent.
    pub fn reset(&mut self) {
        self.current_step = self.graph.initial();
        self.answers.clear();
        self.is_complete = self.current_step == self.graph.terminal();
        self.is_writing = false;
        self.temp_input.clear();
    }

    pub fn start(&mut self) {
        self.reset();
    }

    pub fn answer(&mut self, value: impl Into<AnswerValue>) -> AnswerOutcome {
        let value = value.into();
        let from = self.current_step;
        let step = self.graph.step(from);

        if !step.accepts(&value) {
            warn!(step = %from, ?value, "answer rejected by step validator");
            return AnswerOutcome::Rejected { step: from };
        }

        let to = match self.graph.transition(step, &value) {
            Some(next) => next,
            None => {
                let terminal = self.graph.terminal();
                warn!(step = %from, ?value, %terminal, "no transition for answer; falling back to terminal step");
                terminal
            }
        };

        self.answers.push(Answer {
            step_id: from,
            value,
        });
        self.current_step = to;
        self.is_complete = to == self.graph.terminal();
        self.temp_input.clear();
        debug!(%from, %to, answers = self.answers.len(), "wizard advanced");

        AnswerOutcome::Advanced { from, to }
    }

    /// Drops the most recent answer and returns to the step it answered.
    /// Returns `false` when there was nothing to undo. Text typed before the
    /// step was submitted is not restored.
    ///
    /// This deliberately returns to the step the removed answer was given
    /// for, not to the step of the answer now last in history, so that
    /// `answer` followed by `go_to_previous_step` lands where it started.
    pub fn go_to_previous_step(&mut self) -> bool {
        let Some(removed) = self.answers.pop() else {
            return false;
        };
        self.current_step = removed.step_id;
        self.is_complete = self.current_step == self.graph.terminal();
        self.temp_input.clear();
        true
    }

    pub fn set_temp_input(&mut self, text: impl Into<String>) {
        self.temp_input = text.into();
    }

    pub fn set_writing(&mut self, is_writing: bool) {
        self.is_writing = is_writing;
    }

    pub fn current_step(&self) -> StepId {
        self.current_step
    }

    pub fn current_step_data(&self) -> &Step {
        self.graph.step(self.current_step)
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// First recorded answer for `step_id`.
    pub fn answer_for(&self, step_id: StepId) -> Option<&AnswerValue> {
        self.answers
            .iter()
            .find(|answer| answer.step_id == step_id)
            .map(|answer| &answer.value)
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn is_writing(&self) -> bool {
        self.is_writing
    }

    pub fn temp_input(&self) -> &str {
        &self.temp_input
    }

    /// 1-based number of the step being shown.
    pub fn progress(&self) -> usize {
        self.answers.len() + 1
    }

    pub fn snapshot(&self) -> WizardSnapshot<'_> {
        WizardSnapshot {
            current_step: self.current_step,
            step: self.current_step_data(),
            progress: self.progress(),
            answers: &self.answers,
            is_complete: self.is_complete,
            is_writing: self.is_writing,
            temp_input: &self.temp_input,
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
