//! Turns a line typed at the prompt into something the session understands.

use thiserror::Error;
use wizard::{AnswerValue, InputKind, Step};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Answer(AnswerValue),
    Back,
    Reset,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("please type an answer")]
    Empty,
    #[error("'{0}' is not a whole number")]
    NotANumber(String),
    #[error("'{0}' is not one of the listed options")]
    UnknownOption(String),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
}

pub fn parse_line(step: &Step, line: &str) -> Result<Command, InputError> {
    let line = line.trim();
    if let Some(command) = line.strip_prefix(':') {
        return match command {
            "back" | "b" => Ok(Command::Back),
            "reset" => Ok(Command::Reset),
            "quit" | "q" => Ok(Command::Quit),
            other => Err(InputError::UnknownCommand(other.to_string())),
        };
    }
    parse_answer(step, line).map(Command::Answer)
}

/// Chapter names and other list steps are read one item per line, so this
/// only covers single-line input kinds.
pub fn parse_answer(step: &Step, line: &str) -> Result<AnswerValue, InputError> {
    match step.input {
        InputKind::Choice => pick_choice(step, line).map(AnswerValue::Text),
        InputKind::Text => non_empty(line).map(AnswerValue::from),
        InputKind::Number => parse_number(line).map(AnswerValue::Number),
        InputKind::Slider => match (line.is_empty(), &step.slider) {
            (true, Some(slider)) => Ok(AnswerValue::Number(slider.default)),
            _ => parse_number(line).map(AnswerValue::Number),
        },
        InputKind::MultiSelect => pick_many(step, line).map(AnswerValue::List),
        InputKind::List => non_empty(line).map(|item| AnswerValue::List(vec![item.to_string()])),
    }
}

fn non_empty(line: &str) -> Result<&str, InputError> {
    if line.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(line)
}

fn parse_number(line: &str) -> Result<i64, InputError> {
    non_empty(line)?
        .parse()
        .map_err(|_| InputError::NotANumber(line.to_string()))
}

/// A 1-based index into the listed choices, or a choice value or label.
fn pick_choice(step: &Step, line: &str) -> Result<String, InputError> {
    let line = non_empty(line)?;
    if let Ok(index) = line.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| step.choices.get(i))
            .map(|choice| choice.value.clone())
            .ok_or_else(|| InputError::UnknownOption(line.to_string()));
    }
    step.choices
        .iter()
        .find(|choice| {
            choice.value.eq_ignore_ascii_case(line) || choice.label.eq_ignore_ascii_case(line)
        })
        .map(|choice| choice.value.clone())
        .ok_or_else(|| InputError::UnknownOption(line.to_string()))
}

/// Comma separated indexes or option values. Count limits are left to the
/// step's validator.
fn pick_many(step: &Step, line: &str) -> Result<Vec<String>, InputError> {
    let line = non_empty(line)?;
    let options = step
        .multi_select
        .as_ref()
        .map(|config| config.options.as_slice())
        .unwrap_or_default();

    line.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let by_index = item
                .parse::<usize>()
                .ok()
                .and_then(|index| index.checked_sub(1))
                .and_then(|i| options.get(i));
            by_index
                .or_else(|| {
                    options
                        .iter()
                        .find(|option| option.value.eq_ignore_ascii_case(item))
                })
                .map(|option| option.value.clone())
                .ok_or_else(|| InputError::UnknownOption(item.to_string()))
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/input_tests.rs"]
mod tests;
