//! Flattening of a finished session into the record the persistence API
//! accepts.

use shared::protocol::{ChapterInput, CreateBookRequest};

use crate::{answer::AnswerValue, session::WizardSession, steps::StepId};

/// Builds the book record from whatever the session has answered so far.
/// Missing answers become empty strings or absent optionals; the server
/// decides whether the result is acceptable.
pub fn book_request(session: &WizardSession) -> CreateBookRequest {
    let text = |step: StepId| {
        session
            .answer_for(step)
            .and_then(|value| value.as_text())
            .map(str::to_string)
    };
    let list = |step: StepId| {
        session
            .answer_for(step)
            .and_then(|value| value.as_list())
            .map(<[String]>::to_vec)
    };

    let chapters = list(StepId::ChapterNames)
        .unwrap_or_default()
        .into_iter()
        .zip(1..)
        .map(|(title, number)| ChapterInput { number, title })
        .collect();

    CreateBookRequest {
        title: text(StepId::BookTitle).unwrap_or_default(),
        book_type: text(StepId::BookType).unwrap_or_default(),
        genre: text(StepId::FictionGenre),
        category: text(StepId::NonFictionCategory),
        target_audience: text(StepId::TargetAudience),
        writing_tone: session
            .answer_for(StepId::WritingTone)
            .and_then(|value| value.as_number()),
        themes: list(StepId::Themes),
        chapters,
    }
}

/// Pretty-printed JSON of [`book_request`].
pub fn export_json(session: &WizardSession) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&book_request(session))
}

/// Short recap shown once the wizard reaches its terminal step.
pub fn summary(session: &WizardSession) -> Vec<(&'static str, String)> {
    let shown = |step: StepId| {
        session
            .answer_for(step)
            .map(|value| match value {
                AnswerValue::Text(text) => text.clone(),
                AnswerValue::Number(number) => number.to_string(),
                AnswerValue::List(items) => items.join(", "),
            })
            .unwrap_or_else(|| "-".to_string())
    };

    vec![
        ("Book Type", shown(StepId::BookType)),
        ("Title", shown(StepId::BookTitle)),
        ("Chapters", shown(StepId::ChapterCount)),
    ]
}

#[cfg(test)]
#[path = "tests/export_tests.rs"]
mod tests;
