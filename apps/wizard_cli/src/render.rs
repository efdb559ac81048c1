use std::fmt::Write as _;

use wizard::{AnswerValue, InputKind, StepId, WizardSession};

/// Steps echoed on the "so far" line, in reading order.
const SO_FAR: [StepId; 5] = [
    StepId::BookType,
    StepId::FictionGenre,
    StepId::NonFictionCategory,
    StepId::BookTitle,
    StepId::TargetAudience,
];

/// Text block shown above the prompt for the current step.
pub fn render_step(session: &WizardSession) -> String {
    let snapshot = session.snapshot();
    let step = snapshot.step;
    let mut out = String::new();
    let _ = writeln!(out, "\n[{}] {}", snapshot.progress, step.title);
    if !step.description.is_empty() {
        let _ = writeln!(out, "    {}", step.description);
    }
    if let Some(line) = so_far(session) {
        let _ = writeln!(out, "    so far: {line}");
    }

    for (index, choice) in step.choices.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", index + 1, choice.label);
    }
    if let Some(slider) = &step.slider {
        let _ = writeln!(
            out,
            "  {} ({}) .. {} ({}), enter for {}",
            slider.min, slider.left_label, slider.max, slider.right_label, slider.default
        );
    }
    if let Some(config) = &step.multi_select {
        for (index, option) in config.options.iter().enumerate() {
            let icon = option.icon.as_deref().unwrap_or("-");
            let _ = writeln!(out, "  {}. {icon} {}", index + 1, option.label);
        }
        let _ = writeln!(
            out,
            "  pick {} to {}, separated by commas",
            config.min_select, config.max_select
        );
    }

    if !snapshot.temp_input.is_empty() {
        let _ = writeln!(out, "  draft: {}", snapshot.temp_input);
    }
    if snapshot.is_writing {
        let _ = writeln!(out, "  (writing...)");
    }

    out
}

fn so_far(session: &WizardSession) -> Option<String> {
    let parts: Vec<String> = SO_FAR
        .iter()
        .filter_map(|&step| match (step, session.answer_for(step)?) {
            (StepId::BookTitle, AnswerValue::Text(title)) => Some(format!("\"{title}\"")),
            (_, AnswerValue::Text(text)) => Some(text.clone()),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join(" / "))
}

pub fn prompt(kind: InputKind) -> &'static str {
    match kind {
        InputKind::Choice => "choose> ",
        InputKind::Text => "write> ",
        InputKind::Number | InputKind::Slider => "number> ",
        InputKind::MultiSelect => "select> ",
        InputKind::List => "name> ",
    }
}

pub fn render_summary(lines: &[(&'static str, String)]) -> String {
    let mut out = String::from("\nYour book so far:\n");
    for (label, value) in lines {
        let _ = writeln!(out, "  {label}: {value}");
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
