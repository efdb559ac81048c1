use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::answer::AnswerValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepId {
    Init,
    BookType,
    FictionGenre,
    NonFictionCategory,
    BookTitle,
    TargetAudience,
    WritingTone,
    Themes,
    ChapterCount,
    ChapterNames,
    Complete,
}

impl StepId {
    pub const ALL: [StepId; 11] = [
        StepId::Init,
        StepId::BookType,
        StepId::FictionGenre,
        StepId::NonFictionCategory,
        StepId::BookTitle,
        StepId::TargetAudience,
        StepId::WritingTone,
        StepId::Themes,
        StepId::ChapterCount,
        StepId::ChapterNames,
        StepId::Complete,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepId::Init => "INIT",
            StepId::BookType => "BOOK_TYPE",
            StepId::FictionGenre => "FICTION_GENRE",
            StepId::NonFictionCategory => "NON_FICTION_CATEGORY",
            StepId::BookTitle => "BOOK_TITLE",
            StepId::TargetAudience => "TARGET_AUDIENCE",
            StepId::WritingTone => "WRITING_TONE",
            StepId::Themes => "THEMES",
            StepId::ChapterCount => "CHAPTER_COUNT",
            StepId::ChapterNames => "CHAPTER_NAMES",
            StepId::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    Choice,
    Text,
    Number,
    List,
    Slider,
    MultiSelect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepChoice {
    pub value: String,
    pub label: String,
    pub next_step: StepId,
    /// Presentation hint for the scene layer; the engine ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_effect: Option<String>,
}

impl StepChoice {
    pub fn new(value: impl Into<String>, label: impl Into<String>, next_step: StepId) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            next_step,
            scene_effect: None,
        }
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.scene_effect = Some(effect.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderConfig {
    pub min: i64,
    pub max: i64,
    pub default: i64,
    pub left_label: String,
    pub right_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSelectOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSelectConfig {
    pub min_select: usize,
    pub max_select: usize,
    pub options: Vec<MultiSelectOption>,
}

/// Predicate a step applies to a submitted value before recording it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Validator {
    /// Text of at least `min` characters.
    MinChars { min: usize },
    /// Integer within `min..=max`.
    IntRange { min: i64, max: i64 },
    /// Between `min` and `max` distinct entries, each one of `allowed`.
    Selection {
        min: usize,
        max: usize,
        allowed: Vec<String>,
    },
    /// Non-empty list whose entries are all non-blank.
    NonBlankItems,
}

impl Validator {
    pub fn accepts(&self, value: &AnswerValue) -> bool {
        match (self, value) {
            (Validator::MinChars { min }, AnswerValue::Text(text)) => text.chars().count() >= *min,
            (Validator::IntRange { min, max }, AnswerValue::Number(number)) => {
                (*min..=*max).contains(number)
            }
            (Validator::Selection { min, max, allowed }, AnswerValue::List(items)) => {
                let distinct: HashSet<&String> = items.iter().collect();
                distinct.len() == items.len()
                    && (*min..=*max).contains(&items.len())
                    && items.iter().all(|item| allowed.contains(item))
            }
            (Validator::NonBlankItems, AnswerValue::List(items)) => {
                !items.is_empty() && items.iter().all(|item| !item.trim().is_empty())
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub title: String,
    pub description: String,
    pub input: InputKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<StepChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<StepId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<Validator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slider: Option<SliderConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_select: Option<MultiSelectConfig>,
}

impl Step {
    fn base(id: StepId, title: &str, description: &str, input: InputKind) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            input,
            choices: Vec::new(),
            next_step: None,
            validator: None,
            slider: None,
            multi_select: None,
        }
    }

    pub fn choice(id: StepId, title: &str, description: &str, choices: Vec<StepChoice>) -> Self {
        Self {
            choices,
            ..Self::base(id, title, description, InputKind::Choice)
        }
    }

    /// Single-successor step of any non-choice kind.
    pub fn linear(
        id: StepId,
        title: &str,
        description: &str,
        input: InputKind,
        next_step: StepId,
    ) -> Self {
        Self {
            next_step: Some(next_step),
            ..Self::base(id, title, description, input)
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Attaches the slider configuration and the matching range check.
    pub fn with_slider(mut self, slider: SliderConfig) -> Self {
        self.validator = Some(Validator::IntRange {
            min: slider.min,
            max: slider.max,
        });
        self.slider = Some(slider);
        self
    }

    /// Attaches the option list and the matching selection check.
    pub fn with_multi_select(mut self, config: MultiSelectConfig) -> Self {
        self.validator = Some(Validator::Selection {
            min: config.min_select,
            max: config.max_select,
            allowed: config.options.iter().map(|o| o.value.clone()).collect(),
        });
        self.multi_select = Some(config);
        self
    }

    pub fn accepts(&self, value: &AnswerValue) -> bool {
        self.validator
            .as_ref()
            .map_or(true, |validator| validator.accepts(value))
    }

    pub fn find_choice(&self, value: &AnswerValue) -> Option<&StepChoice> {
        let value = value.as_text()?;
        self.choices.iter().find(|choice| choice.value == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("step {0} is defined more than once")]
    DuplicateStep(StepId),
    #[error("step {0} has no definition")]
    MissingStep(StepId),
    #[error("choice step {0} has no choices")]
    NoChoices(StepId),
    #[error("step {0} has input kind {1:?} but carries choices")]
    UnexpectedChoices(StepId, InputKind),
}

/// Immutable questionnaire: one [`Step`] per [`StepId`], plus the entry and
/// terminal identifiers. Construction checks the table so lookups by id
/// never fail afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepGraph {
    initial: StepId,
    terminal: StepId,
    steps: Vec<Step>,
}

impl StepGraph {
    pub fn new(initial: StepId, terminal: StepId, steps: Vec<Step>) -> Result<Self, GraphError> {
        let mut slots: Vec<Option<Step>> = vec![None; StepId::ALL.len()];
        for step in steps {
            match step.input {
                InputKind::Choice if step.choices.is_empty() => {
                    return Err(GraphError::NoChoices(step.id));
                }
                InputKind::Choice => {}
                other if !step.choices.is_empty() => {
                    return Err(GraphError::UnexpectedChoices(step.id, other));
                }
                _ => {}
            }
            let slot = &mut slots[step.id.index()];
            if slot.is_some() {
                return Err(GraphError::DuplicateStep(step.id));
            }
            *slot = Some(step);
        }

        let steps = StepId::ALL
            .into_iter()
            .zip(slots)
            .map(|(id, slot)| slot.ok_or(GraphError::MissingStep(id)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            initial,
            terminal,
            steps,
        })
    }

    pub fn initial(&self) -> StepId {
        self.initial
    }

    pub fn terminal(&self) -> StepId {
        self.terminal
    }

    pub fn step(&self, id: StepId) -> &Step {
        &self.steps[id.index()]
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Successor of `step` for `value`, or `None` when the table defines no
    /// transition for it.
    pub fn transition(&self, step: &Step, value: &AnswerValue) -> Option<StepId> {
        match step.input {
            InputKind::Choice => step.find_choice(value).map(|choice| choice.next_step),
            _ => step.next_step,
        }
    }

    /// The questionnaire of the book creation wizard.
    pub fn book_wizard() -> Result<Self, GraphError> {
        Self::new(StepId::Init, StepId::Complete, book_wizard_steps())
    }
}

pub const MIN_TITLE_CHARS: usize = 3;
pub const MIN_CHAPTERS: i64 = 1;
pub const MAX_CHAPTERS: i64 = 50;

fn book_wizard_steps() -> Vec<Step> {
    use StepId::*;

    vec![
        Step::choice(
            Init,
            "Welcome to Book Wizard",
            "Let's create something magical together",
            vec![StepChoice::new("start", "Start Creating", BookType).with_effect("glow")],
        ),
        Step::choice(
            BookType,
            "What type of book do you want to create?",
            "This will help us tailor the questions for you",
            vec![
                StepChoice::new("fiction", "📚 Fiction (Novel, Story)", FictionGenre)
                    .with_effect("add_book_fiction"),
                StepChoice::new(
                    "non-fiction",
                    "📖 Non-Fiction (Educational, Technical)",
                    NonFictionCategory,
                )
                .with_effect("add_book_technical"),
            ],
        ),
        Step::choice(
            FictionGenre,
            "Choose your fiction genre",
            "What kind of story do you want to tell?",
            vec![
                StepChoice::new("fantasy", "🧙 Fantasy", BookTitle).with_effect("add_magic_staff"),
                StepChoice::new("sci-fi", "🚀 Science Fiction", BookTitle)
                    .with_effect("add_hologram"),
                StepChoice::new("mystery", "🔍 Mystery", BookTitle)
                    .with_effect("add_magnifying_glass"),
                StepChoice::new("romance", "❤️ Romance", BookTitle).with_effect("add_rose"),
            ],
        ),
        Step::choice(
            NonFictionCategory,
            "What's your non-fiction category?",
            "Select the type of educational content",
            vec![
                StepChoice::new("programming", "💻 Programming/Software", BookTitle)
                    .with_effect("add_laptop"),
                StepChoice::new("business", "💼 Business/Finance", BookTitle)
                    .with_effect("add_briefcase"),
                StepChoice::new("science", "🔬 Science/Research", BookTitle)
                    .with_effect("add_microscope"),
                StepChoice::new("self-help", "🌟 Self-Help/Personal Development", BookTitle)
                    .with_effect("add_star"),
            ],
        ),
        Step::linear(
            BookTitle,
            "What's the title of your book?",
            "Give your book a name",
            InputKind::Text,
            TargetAudience,
        )
        .with_validator(Validator::MinChars {
            min: MIN_TITLE_CHARS,
        }),
        Step::choice(
            TargetAudience,
            "Who is your target audience?",
            "Select the primary readers for your book",
            vec![
                StepChoice::new("children", "👶 Children (ages 3-12)", WritingTone),
                StepChoice::new("young-adult", "🎒 Young Adult (ages 13-18)", WritingTone),
                StepChoice::new("adults", "👨‍💼 Adults (ages 18+)", WritingTone),
                StepChoice::new("professionals", "💼 Professionals/Academics", WritingTone),
            ],
        ),
        Step::linear(
            WritingTone,
            "Choose your writing style",
            "How formal should the tone be?",
            InputKind::Slider,
            Themes,
        )
        .with_slider(SliderConfig {
            min: 1,
            max: 10,
            default: 5,
            left_label: "Casual & Playful".to_string(),
            right_label: "Formal & Academic".to_string(),
        }),
        Step::linear(
            Themes,
            "Select themes for your book",
            "Pick 1-3 themes that will be central to your story",
            InputKind::MultiSelect,
            ChapterCount,
        )
        .with_multi_select(MultiSelectConfig {
            min_select: 1,
            max_select: 3,
            options: [
                ("love", "Love & Romance", "❤️"),
                ("adventure", "Adventure", "🗺️"),
                ("mystery", "Mystery & Suspense", "🔍"),
                ("coming-of-age", "Coming of Age", "🌱"),
                ("good-vs-evil", "Good vs Evil", "⚔️"),
                ("redemption", "Redemption", "✨"),
                ("survival", "Survival", "🏔️"),
                ("betrayal", "Betrayal & Trust", "🎭"),
            ]
            .into_iter()
            .map(|(value, label, icon)| MultiSelectOption {
                value: value.to_string(),
                label: label.to_string(),
                icon: Some(icon.to_string()),
            })
            .collect(),
        }),
        Step::linear(
            ChapterCount,
            "How many chapters will your book have?",
            "Choose between 1 and 50 chapters",
            InputKind::Number,
            ChapterNames,
        )
        .with_validator(Validator::IntRange {
            min: MIN_CHAPTERS,
            max: MAX_CHAPTERS,
        }),
        Step::linear(
            ChapterNames,
            "Name your chapters",
            "Provide a name for each chapter",
            InputKind::List,
            Complete,
        )
        .with_validator(Validator::NonBlankItems),
        Step::choice(
            Complete,
            "✨ Your book structure is ready!",
            "We've created the foundation for your book",
            vec![
                StepChoice::new("save", "Save to Database", Complete),
                StepChoice::new("export", "Export as JSON", Complete),
            ],
        ),
    ]
}

#[cfg(test)]
#[path = "tests/steps_tests.rs"]
mod tests;
