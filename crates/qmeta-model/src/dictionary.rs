//! Raw field-dictionary rows as exported by the electronic-forms system.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared field kind of a dictionary row.
///
/// Kinds the classifier has no handler for are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Checkbox,
    Radio,
    Calc,
    Dropdown,
    Text,
    Notes,
    Slider,
    YesNo,
    TrueFalse,
    Other(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Calc => "calc",
            FieldKind::Dropdown => "dropdown",
            FieldKind::Text => "text",
            FieldKind::Notes => "notes",
            FieldKind::Slider => "slider",
            FieldKind::YesNo => "yesno",
            FieldKind::TrueFalse => "truefalse",
            FieldKind::Other(raw) => raw,
        }
    }
}

impl From<&str> for FieldKind {
    fn from(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase().replace(['_', '-', ' ', '/'], "");
        match normalized.as_str() {
            "checkbox" => FieldKind::Checkbox,
            "radio" => FieldKind::Radio,
            "calc" => FieldKind::Calc,
            "dropdown" => FieldKind::Dropdown,
            "text" => FieldKind::Text,
            "notes" => FieldKind::Notes,
            "slider" => FieldKind::Slider,
            "yesno" => FieldKind::YesNo,
            "truefalse" => FieldKind::TrueFalse,
            _ => FieldKind::Other(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One question as declared in the field dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryField {
    pub name: String,
    pub form_name: String,
    pub kind: FieldKind,
    pub label: String,
    /// Raw `key, label | key, label` string, calc formula or slider anchors.
    pub choices: Option<String>,
    /// Text validation type (`date_dmy`, `number`, ...) or slider number display flag.
    pub validation: Option<String>,
    pub validation_min: Option<String>,
    pub validation_max: Option<String>,
    pub branching_logic: Option<String>,
}

impl DictionaryField {
    pub fn new(
        name: impl Into<String>,
        form_name: impl Into<String>,
        kind: FieldKind,
        label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            form_name: form_name.into(),
            kind,
            label: label.into(),
            choices: None,
            validation: None,
            validation_min: None,
            validation_max: None,
            branching_logic: None,
        }
    }

    #[must_use]
    pub fn with_choices(mut self, choices: impl Into<String>) -> Self {
        self.choices = Some(choices.into());
        self
    }

    #[must_use]
    pub fn with_validation(mut self, validation: impl Into<String>) -> Self {
        self.validation = Some(validation.into());
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, min: Option<String>, max: Option<String>) -> Self {
        self.validation_min = min;
        self.validation_max = max;
        self
    }

    #[must_use]
    pub fn with_branching_logic(mut self, logic: impl Into<String>) -> Self {
        self.branching_logic = Some(logic.into());
        self
    }
}
