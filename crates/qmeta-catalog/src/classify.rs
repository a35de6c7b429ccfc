//! Question type inference from field dictionary rows.
//!
//! Classification is total and deterministic: every [`FieldKind`] maps to one
//! handler, and identical rows always produce identical results.
//!
//! # Algorithm
//!
//! Dispatch on the declared field kind:
//!
//! 1. `checkbox` → Binary, flagged as an indicator group (one question per choice).
//! 2. `radio` → inspect the choice set:
//!    - two choices keyed `{0, 1}` with a yes/no label pair → Binary
//!    - two choices keyed `{0, 1}` or `{1, 2}` → CategoricalBinary
//!    - every label contains a digit → Ordinal
//!    - otherwise → Categorical
//! 3. `text` → identifier-like names are Textual; otherwise the validation hint
//!    decides (date/time hints → Date, number/integer → Numeric, else Textual).
//! 4. `calc` → NoType, `dropdown` → Categorical, `notes` → Textual,
//!    `yesno`/`truefalse` → Binary.
//! 5. `slider` → Slider, keeping the anchor description and a 0-10 default range.
//! 6. Anything else → NoType.

use qmeta_common::{name_tokens, parse_f64};
use qmeta_model::{
    Bounds, ChoiceSet, Choices, DictionaryField, FieldKind, QuestionType, Validator, ValueRange,
};

use crate::choices::parse_choices;

/// Name tokens that mark a free-text identifier regardless of its validation hint.
const IDENTIFIER_TOKENS: &[&str] = &["id", "tz", "mrn", "phone", "email", "zip", "passport"];

/// `(label for 1, label for 0)` pairs treated as a plain yes/no question.
const YES_NO_LABELS: &[(&str, &str)] = &[("yes", "no"), ("true", "false"), ("כן", "לא")];

/// Result of classifying one dictionary row.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub question_type: QuestionType,
    pub choices: Option<Choices>,
    pub bounds: Bounds,
    pub value_range: Option<ValueRange>,
    pub validator: Validator,
    /// The row is a multi-select field to expand into indicator questions.
    pub is_indicator_group: bool,
}

impl Classification {
    fn new(question_type: QuestionType, choices: Option<ChoiceSet>, bounds: Bounds) -> Self {
        let validator = question_type.validator(choices.as_ref(), bounds);
        Self {
            question_type,
            choices: choices.map(Choices::Options),
            bounds,
            value_range: None,
            validator,
            is_indicator_group: false,
        }
    }

    /// The parsed choice set, if any.
    pub fn choice_set(&self) -> Option<&ChoiceSet> {
        self.choices.as_ref().and_then(Choices::options)
    }
}

/// Classify one dictionary row.
pub fn classify(field: &DictionaryField) -> Classification {
    let bounds = declared_bounds(field);
    match &field.kind {
        FieldKind::Checkbox => {
            let mut classification =
                Classification::new(QuestionType::Binary, Some(field_choices(field)), bounds);
            classification.is_indicator_group = true;
            classification
        }
        FieldKind::Radio => classify_radio(field_choices(field), bounds),
        FieldKind::Text => Classification::new(classify_text(field), None, bounds),
        FieldKind::Calc => Classification::new(QuestionType::NoType, None, bounds),
        FieldKind::Dropdown => {
            Classification::new(QuestionType::Categorical, Some(field_choices(field)), bounds)
        }
        FieldKind::Notes => Classification::new(QuestionType::Textual, None, bounds),
        FieldKind::YesNo | FieldKind::TrueFalse => {
            Classification::new(QuestionType::Binary, None, bounds)
        }
        FieldKind::Slider => {
            let range = ValueRange::slider(bounds);
            Classification {
                question_type: QuestionType::Slider,
                choices: field.choices.clone().map(Choices::SliderLabels),
                bounds,
                value_range: Some(range),
                validator: Validator::Slider(range),
                is_indicator_group: false,
            }
        }
        FieldKind::Other(_) => Classification::new(QuestionType::NoType, None, bounds),
    }
}

fn field_choices(field: &DictionaryField) -> ChoiceSet {
    field
        .choices
        .as_deref()
        .map(parse_choices)
        .unwrap_or_default()
}

fn declared_bounds(field: &DictionaryField) -> Bounds {
    Bounds::new(
        field.validation_min.as_deref().and_then(parse_f64),
        field.validation_max.as_deref().and_then(parse_f64),
    )
}

fn classify_radio(choices: ChoiceSet, bounds: Bounds) -> Classification {
    let question_type = radio_type(&choices);
    let choices = question_type.has_choices().then_some(choices);
    Classification::new(question_type, choices, bounds)
}

fn radio_type(choices: &ChoiceSet) -> QuestionType {
    let mut keys = choices.keys();
    keys.sort_unstable();
    if keys == [0, 1] {
        if is_yes_no(choices) {
            return QuestionType::Binary;
        }
        return QuestionType::CategoricalBinary;
    }
    if keys == [1, 2] {
        return QuestionType::CategoricalBinary;
    }
    // Ordinal needs at least one label; a radio without choices stays Categorical.
    if !choices.is_empty()
        && choices
            .iter()
            .all(|(_, label)| label.chars().any(|c| c.is_ascii_digit()))
    {
        return QuestionType::Ordinal;
    }
    QuestionType::Categorical
}

fn is_yes_no(choices: &ChoiceSet) -> bool {
    let (Some(one), Some(zero)) = (choices.label(1), choices.label(0)) else {
        return false;
    };
    let one = one.trim().to_lowercase();
    let zero = zero.trim().to_lowercase();
    YES_NO_LABELS
        .iter()
        .any(|(yes, no)| one == *yes && zero == *no)
}

fn classify_text(field: &DictionaryField) -> QuestionType {
    if is_identifier_like(&field.name) {
        return QuestionType::Textual;
    }
    let hint = field
        .validation
        .as_deref()
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_default();
    if hint.starts_with("date") || hint.starts_with("time") {
        QuestionType::Date
    } else if hint.starts_with("number") || hint == "integer" {
        QuestionType::Numeric
    } else {
        QuestionType::Textual
    }
}

/// Whether a variable name holds an identifier such as an ID or phone number.
pub fn is_identifier_like(name: &str) -> bool {
    name_tokens(name)
        .iter()
        .any(|token| IDENTIFIER_TOKENS.contains(&token.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radio(choices: &str) -> DictionaryField {
        DictionaryField::new("q", "form", FieldKind::Radio, "Question").with_choices(choices)
    }

    fn text(name: &str, hint: &str) -> DictionaryField {
        DictionaryField::new(name, "form", FieldKind::Text, "Question").with_validation(hint)
    }

    #[test]
    fn radio_yes_no_is_binary() {
        assert_eq!(classify(&radio("1, Yes | 0, No")).question_type, QuestionType::Binary);
        assert_eq!(classify(&radio("0, no | 1, YES")).question_type, QuestionType::Binary);
    }

    #[test]
    fn radio_two_choices_are_categorical_binary() {
        let result = classify(&radio("0, Boy | 1, Girl"));
        assert_eq!(result.question_type, QuestionType::CategoricalBinary);
        assert_eq!(result.choice_set().map(ChoiceSet::len), Some(2));
        assert_eq!(
            classify(&radio("1, Mother | 2, Father")).question_type,
            QuestionType::CategoricalBinary
        );
    }

    #[test]
    fn radio_with_numbered_labels_is_ordinal() {
        let result = classify(&radio("0, 0 - never | 1, 1 | 2, 2 | 3, 3 - always"));
        assert_eq!(result.question_type, QuestionType::Ordinal);
        assert_eq!(result.validator, Validator::Choices(vec![0, 1, 2, 3]));
    }

    #[test]
    fn radio_otherwise_categorical() {
        let result = classify(&radio("1, Never | 2, Sometimes | 3, Often"));
        assert_eq!(result.question_type, QuestionType::Categorical);
    }

    #[test]
    fn radio_without_choices_is_categorical() {
        let bare = DictionaryField::new("q", "form", FieldKind::Radio, "Question");
        for field in [bare, radio(""), radio("x, unparseable")] {
            let result = classify(&field);
            assert_eq!(result.question_type, QuestionType::Categorical);
            assert_eq!(result.validator, Validator::Choices(Vec::new()));
        }
    }

    #[test]
    fn text_hints() {
        assert_eq!(classify(&text("visit_date", "date_dmy")).question_type, QuestionType::Date);
        assert_eq!(classify(&text("start", "datetime_ymd")).question_type, QuestionType::Date);
        assert_eq!(classify(&text("wake_up", "time")).question_type, QuestionType::Date);
        assert_eq!(classify(&text("weight", "number_1dp")).question_type, QuestionType::Numeric);
        assert_eq!(classify(&text("siblings", "integer")).question_type, QuestionType::Numeric);
        assert_eq!(classify(&text("comment", "")).question_type, QuestionType::Textual);
    }

    #[test]
    fn identifier_names_force_textual() {
        assert_eq!(classify(&text("child_id", "number")).question_type, QuestionType::Textual);
        assert_eq!(classify(&text("mother_tz", "integer")).question_type, QuestionType::Textual);
        assert_eq!(classify(&text("idea_count", "integer")).question_type, QuestionType::Numeric);
    }

    #[test]
    fn numeric_bounds_feed_the_validator() {
        let field = text("age", "number").with_bounds(Some("0".to_string()), Some("18".to_string()));
        let result = classify(&field);
        assert_eq!(result.validator, Validator::Numeric(Bounds::new(Some(0.0), Some(18.0))));
    }

    #[test]
    fn slider_keeps_description_and_default_range() {
        let field = DictionaryField::new("pain", "form", FieldKind::Slider, "Pain")
            .with_choices("None | Moderate | Worst");
        let result = classify(&field);
        assert_eq!(result.question_type, QuestionType::Slider);
        assert_eq!(
            result.choices,
            Some(Choices::SliderLabels("None | Moderate | Worst".to_string()))
        );
        assert_eq!(result.value_range, Some(ValueRange::new(0.0, 10.0)));
        assert!(result.validator.is_valid("10"));
        assert!(!result.validator.is_valid("11"));
    }

    #[test]
    fn simple_kinds() {
        let kind = |kind: FieldKind| classify(&DictionaryField::new("x", "f", kind, "X")).question_type;
        assert_eq!(kind(FieldKind::Calc), QuestionType::NoType);
        assert_eq!(kind(FieldKind::Dropdown), QuestionType::Categorical);
        assert_eq!(kind(FieldKind::Notes), QuestionType::Textual);
        assert_eq!(kind(FieldKind::YesNo), QuestionType::Binary);
        assert_eq!(kind(FieldKind::TrueFalse), QuestionType::Binary);
        assert_eq!(kind(FieldKind::Other("descriptive".to_string())), QuestionType::NoType);
    }

    #[test]
    fn checkbox_is_indicator_group() {
        let field = DictionaryField::new("X", "f", FieldKind::Checkbox, "Pick")
            .with_choices("1, a | 2, b");
        let result = classify(&field);
        assert!(result.is_indicator_group);
        assert_eq!(result.question_type, QuestionType::Binary);
        assert_eq!(result.choice_set().map(ChoiceSet::keys), Some(vec![1, 2]));
    }
}
