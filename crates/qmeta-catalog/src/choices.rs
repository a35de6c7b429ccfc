//! Choice string parsing.

use qmeta_model::ChoiceSet;
use tracing::warn;

/// Parse a `key, label | key, label` choice string.
///
/// Entries without a comma or with a non-integer key are skipped.
///
/// ```
/// use qmeta_catalog::parse_choices;
///
/// let set = parse_choices("0, Never | 1, Sometimes, but rarely | x, broken");
/// assert_eq!(set.keys(), vec![0, 1]);
/// assert_eq!(set.label(1), Some("Sometimes, but rarely"));
/// ```
pub fn parse_choices(raw: &str) -> ChoiceSet {
    let mut pairs = Vec::new();
    for choice in raw.split('|') {
        let choice = choice.trim();
        if choice.is_empty() {
            continue;
        }
        let Some((key, label)) = choice.split_once(',') else {
            warn!(choice, "choice without a label skipped");
            continue;
        };
        match key.trim().parse::<i64>() {
            Ok(key) => pairs.push((key, label.trim().to_string())),
            Err(_) => warn!(choice, "choice with a non-integer key skipped"),
        }
    }
    ChoiceSet::new(pairs)
}
