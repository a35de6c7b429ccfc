//! Variable name tokens.
//!
//! Variable names in the field dictionaries are snake_case with the
//! participant role encoded as the last segment (`erq_1_m`, `sdq_mother`).

/// Splits a variable name into lowercase tokens on `_` and punctuation.
///
/// ```
/// use qmeta_common::name_tokens;
///
/// assert_eq!(name_tokens("Child_ID-2"), vec!["child", "id", "2"]);
/// ```
pub fn name_tokens(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Replaces the trailing segment when it equals `from`.
///
/// Returns `None` when the name has no trailing segment or it differs.
///
/// ```
/// use qmeta_common::replace_trailing_segment;
///
/// assert_eq!(replace_trailing_segment("erq_1_m", "m", "f").as_deref(), Some("erq_1_f"));
/// assert_eq!(replace_trailing_segment("erq_1_m", "mother", "father"), None);
/// ```
pub fn replace_trailing_segment(name: &str, from: &str, to: &str) -> Option<String> {
    let (head, tail) = name.rsplit_once('_')?;
    if head.is_empty() || tail != from {
        return None;
    }
    Some(format!("{head}_{to}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn replace_only_touches_last_segment() {
        assert_eq!(
            replace_trailing_segment("m_scale_m", "m", "f").as_deref(),
            Some("m_scale_f")
        );
        assert_eq!(replace_trailing_segment("_m", "m", "f"), None);
    }

    proptest! {
        #[test]
        fn replace_then_revert_is_identity(head in "[a-z][a-z0-9_]{0,12}[a-z0-9]") {
            let name = format!("{head}_m");
            let renamed = replace_trailing_segment(&name, "m", "f").unwrap();
            prop_assert_eq!(replace_trailing_segment(&renamed, "f", "m").unwrap(), name);
        }
    }
}
