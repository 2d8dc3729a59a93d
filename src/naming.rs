//! Relation name templates for produced splits.
//!
//! Placeholders, matched left to right:
//! - `@` - original relation name
//! - `$T` - `train` or `test`
//! - `$N` - 1-based fold number
//!
//! There is no escape syntax: a template cannot contain a literal `@`, `$T` or `$N`.

use crate::constants::naming::{
    PLACEHOLDER_FOLD, PLACEHOLDER_KIND, PLACEHOLDER_RELATION, TEST_MARKER, TRAIN_MARKER,
};
use crate::types::{FoldNumber, RelationName};

/// Expand `template` for one side of a split.
pub fn relation_name(
    template: &str,
    original_name: &str,
    is_train: bool,
    fold_number: FoldNumber,
) -> RelationName {
    let mut name = String::with_capacity(template.len() + original_name.len());
    let mut rest = template;
    while let Some(ch) = rest.chars().next() {
        if let Some(tail) = rest.strip_prefix(PLACEHOLDER_RELATION) {
            name.push_str(original_name);
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix(PLACEHOLDER_KIND) {
            name.push_str(if is_train { TRAIN_MARKER } else { TEST_MARKER });
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix(PLACEHOLDER_FOLD) {
            name.push_str(&fold_number.to_string());
            rest = tail;
        } else {
            name.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::naming::DEFAULT_RELATION_TEMPLATE;

    #[test]
    fn default_template_expands_all_placeholders() {
        assert_eq!(
            relation_name(DEFAULT_RELATION_TEMPLATE, "iris", true, 3),
            "iris-train-3"
        );
        assert_eq!(relation_name("@-$T-$N", "iris", false, 10), "iris-test-10");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(relation_name("fold", "iris", true, 1), "fold");
        assert_eq!(relation_name("", "iris", true, 1), "");
        assert_eq!(relation_name("$X $ T", "iris", true, 1), "$X $ T");
        assert_eq!(relation_name("ü@ü", "iris", true, 1), "üirisü");
    }

    #[test]
    fn placeholders_repeat_and_adjoin() {
        assert_eq!(relation_name("@@", "a", true, 1), "aa");
        assert_eq!(relation_name("$N$N$T", "a", false, 7), "77test");
        assert_eq!(relation_name("$$T", "a", true, 2), "$train");
    }

    #[test]
    fn relation_name_is_not_rescanned() {
        // substituted text never re-enters placeholder matching
        assert_eq!(relation_name("@", "x$N@", true, 4), "x$N@");
    }
}
