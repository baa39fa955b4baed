//! Input checks run by the API layer before anything is written.
//!
//! The stores never validate; everything they persist went through here.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{FilterCriteria, IntentKind, SuggestionKind};

pub const MAX_FREET_LENGTH: usize = 140;

static TAG_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid tag regex"));

// Optional scheme, a dotted domain or IPv4 host, then optional port, path,
// query and fragment. ASCII only, case folding included.
static LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i-u)^(https?://)?",
        r"((([a-z0-9]([a-z0-9-]*[a-z0-9])*)\.)+[a-z]{2,}|",
        r"(([0-9]{1,3}\.){3}[0-9]{1,3}))",
        r"(:[0-9]+)?(/[-a-z0-9%_.~+]*)*",
        r"(\?[;&a-z0-9%_.~+=-]*)?",
        r"(#[-a-z0-9_]*)?$",
    ))
    .expect("valid link regex")
});

pub fn tag_label(label: &str) -> Result<()> {
    if TAG_LABEL.is_match(label) {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "tag {label:?} must be non-empty and contain only letters, digits or underscores"
        )))
    }
}

pub fn intent_kind(raw: &str) -> Result<IntentKind> {
    raw.parse()
        .map_err(|_| AppError::ValidationError(format!("{raw} is not a valid intent")))
}

pub fn suggestion_kind(raw: &str) -> Result<SuggestionKind> {
    raw.parse()
        .map_err(|_| AppError::ValidationError(format!("{raw} is not a valid suggestion type")))
}

pub fn link(raw: &str) -> Result<()> {
    if LINK.is_match(raw) {
        Ok(())
    } else {
        Err(AppError::ValidationError("Supplement must be a valid link.".to_string()))
    }
}

/// An `Inform` intent must cite a source; any supplement must be a link.
pub fn intent_supplement(kind: IntentKind, supplement: Option<&str>) -> Result<()> {
    match supplement.filter(|s| !s.is_empty()) {
        Some(s) => link(s),
        None if kind == IntentKind::Inform => Err(AppError::ValidationError(
            "Informing freets must be accompanied by a source link supplement.".to_string(),
        )),
        None => Ok(()),
    }
}

/// Checks a suggested value against the rule of its kind.
pub fn suggestion_value(kind: SuggestionKind, value: &str) -> Result<()> {
    match kind {
        SuggestionKind::Tag => tag_label(value),
        SuggestionKind::Intent => intent_kind(value).map(|_| ()),
        SuggestionKind::Supplement => link(value),
    }
}

pub fn freet_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(AppError::ValidationError("Freet content must be at least one character long.".to_string()));
    }
    if content.chars().count() > MAX_FREET_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Freet content must be no more than {MAX_FREET_LENGTH} characters."
        )));
    }
    Ok(())
}

pub fn filter_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        Err(AppError::ValidationError("Filter name must not be empty.".to_string()))
    } else {
        Ok(())
    }
}

/// Shape checks for a filter's criteria. Intent kinds are already typed;
/// author existence needs storage and is checked by the caller.
pub fn filter_criteria(criteria: &FilterCriteria) -> Result<()> {
    criteria.tags.iter().try_for_each(|label| tag_label(label))
}

/// Authors are known if they wrote something, or are the requester.
pub fn known_author(author: Uuid, requester: Uuid, freets_written: usize) -> Result<()> {
    if author == requester || freets_written > 0 {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!("author {author} does not exist")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_labels_are_word_characters_only() {
        assert!(tag_label("funny").is_ok());
        assert!(tag_label("rust_lang2024").is_ok());
        assert!(tag_label("").is_err());
        assert!(tag_label("two words").is_err());
        assert!(tag_label("#hash").is_err());
        assert!(tag_label("café").is_err());
        assert!(tag_label("日本").is_err());
        assert!(tag_label("٣").is_err());
    }

    #[test]
    fn intent_kinds_are_case_sensitive() {
        assert_eq!(intent_kind("Joke").unwrap(), IntentKind::Joke);
        assert!(intent_kind("joke").is_err());
        assert!(intent_kind("Rant").is_err());
    }

    #[test]
    fn links_follow_the_permissive_shape() {
        for ok in [
            "example.com",
            "https://news.example.org/a/b?x=1&y=2#top",
            "http://127.0.0.1:8080/path",
            "HTTP://Example.COM",
        ] {
            assert!(link(ok).is_ok(), "{ok} should be accepted");
        }
        for bad in [
            "",
            "not a link",
            "ftp://example.com",
            "example",
            "https://x.c",
            "http://１２７.０.０.１/",
            "café.example.com",
            // Kelvin sign, which folds to `k` under Unicode rules.
            "\u{212A}ite.com",
        ] {
            assert!(link(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn inform_requires_a_supplement() {
        assert!(intent_supplement(IntentKind::Inform, None).is_err());
        assert!(intent_supplement(IntentKind::Inform, Some("")).is_err());
        assert!(intent_supplement(IntentKind::Inform, Some("example.com/source")).is_ok());
        assert!(intent_supplement(IntentKind::Joke, None).is_ok());
        assert!(intent_supplement(IntentKind::Share, Some("nope nope")).is_err());
    }

    #[test]
    fn suggestions_are_checked_by_kind() {
        assert!(suggestion_value(SuggestionKind::Tag, "cats").is_ok());
        assert!(suggestion_value(SuggestionKind::Tag, "cats!").is_err());
        assert!(suggestion_value(SuggestionKind::Intent, "Share").is_ok());
        assert!(suggestion_value(SuggestionKind::Intent, "Tag").is_err());
        assert!(suggestion_value(SuggestionKind::Supplement, "example.com").is_ok());
    }

    #[test]
    fn freet_content_bounds() {
        assert!(freet_content("hello").is_ok());
        assert!(freet_content("   ").is_err());
        assert!(freet_content(&"a".repeat(MAX_FREET_LENGTH)).is_ok());
        assert!(freet_content(&"a".repeat(MAX_FREET_LENGTH + 1)).is_err());
    }

    #[test]
    fn criteria_reject_malformed_labels() {
        let good = FilterCriteria { tags: vec!["ok".into()], ..Default::default() };
        let bad = FilterCriteria { tags: vec!["ok".into(), "not ok".into()], ..Default::default() };
        assert!(filter_criteria(&good).is_ok());
        assert!(filter_criteria(&bad).is_err());
    }

    #[test]
    fn authors_must_have_written_or_be_the_requester() {
        let me = Uuid::now_v7();
        let other = Uuid::now_v7();
        assert!(known_author(me, me, 0).is_ok());
        assert!(known_author(other, me, 3).is_ok());
        assert!(known_author(other, me, 0).is_err());
    }
}
