//! Slug validation for category identifiers used in URLs.
//!
//! Slugs are trimmed, non-empty, at most [`MAX_SLUG_LEN`] characters and
//! composed of lowercase ASCII letters, digits, and hyphens.

/// Longest slug accepted for a category.
pub const MAX_SLUG_LEN: usize = 50;

/// Return `true` when `value` is a valid category slug.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    is_trimmed_non_empty(value) && value.len() <= MAX_SLUG_LEN && has_allowed_slug_chars(value)
}

fn is_trimmed_non_empty(value: &str) -> bool {
    !value.is_empty() && value.trim() == value
}

fn has_allowed_slug_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}
