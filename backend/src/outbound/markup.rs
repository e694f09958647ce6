//! Whitelist HTML sanitizer backed by `ammonia`.
//!
//! Inline formatting tags survive; every other tag is removed. The bodies of
//! `script` and `style` elements are dropped with them, other disallowed tags
//! keep their text. Text is re-serialised so stray `&`, `<` and `>` come out
//! as entities while quotes are left alone.

use std::collections::{HashMap, HashSet};
use std::fmt;

use ammonia::Builder;

use crate::domain::ports::Sanitizer;

const ALLOWED_TAGS: [&str; 12] = [
    "a",
    "abbr",
    "acronym",
    "b",
    "blockquote",
    "code",
    "em",
    "i",
    "li",
    "ol",
    "strong",
    "ul",
];

const ALLOWED_URL_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Sanitizer keeping a small set of inline tags.
pub struct MarkupCleaner {
    policy: Builder<'static>,
}

impl MarkupCleaner {
    /// Cleaner with the default inline tag whitelist.
    pub fn new() -> Self {
        let tag_attributes = HashMap::from([
            ("a", HashSet::from(["href", "title"])),
            ("abbr", HashSet::from(["title"])),
            ("acronym", HashSet::from(["title"])),
        ]);
        let mut policy = Builder::default();
        policy
            .tags(HashSet::from(ALLOWED_TAGS))
            .tag_attributes(tag_attributes)
            .generic_attributes(HashSet::new())
            .url_schemes(HashSet::from(ALLOWED_URL_SCHEMES))
            .link_rel(None);
        Self { policy }
    }
}

impl fmt::Debug for MarkupCleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupCleaner").finish_non_exhaustive()
    }
}

impl Default for MarkupCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer for MarkupCleaner {
    fn clean(&self, raw: &str) -> String {
        self.policy.clean(raw).to_string()
    }
}
