//! Port for neutralising markup in user-supplied text.

/// Cleans free text before it is stored.
#[cfg_attr(test, mockall::automock)]
pub trait Sanitizer: Send + Sync {
    /// Return `raw` with any active markup neutralised.
    fn clean(&self, raw: &str) -> String;
}

/// Sanitizer that returns its input unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSanitizer;

impl Sanitizer for FixtureSanitizer {
    fn clean(&self, raw: &str) -> String {
        raw.to_owned()
    }
}
