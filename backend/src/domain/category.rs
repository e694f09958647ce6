//! Course category entity.
//!
//! Categories group courses for browsing. A category referenced by any course
//! cannot be deleted; the store enforces that as a protective delete.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::slug::{MAX_SLUG_LEN, is_valid_slug};

/// Longest category title accepted.
pub const MAX_CATEGORY_TITLE_LEN: usize = 120;

/// Store-generated category identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(i64);

impl CategoryId {
    /// Wrap a raw identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors returned by [`NewCategory::try_from`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryValidationError {
    /// Slug is empty, too long or has disallowed characters.
    #[error("slug must be 1-{max} lowercase ASCII letters, digits, or hyphens", max = MAX_SLUG_LEN)]
    InvalidSlug,
    /// Title is blank after trimming.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title exceeds the length limit.
    #[error("title must be at most {max} characters (got {length})")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Submitted length in characters.
        length: usize,
    },
}

impl CategoryValidationError {
    /// Name of the payload field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidSlug => "slug",
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
        }
    }
}

/// Raw category payload supplied by a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryDraft {
    /// Requested slug.
    pub slug: String,
    /// Requested title.
    pub title: String,
}

/// Validated category ready for persistence.
///
/// ## Invariants
/// - `slug` satisfies the slug rules.
/// - `title` is trimmed, non-empty and at most [`MAX_CATEGORY_TITLE_LEN`]
///   characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    slug: String,
    title: String,
}

impl NewCategory {
    /// Validated slug.
    pub fn slug(&self) -> &str {
        self.slug.as_str()
    }

    /// Trimmed title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }
}

impl TryFrom<CategoryDraft> for NewCategory {
    type Error = CategoryValidationError;

    fn try_from(draft: CategoryDraft) -> Result<Self, Self::Error> {
        let slug = draft.slug.trim().to_owned();
        if !is_valid_slug(&slug) {
            return Err(CategoryValidationError::InvalidSlug);
        }
        let title = draft.title.trim().to_owned();
        if title.is_empty() {
            return Err(CategoryValidationError::EmptyTitle);
        }
        let length = title.chars().count();
        if length > MAX_CATEGORY_TITLE_LEN {
            return Err(CategoryValidationError::TitleTooLong {
                max: MAX_CATEGORY_TITLE_LEN,
                length,
            });
        }
        Ok(Self { slug, title })
    }
}

/// Stored category.
///
/// Serialises as `{"id", "slug", "title"}`, the nested shape embedded in
/// course representations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    slug: String,
    title: String,
}

impl Category {
    /// Attach a store-generated identifier to a validated category.
    pub fn from_new(id: CategoryId, new: NewCategory) -> Self {
        Self {
            id,
            slug: new.slug,
            title: new.title,
        }
    }

    /// Rebuild a category from trusted stored columns.
    pub fn from_parts(id: CategoryId, slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            title: title.into(),
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> CategoryId {
        self.id
    }

    /// Unique slug.
    pub fn slug(&self) -> &str {
        self.slug.as_str()
    }

    /// Display title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }
}
