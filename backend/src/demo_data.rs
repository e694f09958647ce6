//! Startup seeding of demo categories.

use thiserror::Error;
use tracing::info;

use crate::domain::ports::{CategoryCommand, CategoryQuery};
use crate::domain::{CategoryDraft, Error};

/// Categories created when seeding is enabled and the store is empty.
pub const DEMO_CATEGORIES: [(&str, &str); 3] = [
    ("web", "Web development"),
    ("data", "Data science"),
    ("systems", "Systems programming"),
];

/// Errors returned while seeding demo data.
#[derive(Debug, Error)]
pub enum DemoSeedError {
    /// Listing the existing categories failed.
    #[error("failed to read existing categories: {0}")]
    Read(#[source] Error),
    /// Storing one demo category failed.
    #[error("failed to create category `{slug}`: {source}")]
    Create {
        /// Slug of the category being created.
        slug: &'static str,
        /// Underlying service error.
        #[source]
        source: Error,
    },
}

/// Create [`DEMO_CATEGORIES`] unless some category already exists.
///
/// Returns the number of categories created.
pub async fn seed_demo_categories(
    queries: &dyn CategoryQuery,
    commands: &dyn CategoryCommand,
) -> Result<usize, DemoSeedError> {
    let existing = queries
        .list_categories()
        .await
        .map_err(DemoSeedError::Read)?;
    if !existing.is_empty() {
        info!(existing = existing.len(), "demo seeding skipped; categories present");
        return Ok(0);
    }

    for (slug, title) in DEMO_CATEGORIES {
        commands
            .create_category(CategoryDraft {
                slug: slug.to_owned(),
                title: title.to_owned(),
            })
            .await
            .map_err(|source| DemoSeedError::Create { slug, source })?;
    }
    info!(created = DEMO_CATEGORIES.len(), "demo categories seeded");
    Ok(DEMO_CATEGORIES.len())
}
