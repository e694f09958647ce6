//! Driving ports for category use-cases.

use async_trait::async_trait;

use crate::domain::{Category, CategoryDraft, CategoryId, Error};

/// Read-side category use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryQuery: Send + Sync {
    /// Every category in ascending id order.
    async fn list_categories(&self) -> Result<Vec<Category>, Error>;
}

/// Write-side category use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryCommand: Send + Sync {
    /// Validate and persist a new category.
    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, Error>;

    /// Delete a category no course references; `conflict` otherwise.
    async fn delete_category(&self, id: CategoryId) -> Result<(), Error>;
}

/// Fixture serving no categories.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCategoryQuery;

#[async_trait]
impl CategoryQuery for FixtureCategoryQuery {
    async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        Ok(Vec::new())
    }
}

/// Fixture that refuses every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCategoryCommand;

#[async_trait]
impl CategoryCommand for FixtureCategoryCommand {
    async fn create_category(&self, _draft: CategoryDraft) -> Result<Category, Error> {
        Err(Error::service_unavailable("category writes are not configured"))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), Error> {
        Err(Error::not_found(format!("category {id} not found")))
    }
}
