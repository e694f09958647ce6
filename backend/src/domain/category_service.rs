//! Category domain service.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{
    CategoryCommand, CategoryQuery, CategoryRepository, CategoryRepositoryError,
};
use crate::domain::{
    Category, CategoryDraft, CategoryId, Error, NewCategory, REJECTED_WRITE_MESSAGE,
};

/// Category service implementing [`CategoryQuery`] and [`CategoryCommand`].
#[derive(Clone)]
pub struct CategoryCatalogueService<K> {
    categories: Arc<K>,
}

impl<K> CategoryCatalogueService<K> {
    /// Service over the `categories` store.
    pub fn new(categories: Arc<K>) -> Self {
        Self { categories }
    }
}

fn rejected(field: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(REJECTED_WRITE_MESSAGE)
        .with_field_errors(BTreeMap::from([(field.to_owned(), vec![message.into()])]))
}

fn map_category_error(error: CategoryRepositoryError) -> Error {
    debug!(kind = error.kind(), %error, "category store rejected operation");
    match error {
        CategoryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("category store unavailable: {message}"))
        }
        CategoryRepositoryError::Protected { id } => Error::conflict(format!(
            "category {id} is referenced by existing courses"
        ))
        .with_details(json!({ "categoryId": id, "code": "protected_category" })),
        CategoryRepositoryError::DuplicateSlug { .. } => {
            rejected("slug", "category with this slug already exists.")
        }
        CategoryRepositoryError::Query { message } => {
            Error::internal(format!("category store error: {message}"))
        }
    }
}

#[async_trait]
impl<K> CategoryQuery for CategoryCatalogueService<K>
where
    K: CategoryRepository,
{
    async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        self.categories.list().await.map_err(map_category_error)
    }
}

#[async_trait]
impl<K> CategoryCommand for CategoryCatalogueService<K>
where
    K: CategoryRepository,
{
    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, Error> {
        let category =
            NewCategory::try_from(draft).map_err(|err| rejected(err.field(), err.to_string()))?;
        self.categories
            .create(&category)
            .await
            .map_err(map_category_error)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), Error> {
        let deleted = self
            .categories
            .delete(id)
            .await
            .map_err(map_category_error)?;
        if deleted {
            Ok(())
        } else {
            Err(Error::not_found(format!("category {id} not found")))
        }
    }
}
