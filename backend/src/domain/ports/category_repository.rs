//! Driven port for category persistence.

use async_trait::async_trait;

use crate::domain::{Category, CategoryId, NewCategory};

use super::define_port_error;

define_port_error! {
    /// Errors raised by category stores.
    pub enum CategoryRepositoryError {
        /// Courses still reference the category.
        Protected { id: i64 } =>
            "category {id} is referenced by existing courses",
        /// Another category already uses the slug.
        DuplicateSlug { slug: String } =>
            "category slug `{slug}` already exists",
        /// Store connection could not be established.
        Connection { message: String } =>
            "category store connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } =>
            "category store query failed: {message}",
    }
}

/// Port for reading and writing categories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories in ascending id order.
    async fn list(&self) -> Result<Vec<Category>, CategoryRepositoryError>;

    /// Category with `id`, if any.
    async fn find_by_id(&self, id: CategoryId)
    -> Result<Option<Category>, CategoryRepositoryError>;

    /// Store a category; duplicate slugs are rejected.
    async fn create(&self, category: &NewCategory) -> Result<Category, CategoryRepositoryError>;

    /// Delete an unreferenced category. Returns `false` when no such
    /// category exists and [`CategoryRepositoryError::Protected`] while any
    /// course references it.
    async fn delete(&self, id: CategoryId) -> Result<bool, CategoryRepositoryError>;
}

/// Fixture implementation for tests that never touch categories.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCategoryRepository;

#[async_trait]
impl CategoryRepository for FixtureCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, CategoryRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_id(
        &self,
        _id: CategoryId,
    ) -> Result<Option<Category>, CategoryRepositoryError> {
        Ok(None)
    }

    async fn create(&self, category: &NewCategory) -> Result<Category, CategoryRepositoryError> {
        Ok(Category::from_new(CategoryId::new(1), category.clone()))
    }

    async fn delete(&self, _id: CategoryId) -> Result<bool, CategoryRepositoryError> {
        Ok(false)
    }
}
