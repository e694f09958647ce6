//! PostgreSQL-backed category repository.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CategoryRepository, CategoryRepositoryError};
use crate::domain::{Category, CategoryId, NewCategory};

use super::diesel_helpers::{DieselFailure, classify_diesel_error};
use super::models::{CategoryRow, NewCategoryRow};
use super::pool::{DbPool, PoolError};
use super::schema::categories;

/// Diesel-backed implementation of [`CategoryRepository`].
#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: DbPool,
}

impl DieselCategoryRepository {
    /// Repository drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CategoryRepositoryError {
    CategoryRepositoryError::connection(error.into_message())
}

fn map_diesel_error(
    error: diesel::result::Error,
    operation: &str,
    on_constraint: impl FnOnce(DieselFailure) -> CategoryRepositoryError,
) -> CategoryRepositoryError {
    match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => CategoryRepositoryError::connection(message),
        DieselFailure::Query(message) => CategoryRepositoryError::query(message),
        constraint => on_constraint(constraint),
    }
}

fn unexpected(failure: DieselFailure) -> CategoryRepositoryError {
    CategoryRepositoryError::query(format!("unexpected constraint failure: {failure:?}"))
}

#[async_trait]
impl CategoryRepository for DieselCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CategoryRow> = categories::table
            .select(CategoryRow::as_select())
            .order_by(categories::id.asc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list categories", unexpected))?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find_by_id(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CategoryRow> = categories::table
            .filter(categories::id.eq(id.get()))
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find category", unexpected))?;
        Ok(row.map(Category::from))
    }

    async fn create(&self, category: &NewCategory) -> Result<Category, CategoryRepositoryError> {
        let row = NewCategoryRow {
            slug: category.slug(),
            title: category.title(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored: CategoryRow = diesel::insert_into(categories::table)
            .values(&row)
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(err, "insert category", |failure| match failure {
                    DieselFailure::Unique { .. } => {
                        CategoryRepositoryError::duplicate_slug(category.slug())
                    }
                    other => unexpected(other),
                })
            })?;
        Ok(stored.into())
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(categories::table.filter(categories::id.eq(id.get())))
            .execute(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(err, "delete category", |failure| match failure {
                    DieselFailure::ForeignKey => CategoryRepositoryError::protected(id.get()),
                    other => unexpected(other),
                })
            })?;
        Ok(removed > 0)
    }
}
