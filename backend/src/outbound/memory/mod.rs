//! In-process catalogue store.
//!
//! Backs the course and category ports when no database is configured and in
//! tests. Constraint enforcement mirrors the database schema: unique course
//! titles, unique `(title, price)` pairs, unique category slugs, an existing
//! category per course and protective category deletes.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    CategoryRepository, CategoryRepositoryError, CourseConflicts, CourseRepository,
    CourseRepositoryError,
};
use crate::domain::{
    Category, CategoryId, Course, CourseId, CourseListPlan, CourseTitle, NewCategory, NewCourse,
    Price,
};

#[derive(Debug, Clone)]
struct CourseRow {
    title: CourseTitle,
    instructor: String,
    price: Price,
    category_id: CategoryId,
}

#[derive(Debug, Default)]
struct CatalogueState {
    categories: BTreeMap<CategoryId, Category>,
    courses: BTreeMap<CourseId, CourseRow>,
    last_category_id: i64,
    last_course_id: i64,
}

impl CatalogueState {
    fn resolve(&self, id: CourseId, row: &CourseRow) -> Option<Course> {
        let category = self.categories.get(&row.category_id)?;
        Some(Course::from_parts(
            id,
            row.title.clone(),
            row.instructor.clone(),
            row.price,
            category.clone(),
        ))
    }

    fn conflicts(
        &self,
        title: &CourseTitle,
        price: Option<Price>,
        exclude: Option<CourseId>,
    ) -> CourseConflicts {
        self.courses
            .iter()
            .filter(|(id, _)| Some(**id) != exclude)
            .filter(|(_, row)| row.title == *title)
            .fold(CourseConflicts::default(), |mut found, (_, row)| {
                found.title_taken = true;
                if price == Some(row.price) {
                    found.combination_taken = true;
                }
                found
            })
    }
}

/// Thread-safe in-memory store implementing both catalogue repositories.
#[derive(Debug, Default)]
pub struct InMemoryCatalogueStore {
    state: Mutex<CatalogueState>,
}

impl InMemoryCatalogueStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for_courses(&self) -> Result<MutexGuard<'_, CatalogueState>, CourseRepositoryError> {
        self.state
            .lock()
            .map_err(|_| CourseRepositoryError::query("catalogue state lock poisoned"))
    }

    fn lock_for_categories(
        &self,
    ) -> Result<MutexGuard<'_, CatalogueState>, CategoryRepositoryError> {
        self.state
            .lock()
            .map_err(|_| CategoryRepositoryError::query("catalogue state lock poisoned"))
    }
}

#[async_trait]
impl CourseRepository for InMemoryCatalogueStore {
    async fn list(&self, plan: &CourseListPlan) -> Result<Vec<Course>, CourseRepositoryError> {
        let state = self.lock_for_courses()?;
        let natural: Vec<Course> = state
            .courses
            .iter()
            .filter_map(|(id, row)| state.resolve(*id, row))
            .collect();
        Ok(plan.apply(natural))
    }

    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        let state = self.lock_for_courses()?;
        Ok(state
            .courses
            .get(&id)
            .and_then(|row| state.resolve(id, row)))
    }

    async fn find_conflicts(
        &self,
        title: &CourseTitle,
        price: Option<Price>,
        exclude: Option<CourseId>,
    ) -> Result<CourseConflicts, CourseRepositoryError> {
        let state = self.lock_for_courses()?;
        Ok(state.conflicts(title, price, exclude))
    }

    async fn create(&self, course: &NewCourse) -> Result<Course, CourseRepositoryError> {
        let mut state = self.lock_for_courses()?;
        let Some(category) = state.categories.get(&course.category_id).cloned() else {
            return Err(CourseRepositoryError::unknown_category(
                course.category_id.get(),
            ));
        };
        let conflicts = state.conflicts(&course.title, Some(course.price), None);
        if conflicts.combination_taken {
            return Err(CourseRepositoryError::duplicate_combination(
                course.title.as_str(),
                course.price.to_string(),
            ));
        }
        if conflicts.title_taken {
            return Err(CourseRepositoryError::duplicate_title(course.title.as_str()));
        }

        state.last_course_id = state.last_course_id.saturating_add(1);
        let id = CourseId::new(state.last_course_id);
        state.courses.insert(
            id,
            CourseRow {
                title: course.title.clone(),
                instructor: course.instructor.clone(),
                price: course.price,
                category_id: course.category_id,
            },
        );
        Ok(Course::from_new(id, course.clone(), category))
    }

    async fn rename(
        &self,
        id: CourseId,
        title: &CourseTitle,
    ) -> Result<Course, CourseRepositoryError> {
        let mut state = self.lock_for_courses()?;
        if !state.courses.contains_key(&id) {
            return Err(CourseRepositoryError::not_found(id.get()));
        }
        if state.conflicts(title, None, Some(id)).title_taken {
            return Err(CourseRepositoryError::duplicate_title(title.as_str()));
        }
        let row = state
            .courses
            .get_mut(&id)
            .ok_or_else(|| CourseRepositoryError::not_found(id.get()))?;
        row.title = title.clone();
        let row = row.clone();
        state
            .resolve(id, &row)
            .ok_or_else(|| CourseRepositoryError::query(format!("course {id} lost its category")))
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCatalogueStore {
    async fn list(&self) -> Result<Vec<Category>, CategoryRepositoryError> {
        let state = self.lock_for_categories()?;
        Ok(state.categories.values().cloned().collect())
    }

    async fn find_by_id(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, CategoryRepositoryError> {
        let state = self.lock_for_categories()?;
        Ok(state.categories.get(&id).cloned())
    }

    async fn create(&self, category: &NewCategory) -> Result<Category, CategoryRepositoryError> {
        let mut state = self.lock_for_categories()?;
        if state
            .categories
            .values()
            .any(|existing| existing.slug() == category.slug())
        {
            return Err(CategoryRepositoryError::duplicate_slug(category.slug()));
        }
        state.last_category_id = state.last_category_id.saturating_add(1);
        let id = CategoryId::new(state.last_category_id);
        let stored = Category::from_new(id, category.clone());
        state.categories.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, CategoryRepositoryError> {
        let mut state = self.lock_for_categories()?;
        if state.courses.values().any(|row| row.category_id == id) {
            return Err(CategoryRepositoryError::protected(id.get()));
        }
        Ok(state.categories.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests;
