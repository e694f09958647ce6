//! Driven port for course persistence.
//!
//! The store executes a finished [`CourseListPlan`] rather than ad hoc
//! queries, so an in-memory adapter and the database adapter answer listing
//! requests identically.

use async_trait::async_trait;

use crate::domain::{Course, CourseId, CourseListPlan, CourseTitle, NewCourse, Price};

use super::define_port_error;

define_port_error! {
    /// Errors raised by course stores.
    pub enum CourseRepositoryError {
        /// Another course already uses the title.
        DuplicateTitle { title: String } =>
            "course title `{title}` already exists",
        /// Another course already uses the title and price pair.
        DuplicateCombination { title: String, price: String } =>
            "course `{title}` priced {price} already exists",
        /// The referenced category does not exist.
        UnknownCategory { category_id: i64 } =>
            "category {category_id} does not exist",
        /// The course to update does not exist.
        NotFound { id: i64 } =>
            "course {id} does not exist",
        /// Store connection could not be established.
        Connection { message: String } =>
            "course store connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } =>
            "course store query failed: {message}",
    }
}

/// Existing courses that clash with a candidate title and price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseConflicts {
    /// A stored course has exactly this title.
    pub title_taken: bool,
    /// A stored course has exactly this title and price.
    pub combination_taken: bool,
}

/// Port for reading and writing courses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Execute a listing plan. Ties in the requested ordering keep natural
    /// storage order (ascending id).
    async fn list(&self, plan: &CourseListPlan) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Fetch one course with its category resolved.
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, CourseRepositoryError>;

    /// Report stored courses clashing with `title`/`price`, ignoring
    /// `exclude`. When `price` is `None` only the title is compared.
    async fn find_conflicts(
        &self,
        title: &CourseTitle,
        price: Option<Price>,
        exclude: Option<CourseId>,
    ) -> Result<CourseConflicts, CourseRepositoryError>;

    /// Persist a validated course.
    async fn create(&self, course: &NewCourse) -> Result<Course, CourseRepositoryError>;

    /// Replace a course title, returning the updated course.
    async fn rename(
        &self,
        id: CourseId,
        title: &CourseTitle,
    ) -> Result<Course, CourseRepositoryError>;
}

/// Fixture implementation for tests that never touch courses.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCourseRepository;

#[async_trait]
impl CourseRepository for FixtureCourseRepository {
    async fn list(&self, _plan: &CourseListPlan) -> Result<Vec<Course>, CourseRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_id(&self, _id: CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        Ok(None)
    }

    async fn find_conflicts(
        &self,
        _title: &CourseTitle,
        _price: Option<Price>,
        _exclude: Option<CourseId>,
    ) -> Result<CourseConflicts, CourseRepositoryError> {
        Ok(CourseConflicts::default())
    }

    async fn create(&self, course: &NewCourse) -> Result<Course, CourseRepositoryError> {
        Err(CourseRepositoryError::unknown_category(
            course.category_id.get(),
        ))
    }

    async fn rename(
        &self,
        id: CourseId,
        _title: &CourseTitle,
    ) -> Result<Course, CourseRepositoryError> {
        Err(CourseRepositoryError::not_found(id.get()))
    }
}
