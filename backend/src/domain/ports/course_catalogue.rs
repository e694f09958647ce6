//! Driving ports for course use-cases.
//!
//! HTTP handlers call these traits without knowing which store sits behind
//! them, so handler tests can substitute mocks or fixtures.

use async_trait::async_trait;

use crate::domain::{Course, CourseDraft, CourseId, CourseListParams, Error, FieldInput};

/// Read-side course use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseQuery: Send + Sync {
    /// Interpret listing parameters and return one page of courses.
    async fn list_courses(&self, params: &CourseListParams) -> Result<Vec<Course>, Error>;

    /// Fetch one course or fail with `not_found`.
    async fn get_course(&self, id: CourseId) -> Result<Course, Error>;
}

/// Write-side course use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseCommand: Send + Sync {
    /// Validate and persist a new course.
    async fn create_course(&self, draft: CourseDraft) -> Result<Course, Error>;

    /// Replace the title of an existing course.
    async fn rename_course(&self, id: CourseId, title: FieldInput<String>)
    -> Result<Course, Error>;
}

/// Fixture serving an empty catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCourseQuery;

#[async_trait]
impl CourseQuery for FixtureCourseQuery {
    async fn list_courses(&self, _params: &CourseListParams) -> Result<Vec<Course>, Error> {
        Ok(Vec::new())
    }

    async fn get_course(&self, id: CourseId) -> Result<Course, Error> {
        Err(Error::not_found(format!("course {id} not found")))
    }
}

/// Fixture that refuses every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCourseCommand;

#[async_trait]
impl CourseCommand for FixtureCourseCommand {
    async fn create_course(&self, _draft: CourseDraft) -> Result<Course, Error> {
        Err(Error::service_unavailable("course writes are not configured"))
    }

    async fn rename_course(
        &self,
        id: CourseId,
        _title: FieldInput<String>,
    ) -> Result<Course, Error> {
        Err(Error::not_found(format!("course {id} not found")))
    }
}
