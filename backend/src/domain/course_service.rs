//! Course catalogue domain service.
//!
//! Implements the course driving ports over the course and category stores.
//! Store-level constraint violations raised while writing (a concurrent
//! writer won the race) surface as the same field errors the up-front checks
//! produce.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    CategoryRepository, CategoryRepositoryError, CourseCommand, CourseQuery, CourseRepository,
    CourseRepositoryError, Sanitizer,
};
use crate::domain::{
    Course, CourseDraft, CourseId, CourseListParams, CourseListPlan, CourseValidator, Error,
    FieldInput, FieldViolation, ValidationFailure,
};

/// Course service implementing [`CourseQuery`] and [`CourseCommand`].
#[derive(Clone)]
pub struct CourseCatalogueService<C, K, S> {
    courses: Arc<C>,
    categories: Arc<K>,
    sanitizer: Arc<S>,
}

impl<C, K, S> CourseCatalogueService<C, K, S> {
    /// Service over the course and category stores.
    pub fn new(courses: Arc<C>, categories: Arc<K>, sanitizer: Arc<S>) -> Self {
        Self {
            courses,
            categories,
            sanitizer,
        }
    }
}

impl<C, K, S> CourseCatalogueService<C, K, S>
where
    C: CourseRepository,
    K: CategoryRepository,
    S: Sanitizer,
{
    fn map_course_error(error: CourseRepositoryError) -> Error {
        debug!(kind = error.kind(), %error, "course store rejected operation");
        match error {
            CourseRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("course store unavailable: {message}"))
            }
            CourseRepositoryError::NotFound { id } => Error::not_found(format!("course {id} not found")),
            CourseRepositoryError::DuplicateTitle { .. } => {
                ValidationFailure::new(vec![FieldViolation::duplicate_title()]).into()
            }
            CourseRepositoryError::DuplicateCombination { .. } => ValidationFailure::new(vec![
                FieldViolation::duplicate_title(),
                FieldViolation::duplicate_combination(),
            ])
            .into(),
            CourseRepositoryError::UnknownCategory { category_id } => {
                ValidationFailure::new(vec![FieldViolation::unknown_category(category_id)]).into()
            }
            CourseRepositoryError::Query { message } => {
                Error::internal(format!("course store error: {message}"))
            }
        }
    }

    fn map_category_error(error: CategoryRepositoryError) -> Error {
        debug!(kind = error.kind(), %error, "category store rejected operation");
        match error {
            CategoryRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("category store unavailable: {message}"))
            }
            other => Error::internal(format!("category store error: {other}")),
        }
    }

    fn validator(&self) -> CourseValidator<'_> {
        CourseValidator::new(&*self.sanitizer)
    }
}

#[async_trait]
impl<C, K, S> CourseQuery for CourseCatalogueService<C, K, S>
where
    C: CourseRepository,
    K: CategoryRepository,
    S: Sanitizer,
{
    async fn list_courses(&self, params: &CourseListParams) -> Result<Vec<Course>, Error> {
        let plan = CourseListPlan::parse(params)?;
        if !plan.window().is_addressable() {
            return Ok(Vec::new());
        }
        self.courses
            .list(&plan)
            .await
            .map_err(Self::map_course_error)
    }

    async fn get_course(&self, id: CourseId) -> Result<Course, Error> {
        self.courses
            .find_by_id(id)
            .await
            .map_err(Self::map_course_error)?
            .ok_or_else(|| Error::not_found(format!("course {id} not found")))
    }
}

#[async_trait]
impl<C, K, S> CourseCommand for CourseCatalogueService<C, K, S>
where
    C: CourseRepository,
    K: CategoryRepository,
    S: Sanitizer,
{
    async fn create_course(&self, draft: CourseDraft) -> Result<Course, Error> {
        let (checked, mut violations) = self.validator().check_local(&draft);

        if let Some(category_id) = checked.category_id {
            let category = self
                .categories
                .find_by_id(category_id)
                .await
                .map_err(Self::map_category_error)?;
            if category.is_none() {
                violations.push(FieldViolation::unknown_category(category_id.get()));
            }
        }

        if let Some(title) = checked.title.as_ref() {
            let conflicts = self
                .courses
                .find_conflicts(title, checked.price, None)
                .await
                .map_err(Self::map_course_error)?;
            if conflicts.title_taken {
                violations.push(FieldViolation::duplicate_title());
            }
            if conflicts.combination_taken {
                violations.push(FieldViolation::duplicate_combination());
            }
        }

        if !violations.is_empty() {
            return Err(ValidationFailure::new(violations).into());
        }
        let course = checked
            .complete()
            .ok_or_else(|| Error::internal("validated course is missing fields"))?;
        self.courses
            .create(&course)
            .await
            .map_err(Self::map_course_error)
    }

    async fn rename_course(
        &self,
        id: CourseId,
        title: FieldInput<String>,
    ) -> Result<Course, Error> {
        self.get_course(id).await?;

        let title = self
            .validator()
            .validate_title(&title)
            .map_err(|violation| Error::from(ValidationFailure::new(vec![violation])))?;
        let conflicts = self
            .courses
            .find_conflicts(&title, None, Some(id))
            .await
            .map_err(Self::map_course_error)?;
        if conflicts.title_taken {
            return Err(ValidationFailure::new(vec![FieldViolation::duplicate_title()]).into());
        }

        self.courses
            .rename(id, &title)
            .await
            .map_err(Self::map_course_error)
    }
}
