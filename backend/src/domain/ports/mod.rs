//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod authenticator;
mod category_catalogue;
mod category_repository;
mod course_catalogue;
mod course_repository;
mod rate_limiter;
mod sanitizer;

#[cfg(test)]
pub use authenticator::MockAuthenticator;
pub use authenticator::{Authenticator, AuthenticatorError, FixtureAuthenticator};
#[cfg(test)]
pub use category_catalogue::{MockCategoryCommand, MockCategoryQuery};
pub use category_catalogue::{
    CategoryCommand, CategoryQuery, FixtureCategoryCommand, FixtureCategoryQuery,
};
#[cfg(test)]
pub use category_repository::MockCategoryRepository;
pub use category_repository::{
    CategoryRepository, CategoryRepositoryError, FixtureCategoryRepository,
};
#[cfg(test)]
pub use course_catalogue::{MockCourseCommand, MockCourseQuery};
pub use course_catalogue::{CourseCommand, CourseQuery, FixtureCourseCommand, FixtureCourseQuery};
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{
    CourseConflicts, CourseRepository, CourseRepositoryError, FixtureCourseRepository,
};
#[cfg(test)]
pub use rate_limiter::MockRateLimiter;
pub use rate_limiter::{FixtureRateLimiter, RateLimiter, RateLimiterError, ThrottleDecision};
#[cfg(test)]
pub use sanitizer::MockSanitizer;
pub use sanitizer::{FixtureSanitizer, Sanitizer};
