//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only ever see domain ports
//! and the access gate, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::AccessGate;
use crate::domain::ports::{CategoryCommand, CategoryQuery, CourseCommand, CourseQuery};

/// Catalogue use-cases exposed to the handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Course listing and lookup.
    pub courses: Arc<dyn CourseQuery>,
    /// Course creation and renaming.
    pub course_commands: Arc<dyn CourseCommand>,
    /// Category listing.
    pub categories: Arc<dyn CategoryQuery>,
    /// Category creation and deletion.
    pub category_commands: Arc<dyn CategoryCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Course listing and lookup.
    pub courses: Arc<dyn CourseQuery>,
    /// Course creation and renaming.
    pub course_commands: Arc<dyn CourseCommand>,
    /// Category listing.
    pub categories: Arc<dyn CategoryQuery>,
    /// Category creation and deletion.
    pub category_commands: Arc<dyn CategoryCommand>,
    /// Authentication, permission and throttle checks.
    pub access: AccessGate,
}

impl HttpState {
    /// Combine catalogue ports with the access gate.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use course_catalogue::domain::{AccessGate, ThrottleRates};
    /// use course_catalogue::domain::ports::{
    ///     FixtureAuthenticator, FixtureCategoryCommand, FixtureCategoryQuery,
    ///     FixtureCourseCommand, FixtureCourseQuery, FixtureRateLimiter,
    /// };
    /// use course_catalogue::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let ports = HttpStatePorts {
    ///     courses: Arc::new(FixtureCourseQuery),
    ///     course_commands: Arc::new(FixtureCourseCommand),
    ///     categories: Arc::new(FixtureCategoryQuery),
    ///     category_commands: Arc::new(FixtureCategoryCommand),
    /// };
    /// let gate = AccessGate::new(
    ///     Arc::new(FixtureAuthenticator),
    ///     Arc::new(FixtureRateLimiter),
    ///     ThrottleRates::default(),
    /// );
    /// let state = HttpState::new(ports, gate);
    /// let _courses = state.courses.clone();
    /// ```
    pub fn new(ports: HttpStatePorts, access: AccessGate) -> Self {
        let HttpStatePorts {
            courses,
            course_commands,
            categories,
            category_commands,
        } = ports;
        Self {
            courses,
            course_commands,
            categories,
            category_commands,
            access,
        }
    }
}
