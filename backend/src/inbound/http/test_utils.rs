//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{App, Error as ActixError, web};

use crate::domain::ports::{
    CategoryCommand, CategoryQuery, CourseCommand, CourseQuery, FixtureAuthenticator,
    FixtureCategoryCommand, FixtureCategoryQuery, FixtureCourseCommand, FixtureCourseQuery,
    FixtureRateLimiter,
};
use crate::domain::{AccessGate, ThrottleRates};
use crate::inbound::http::configure;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Token accepted by [`FixtureAuthenticator`] for an instructor.
pub const INSTRUCTOR_TOKEN: &str = "Token fixture-token";

/// State wired to fixtures, with slots for the ports under test.
pub struct StateBuilder {
    ports: HttpStatePorts,
    access: AccessGate,
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self {
            ports: HttpStatePorts {
                courses: Arc::new(FixtureCourseQuery),
                course_commands: Arc::new(FixtureCourseCommand),
                categories: Arc::new(FixtureCategoryQuery),
                category_commands: Arc::new(FixtureCategoryCommand),
            },
            access: AccessGate::new(
                Arc::new(FixtureAuthenticator),
                Arc::new(FixtureRateLimiter),
                ThrottleRates::default(),
            ),
        }
    }
}

impl StateBuilder {
    /// Replace the course query port.
    pub fn courses(mut self, port: impl CourseQuery + 'static) -> Self {
        self.ports.courses = Arc::new(port);
        self
    }

    /// Replace the course command port.
    pub fn course_commands(mut self, port: impl CourseCommand + 'static) -> Self {
        self.ports.course_commands = Arc::new(port);
        self
    }

    /// Replace the category query port.
    pub fn categories(mut self, port: impl CategoryQuery + 'static) -> Self {
        self.ports.categories = Arc::new(port);
        self
    }

    /// Replace the category command port.
    pub fn category_commands(mut self, port: impl CategoryCommand + 'static) -> Self {
        self.ports.category_commands = Arc::new(port);
        self
    }

    /// Replace the access gate.
    pub fn access(mut self, access: AccessGate) -> Self {
        self.access = access;
        self
    }

    /// Finish the state.
    pub fn build(self) -> HttpState {
        HttpState::new(self.ports, self.access)
    }
}

/// App with every catalogue route, mirroring the server's path handling.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = ActixError,
        InitError = (),
    >,
> {
    App::new()
        .wrap(NormalizePath::new(TrailingSlash::Trim))
        .app_data(web::Data::new(state))
        .configure(configure)
}
