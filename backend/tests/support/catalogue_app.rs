//! In-process catalogue wiring shared by the HTTP integration suites.
//!
//! Mirrors the production composition: domain services over the in-memory
//! store, markup escaping, static accounts and governor throttling.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{App, test as actix_test, web};
use course_catalogue::Trace;
use course_catalogue::domain::{
    AccessGate, CategoryCatalogueService, CourseCatalogueService, ThrottleRates,
};
use course_catalogue::inbound::http::configure;
use course_catalogue::inbound::http::state::{HttpState, HttpStatePorts};
use course_catalogue::outbound::auth::StaticAccountAuthenticator;
use course_catalogue::outbound::markup::MarkupCleaner;
use course_catalogue::outbound::memory::InMemoryCatalogueStore;
use course_catalogue::outbound::throttle::GovernorRateLimiter;
use serde_json::{Value, json};

/// One instructor and one plain user.
pub const ACCOUNTS: &str = "admin:password:Instructors;student:password";

/// Catalogue state over a fresh in-memory store.
pub fn catalogue_state(rates: ThrottleRates) -> HttpState {
    let store = Arc::new(InMemoryCatalogueStore::new());
    let courses = Arc::new(CourseCatalogueService::new(
        store.clone(),
        store.clone(),
        Arc::new(MarkupCleaner::new()),
    ));
    let categories = Arc::new(CategoryCatalogueService::new(store));
    let access = AccessGate::new(
        Arc::new(StaticAccountAuthenticator::new(
            ACCOUNTS.parse().expect("account list"),
        )),
        Arc::new(GovernorRateLimiter::new()),
        rates,
    );
    HttpState::new(
        HttpStatePorts {
            courses: courses.clone(),
            course_commands: courses,
            categories: categories.clone(),
            category_commands: categories,
        },
        access,
    )
}

/// Application with the production middleware stack.
pub fn catalogue_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(NormalizePath::new(TrailingSlash::Trim))
        .wrap(Trace)
        .configure(configure)
}

/// Exchange credentials for a `Token <key>` header value.
pub async fn token_header<S>(app: &S, username: &str, password: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = actix_test::TestRequest::post()
        .uri("/api/api-token-auth/")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(app, request).await;
    let token = body
        .get("token")
        .and_then(Value::as_str)
        .expect("token issued");
    format!("Token {token}")
}

/// Create a category as the instructor and return its id.
pub async fn create_category<S>(app: &S, auth: &str, slug: &str) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = actix_test::TestRequest::post()
        .uri("/api/categories/")
        .insert_header(("Authorization", auth))
        .set_json(json!({ "slug": slug, "title": format!("{slug} courses") }))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(app, request).await;
    body.get("id").and_then(Value::as_i64).expect("category id")
}

/// Post a course and return the raw response.
pub async fn post_course<S>(app: &S, body: Value) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = actix_test::TestRequest::post()
        .uri("/api/courses/")
        .set_json(body)
        .to_request();
    actix_test::call_service(app, request).await
}
