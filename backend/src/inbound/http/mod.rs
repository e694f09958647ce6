//! HTTP inbound adapter exposing the catalogue REST endpoints.
//!
//! Routes are declared without trailing slashes; the server trims them from
//! incoming paths so `/api/courses/` and `/api/courses` hit the same handler.

pub mod access;
pub mod auth;
pub mod categories;
pub mod courses;
pub mod demo;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _request| {
        Error::invalid_request(format!("JSON parse error - {err}")).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _request| {
        Error::invalid_request(format!("invalid query string - {err}")).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err, _request| Error::not_found("Not found.").into())
}

/// Register the banner and every `/api` handler.
///
/// Handlers expect `web::Data<HttpState>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(demo::index)
        .service(
            web::scope("/api")
                .service(courses::list_courses)
                .service(courses::create_course)
                .service(courses::get_course)
                .service(courses::rename_course)
                .service(categories::list_categories)
                .service(categories::create_category)
                .service(categories::delete_category)
                .service(auth::obtain_auth_token)
                .service(demo::secret)
                .service(demo::teachers_view)
                .service(demo::throttle_check)
                .service(demo::throttle_check_auth),
        );
}
