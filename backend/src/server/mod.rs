//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{App, HttpServer, web};
use tracing::info;

use course_catalogue::Trace;
use course_catalogue::demo_data::seed_demo_categories;
#[cfg(debug_assertions)]
use course_catalogue::doc::ApiDoc;
use course_catalogue::inbound::http::configure;
use course_catalogue::inbound::http::health::{HealthState, live, ready};
use course_catalogue::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(NormalizePath::new(TrailingSlash::Trim))
        .wrap(Trace)
        .configure(configure)
        .service(ready)
        .service(live);

    // Trailing slashes are trimmed, so the UI entry point is /docs/index.html.
    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    app
}

/// Construct the Actix HTTP server, seeding demo data first when enabled.
///
/// # Errors
/// Propagates [`std::io::Error`] when seeding fails or the socket cannot be
/// bound.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config));

    if config.seed_demo_data {
        seed_demo_categories(
            http_state.categories.as_ref(),
            http_state.category_commands.as_ref(),
        )
        .await
        .map_err(|err| std::io::Error::other(format!("demo seeding failed: {err}")))?;
    }

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr)?
    .run();

    info!(addr = %config.bind_addr, "catalogue listening");
    health_state.mark_ready();
    Ok(server)
}
