//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every catalogue endpoint, the wire schemas and the
//! `Authorization: Token <key>` security scheme. The document backs Swagger UI
//! in debug builds and is exported by `cargo run --bin openapi-dump`.

use crate::inbound::http::auth::{TokenRequest, TokenResponse};
use crate::inbound::http::categories::{CategoryRequest, CategoryResponse};
use crate::inbound::http::courses::{CourseResponse, CourseTitleRequest, CourseWriteRequest};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, MessageResponse};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the token header security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "`Token <key>` issued by POST /api/api-token-auth.",
            ))),
        );
    }
}

/// OpenAPI document for the catalogue API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Course catalogue API",
        description = "Courses, categories, token authentication and access-control probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::demo::index,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::create_course,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::courses::rename_course,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::categories::create_category,
        crate::inbound::http::categories::delete_category,
        crate::inbound::http::auth::obtain_auth_token,
        crate::inbound::http::demo::secret,
        crate::inbound::http::demo::teachers_view,
        crate::inbound::http::demo::throttle_check,
        crate::inbound::http::demo::throttle_check_auth,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CourseResponse,
        CourseWriteRequest,
        CourseTitleRequest,
        CategoryResponse,
        CategoryRequest,
        TokenRequest,
        TokenResponse,
        MessageResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "courses", description = "Course listing and writes"),
        (name = "categories", description = "Course categories"),
        (name = "auth", description = "API token issuance"),
        (name = "demo", description = "Access-control demonstration endpoints"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
