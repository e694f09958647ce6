//! Index banner and access-control demonstration endpoints.
//!
//! Each endpoint exists to exercise one access policy:
//!
//! ```text
//! GET /                          open
//! GET /api/secret/               any authenticated caller
//! GET /api/teachers_view/        instructors only
//! GET /api/throttle_check/       anonymous throttle
//! GET /api/throttle_check_auth/  authenticated, `ten` per minute
//! ```

use actix_web::{HttpRequest, get, web};

use crate::domain::AccessPolicy;
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::admit;
use crate::inbound::http::schemas::{ErrorSchema, MessageResponse};
use crate::inbound::http::state::HttpState;

/// Text served at the site root.
pub const BANNER: &str = "list of courses provided by hooshmandlab";

async fn guarded(
    request: &HttpRequest,
    state: &HttpState,
    policy: &AccessPolicy,
    message: &str,
) -> ApiResult<web::Json<MessageResponse>> {
    admit(request, state, policy).await?;
    Ok(web::Json(MessageResponse::new(message)))
}

/// Site banner.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Banner", body = String)),
    tags = ["demo"],
    security([])
)]
#[get("/")]
pub async fn index() -> web::Json<&'static str> {
    web::Json(BANNER)
}

/// Visible to any authenticated caller.
#[utoipa::path(
    get,
    path = "/api/secret",
    responses(
        (status = 200, description = "Secret", body = MessageResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["demo"],
    security(("token" = []))
)]
#[get("/secret")]
pub async fn secret(
    request: HttpRequest,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<MessageResponse>> {
    guarded(
        &request,
        &state,
        &AccessPolicy::AUTHENTICATED,
        "Some secret message",
    )
    .await
}

/// Visible to instructors only.
#[utoipa::path(
    get,
    path = "/api/teachers_view",
    responses(
        (status = 200, description = "Instructor message", body = MessageResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not an instructor", body = ErrorSchema)
    ),
    tags = ["demo"],
    security(("token" = []))
)]
#[get("/teachers_view")]
pub async fn teachers_view(
    request: HttpRequest,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<MessageResponse>> {
    guarded(
        &request,
        &state,
        &AccessPolicy::INSTRUCTORS,
        "Only instructors should see this",
    )
    .await
}

/// Throttled per anonymous peer.
#[utoipa::path(
    get,
    path = "/api/throttle_check",
    responses(
        (status = 200, description = "Admitted", body = MessageResponse),
        (status = 429, description = "Throttled", body = ErrorSchema)
    ),
    tags = ["demo"]
)]
#[get("/throttle_check")]
pub async fn throttle_check(
    request: HttpRequest,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<MessageResponse>> {
    guarded(
        &request,
        &state,
        &AccessPolicy::ANONYMOUS_THROTTLED,
        "successful",
    )
    .await
}

/// Authenticated callers, ten requests per minute each.
#[utoipa::path(
    get,
    path = "/api/throttle_check_auth",
    responses(
        (status = 200, description = "Admitted", body = MessageResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 429, description = "Throttled", body = ErrorSchema)
    ),
    tags = ["demo"],
    security(("token" = []))
)]
#[get("/throttle_check_auth")]
pub async fn throttle_check_auth(
    request: HttpRequest,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<MessageResponse>> {
    guarded(
        &request,
        &state,
        &AccessPolicy::AUTHENTICATED_TEN,
        "message for the logged in users only",
    )
    .await
}
