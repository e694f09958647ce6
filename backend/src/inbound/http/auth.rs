//! API token endpoint.
//!
//! ```text
//! POST /api/api-token-auth/ {"username":"admin","password":"password"}
//! ```
//!
//! Accepts JSON or form bodies. Each successful call issues a fresh token;
//! earlier tokens for the account stay valid.

use actix_web::{Either, post, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::ports::AuthenticatorError;
use crate::domain::{
    Error, FieldErrors, LoginCredentials, LoginValidationError, NON_FIELD_ERRORS,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";

/// Credentials exchanged for a token.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct TokenRequest {
    /// Account name.
    #[schema(example = "admin")]
    pub username: Option<String>,
    /// Account password.
    #[schema(example = "password")]
    pub password: Option<String>,
}

/// Issued API token.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Value for the `Authorization: Token <token>` header.
    #[schema(example = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")]
    pub token: String,
}

fn rejected(field: &str, message: &str) -> Error {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_owned(), vec![message.to_owned()]);
    Error::invalid_request(message).with_field_errors(errors)
}

fn parse_credentials(request: TokenRequest) -> ApiResult<LoginCredentials> {
    let (username, password) = match (request.username, request.password) {
        (Some(username), Some(password)) => (username, password),
        (username, password) => {
            let mut errors = FieldErrors::new();
            for (field, value) in [("username", username), ("password", password)] {
                if value.is_none() {
                    errors.insert(field.to_owned(), vec!["This field is required.".to_owned()]);
                }
            }
            return Err(Error::invalid_request("This field is required.").with_field_errors(errors));
        }
    };
    LoginCredentials::try_from_parts(&username, &password).map_err(|err| match err {
        LoginValidationError::EmptyUsername | LoginValidationError::EmptyPassword => {
            rejected(err.field(), "This field may not be blank.")
        }
    })
}

fn map_authenticator_error(error: AuthenticatorError) -> Error {
    match error {
        AuthenticatorError::InvalidCredentials | AuthenticatorError::UnknownToken => {
            rejected(NON_FIELD_ERRORS, INVALID_CREDENTIALS)
        }
        AuthenticatorError::Backend { message } => {
            warn!(%message, "token issuance failed");
            Error::service_unavailable("authentication is temporarily unavailable")
        }
    }
}

/// Exchange a username and password for an API token.
#[utoipa::path(
    post,
    path = "/api/api-token-auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing fields or wrong credentials", body = ErrorSchema),
        (status = 503, description = "Authentication backend unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "obtainAuthToken",
    security([])
)]
#[post("/api-token-auth")]
pub async fn obtain_auth_token(
    state: web::Data<HttpState>,
    payload: Either<web::Json<TokenRequest>, web::Form<TokenRequest>>,
) -> ApiResult<web::Json<TokenResponse>> {
    let request = match payload {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };
    let credentials = parse_credentials(request)?;
    let token = state
        .access
        .authenticator()
        .issue_token(&credentials)
        .await
        .map_err(map_authenticator_error)?;
    info!(username = credentials.username(), "api token obtained");
    Ok(web::Json(TokenResponse {
        token: token.expose().to_owned(),
    }))
}
