//! Request-side glue for the access gate.
//!
//! Handlers call [`admit`] with their endpoint policy before touching any
//! catalogue port. The token comes from `Authorization: Token <key>` (or
//! `Bearer <key>`); throttle keys for anonymous callers use the peer IP.

use actix_web::HttpRequest;
use actix_web::http::header::{AUTHORIZATION, HeaderMap};

use crate::domain::{AccessPolicy, AuthToken, Caller, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

const TOKEN_SCHEMES: [&str; 2] = ["token", "bearer"];
const UNKNOWN_PEER: &str = "unknown";

/// Extract the API token from the `Authorization` header.
///
/// Headers using other schemes are ignored so the request proceeds
/// anonymously. A recognised scheme with a missing or malformed key is an
/// authentication failure.
pub fn token_from_headers(headers: &HeaderMap) -> ApiResult<Option<AuthToken>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| {
        Error::unauthorized(
            "Invalid token header. Token string should not contain invalid characters.",
        )
    })?;

    let mut parts = raw.split_whitespace();
    let Some(scheme) = parts.next() else {
        return Ok(None);
    };
    if !TOKEN_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
        return Ok(None);
    }

    let key = parts
        .next()
        .ok_or_else(|| Error::unauthorized("Invalid token header. No credentials provided."))?;
    if parts.next().is_some() {
        return Err(Error::unauthorized(
            "Invalid token header. Token string should not contain spaces.",
        ));
    }
    AuthToken::parse(key)
        .map(Some)
        .ok_or_else(|| Error::unauthorized("Invalid token header. No credentials provided."))
}

/// Remote peer IP, without the port.
pub fn peer_ip(request: &HttpRequest) -> String {
    request
        .peer_addr()
        .map_or_else(|| UNKNOWN_PEER.to_owned(), |addr| addr.ip().to_string())
}

/// Run the access chain for `policy` and return the admitted caller.
pub async fn admit(
    request: &HttpRequest,
    state: &HttpState,
    policy: &AccessPolicy,
) -> ApiResult<Caller> {
    let token = token_from_headers(request.headers())?;
    state
        .access
        .admit(policy, token.as_ref(), &peer_ip(request))
        .await
}
