//! Driven port for token authentication.
//!
//! Adapters own account storage and token bookkeeping; the domain only sees
//! credentials going in and a [`Principal`] coming out.

use async_trait::async_trait;

use crate::domain::{AuthToken, LoginCredentials, Principal};

use super::define_port_error;

define_port_error! {
    /// Errors raised by authenticators.
    pub enum AuthenticatorError {
        /// Username and password did not match an account.
        InvalidCredentials =>
            "unable to log in with provided credentials",
        /// Token is unknown or revoked.
        UnknownToken =>
            "invalid token",
        /// Backing account store failed.
        Backend { message: String } =>
            "authentication backend failed: {message}",
    }
}

/// Port for issuing and resolving API tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange credentials for a token. Tokens issued earlier for the same
    /// account stay valid.
    async fn issue_token(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthToken, AuthenticatorError>;

    /// Resolve a presented token to its owner.
    async fn resolve(&self, token: &AuthToken) -> Result<Principal, AuthenticatorError>;
}

/// Fixture authenticator: `admin`/`password` is an instructor whose token is
/// `fixture-token`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthenticator;

const FIXTURE_TOKEN: &str = "fixture-token";

#[async_trait]
impl Authenticator for FixtureAuthenticator {
    async fn issue_token(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthToken, AuthenticatorError> {
        if credentials.username() == "admin" && credentials.password() == "password" {
            AuthToken::parse(FIXTURE_TOKEN)
                .ok_or_else(|| AuthenticatorError::backend("fixture token is blank"))
        } else {
            Err(AuthenticatorError::invalid_credentials())
        }
    }

    async fn resolve(&self, token: &AuthToken) -> Result<Principal, AuthenticatorError> {
        if token.expose() == FIXTURE_TOKEN {
            Ok(Principal::new("admin", [crate::domain::INSTRUCTORS_GROUP]))
        } else {
            Err(AuthenticatorError::unknown_token())
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("admin", "password", true)]
    #[case("admin", "wrong", false)]
    #[case("other", "password", false)]
    #[tokio::test]
    async fn fixture_issues_tokens_for_the_admin_account(
        #[case] username: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let creds = LoginCredentials::try_from_parts(username, password).expect("credentials");
        let result = FixtureAuthenticator.issue_token(&creds).await;
        match (should_succeed, result) {
            (true, Ok(token)) => {
                let principal = FixtureAuthenticator
                    .resolve(&token)
                    .await
                    .expect("issued token resolves");
                assert_eq!(principal.username(), "admin");
            }
            (false, Err(err)) => assert_eq!(err, AuthenticatorError::InvalidCredentials),
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(token)) => panic!("expected failure, got token: {token:?}"),
        }
    }
}
