//! Authenticator backed by a fixed account list.
//!
//! Accounts come from configuration as `user:password:Group1+Group2`
//! entries separated by `;`. Passwords and issued tokens are kept only as
//! SHA-256 digests.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{Authenticator, AuthenticatorError};
use crate::domain::{AuthToken, LoginCredentials, Principal};

/// Default account list: one instructor.
pub const DEFAULT_ACCOUNTS: &str = "admin:password:Instructors";

fn digest(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Error raised for malformed account entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountSpecError {
    /// An entry lacks a username or password.
    #[error("account entry `{entry}` must look like `user:password[:Group+Group]`")]
    Malformed {
        /// Leading part of the offending entry.
        entry: String,
    },
    /// A username appears twice.
    #[error("account `{username}` is listed more than once")]
    Duplicate {
        /// Repeated username.
        username: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StaticAccount {
    password_digest: String,
    groups: Vec<String>,
}

/// Parsed account list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountList {
    accounts: HashMap<String, StaticAccount>,
}

impl AccountList {
    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether no account is configured.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl FromStr for AccountList {
    type Err = AccountSpecError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut accounts = HashMap::new();
        for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let malformed = || AccountSpecError::Malformed {
                entry: entry.split(':').next().unwrap_or_default().to_owned(),
            };
            let mut parts = entry.splitn(3, ':');
            let username = parts.next().map(str::trim).filter(|u| !u.is_empty());
            let password = parts.next().filter(|p| !p.is_empty());
            let (Some(username), Some(password)) = (username, password) else {
                return Err(malformed());
            };
            let groups = parts
                .next()
                .map(|list| {
                    list.split('+')
                        .map(str::trim)
                        .filter(|g| !g.is_empty())
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default();
            let account = StaticAccount {
                password_digest: digest(password),
                groups,
            };
            if accounts.insert(username.to_owned(), account).is_some() {
                return Err(AccountSpecError::Duplicate {
                    username: username.to_owned(),
                });
            }
        }
        Ok(Self { accounts })
    }
}

/// Token authenticator over an [`AccountList`].
pub struct StaticAccountAuthenticator {
    accounts: AccountList,
    tokens: Mutex<HashMap<String, String>>,
}

impl StaticAccountAuthenticator {
    /// Authenticator with no tokens issued yet.
    pub fn new(accounts: AccountList) -> Self {
        Self {
            accounts,
            tokens: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl Authenticator for StaticAccountAuthenticator {
    async fn issue_token(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthToken, AuthenticatorError> {
        let known = self
            .accounts
            .accounts
            .get(credentials.username())
            .is_some_and(|account| account.password_digest == digest(credentials.password()));
        if !known {
            return Err(AuthenticatorError::invalid_credentials());
        }

        let raw = Uuid::new_v4().simple().to_string();
        let token = AuthToken::parse(&raw)
            .ok_or_else(|| AuthenticatorError::backend("generated token was blank"))?;
        self.tokens
            .lock()
            .map_err(|_| AuthenticatorError::backend("token table lock poisoned"))?
            .insert(digest(token.expose()), credentials.username().to_owned());
        info!(username = credentials.username(), "issued API token");
        Ok(token)
    }

    async fn resolve(&self, token: &AuthToken) -> Result<Principal, AuthenticatorError> {
        let username = self
            .tokens
            .lock()
            .map_err(|_| AuthenticatorError::backend("token table lock poisoned"))?
            .get(&digest(token.expose()))
            .cloned()
            .ok_or_else(AuthenticatorError::unknown_token)?;
        let account = self
            .accounts
            .accounts
            .get(&username)
            .ok_or_else(AuthenticatorError::unknown_token)?;
        Ok(Principal::new(username, account.groups.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::INSTRUCTORS_GROUP;
    use rstest::rstest;

    fn creds(username: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(username, password).expect("credentials")
    }

    #[rstest]
    fn parses_account_lists() {
        let accounts: AccountList = "admin:password:Instructors; student:pw ; mentor:x:A+B"
            .parse()
            .expect("valid list");
        assert_eq!(accounts.len(), 3);
        assert_eq!(
            accounts.accounts.get("mentor").map(|a| a.groups.clone()),
            Some(vec!["A".to_owned(), "B".to_owned()])
        );
    }

    #[rstest]
    #[case("admin")]
    #[case(":password")]
    #[case("admin::Instructors")]
    #[case("admin:pw;admin:other")]
    fn rejects_malformed_lists(#[case] raw: &str) {
        assert!(raw.parse::<AccountList>().is_err());
    }

    #[rstest]
    fn malformed_entries_report_only_the_username() {
        let err = "mentor:".parse::<AccountList>().expect_err("malformed");
        assert_eq!(
            err,
            AccountSpecError::Malformed {
                entry: "mentor".to_owned()
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn issued_tokens_resolve_to_their_account() {
        let authenticator =
            StaticAccountAuthenticator::new(DEFAULT_ACCOUNTS.parse().expect("defaults"));
        let token = authenticator
            .issue_token(&creds("admin", "password"))
            .await
            .expect("token");
        let principal = authenticator.resolve(&token).await.expect("principal");
        assert_eq!(principal.username(), "admin");
        assert!(principal.in_group(INSTRUCTORS_GROUP));
    }

    #[rstest]
    #[case("admin", "wrong")]
    #[case("nobody", "password")]
    #[tokio::test]
    async fn bad_credentials_are_rejected(#[case] username: &str, #[case] password: &str) {
        let authenticator =
            StaticAccountAuthenticator::new(DEFAULT_ACCOUNTS.parse().expect("defaults"));
        let err = authenticator
            .issue_token(&creds(username, password))
            .await
            .expect_err("rejected");
        assert_eq!(err, AuthenticatorError::InvalidCredentials);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_tokens_are_rejected() {
        let authenticator = StaticAccountAuthenticator::new(AccountList::default());
        let token = AuthToken::parse("deadbeef").expect("token");
        assert_eq!(
            authenticator.resolve(&token).await,
            Err(AuthenticatorError::UnknownToken)
        );
    }
}
