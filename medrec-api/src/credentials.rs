//! Bearer credentials and their storage.
//!
//! Every mutating call takes a [`BearerToken`] explicitly; the [`CredentialStore`] is only
//! where a UI keeps the token between calls.

use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Opaque bearer token issued by the remote API on login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// A blank token is not usable for authenticated calls.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Returns the token, or [`ApiError::MissingCredential`] if it is blank.
    pub fn usable(&self) -> ApiResult<&Self> {
        if self.is_blank() {
            Err(ApiError::MissingCredential)
        } else {
            Ok(self)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

impl From<&str> for BearerToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for BearerToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

/// The logged-in user, as returned by the login endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

/// Response of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: BearerToken,
    #[serde(flatten)]
    pub user: UserProfile,
}

/// Storage for the current session.
pub trait CredentialStore {
    /// Returns the current token, if any.
    fn token(&self) -> Option<BearerToken>;

    /// Returns the current user, if any.
    fn user(&self) -> Option<UserProfile>;

    /// Stores the session, replacing the previous one.
    fn store(&self, session: Session);

    /// Forgets the current session (logout).
    fn clear(&self);
}

/// Returns the stored token, or [`ApiError::MissingCredential`] when there is no usable one.
pub fn require_token(store: &impl CredentialStore) -> ApiResult<BearerToken> {
    match store.token() {
        Some(token) if !token.is_blank() => Ok(token),
        _ => Err(ApiError::MissingCredential),
    }
}

/// [`CredentialStore`] which keeps the session in memory.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    session: RwLock<Option<Session>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<R>(&self, f: impl FnOnce(Option<&Session>) -> R) -> R {
        let guard = self
            .session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(guard.as_ref())
    }

    fn write(&self, session: Option<Session>) {
        let mut guard = self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = session;
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self) -> Option<BearerToken> {
        self.read(|session| session.map(|s| s.token.clone()))
    }

    fn user(&self) -> Option<UserProfile> {
        self.read(|session| session.map(|s| s.user.clone()))
    }

    fn store(&self, session: Session) {
        self.write(Some(session));
    }

    fn clear(&self) {
        self.write(None);
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::tests::session_fixture;

    #[test]
    fn test_should_detect_blank_token() {
        assert!(BearerToken::new("").is_blank());
        assert!(BearerToken::new("   ").is_blank());
        assert!(!BearerToken::new("abc").is_blank());
        assert_eq!(
            BearerToken::new(" ").usable(),
            Err(ApiError::MissingCredential)
        );
    }

    #[test]
    fn test_should_not_leak_token_in_debug() {
        let token = BearerToken::new("secret-token");
        assert!(!format!("{token:?}").contains("secret"));
    }

    #[test]
    fn test_should_deserialize_login_response() {
        let session: Session = serde_json::from_str(
            r#"{"token":"abc","first_name":"Ada","last_name":"Byrne","email":"ada@clinic.ie"}"#,
        )
        .unwrap();
        assert_eq!(session.token.as_str(), "abc");
        assert_eq!(session.user.first_name, "Ada");
        assert_eq!(session.user.email, "ada@clinic.ie");
    }

    #[test]
    fn test_should_store_and_clear_session() {
        let store = MemoryCredentialStore::new();
        assert_eq!(require_token(&store), Err(ApiError::MissingCredential));

        store.store(session_fixture("abc"));
        assert_eq!(require_token(&store), Ok(BearerToken::new("abc")));
        assert_eq!(store.user().unwrap().last_name, "Byrne");

        store.clear();
        assert!(store.token().is_none());
        assert!(store.user().is_none());
    }

    #[test]
    fn test_should_reject_stored_blank_token() {
        let store = MemoryCredentialStore::new();
        store.store(session_fixture(""));
        assert_eq!(require_token(&store), Err(ApiError::MissingCredential));
    }
}
