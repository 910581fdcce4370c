//! Authenticated user handle.

use serde::{Deserialize, Serialize};
use crate::id::UserId;

/// The signed-in user.
///
/// Passed explicitly to every controller and backend call; nothing in the
/// workspace keeps an ambient "current user".
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// User id (also the id of the user's profile row)
    pub id: UserId,

    /// Sign-in email, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Bearer token for the hosted backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl AuthUser {
    /// Create a handle for a user id.
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
            access_token: None,
        }
    }

    /// The fixed user used by local (memory / JSON file) backends.
    pub fn local() -> Self {
        Self::new("local-user")
    }

    /// Set the email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

// Tokens end up in tracing spans; never print them.
impl std::fmt::Debug for AuthUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let user = AuthUser::new("u1").with_access_token("secret-token");
        let printed = format!("{:?}", user);
        assert!(printed.contains("u1"));
        assert!(!printed.contains("secret-token"));
    }
}
