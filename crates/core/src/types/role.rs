//! User roles stored on `users/{uid}` documents.

use serde::{Deserialize, Serialize};

/// Role recorded on a user's profile document.
///
/// Only `"admin"` carries privileges; every other stored value is kept
/// verbatim so it can be shown back without loss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    /// Full access to the administrative API.
    Admin,
    /// Any non-admin role (e.g. `"cliente"`).
    Other(String),
}

impl UserRole {
    /// Wire value for the admin role.
    pub const ADMIN: &'static str = "admin";

    /// Whether this role may use the administrative API.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// The role as stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => Self::ADMIN,
            Self::Other(role) => role,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<String> for UserRole {
    fn from(role: String) -> Self {
        if role == Self::ADMIN {
            Self::Admin
        } else {
            Self::Other(role)
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => UserRole::ADMIN.to_owned(),
            UserRole::Other(role) => role,
        }
    }
}
