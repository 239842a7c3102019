//! Session domain model

use serde::{Deserialize, Serialize};

/// Role a session was issued for. Only one identity is ever active at a
/// time; an admin login overwrites a user session and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// The client-held proof of authentication: bearer token plus cached
/// profile fields. Lives in the session store from login until logout or
/// the first 401 from an authenticated call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    /// May be empty when the profile fetch after login failed.
    pub username: String,
    /// May be empty when the profile fetch after login failed.
    pub account_number: String,
    pub role: Role,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            username: String::new(),
            account_number: String::new(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Username for display, tolerating a failed profile fetch
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            "unknown"
        } else {
            &self.username
        }
    }
}
