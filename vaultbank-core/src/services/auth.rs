//! Authentication flow
//!
//! Login runs `idle → submitting → {authenticated | otp_required |
//! failed}`. A 401 carrying the server's "2FA required" marker is the
//! step-up signal: the submitted credentials are cached in a volatile
//! `PendingLogin` for the duration of the challenge, then re-sent together
//! with the 6-digit code. Dropping the `PendingLogin` cancels the
//! challenge and discards the cache.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::adapters::{ApiClient, Auth};
use crate::domain::result::{Error, Result};
use crate::domain::{Profile, Role, Session};
use crate::ports::SessionStore;
use crate::services::twofactor::validate_otp;

/// Marker the server puts in the 401 detail when password auth succeeded
/// but a one-time code is still needed
const OTP_REQUIRED_MARKER: &str = "2fa required";

/// Outcome of a credentials submission
pub enum LoginOutcome {
    Authenticated(Session),
    /// Step-up required; the challenge holds the credential cache
    OtpRequired(PendingLogin),
}

/// Volatile credential cache for an outstanding OTP challenge
pub struct PendingLogin {
    username: String,
    password: String,
}

impl PendingLogin {
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Decide whether a 401 on the login endpoint is the step-up signal or a
/// plain rejection
pub fn is_otp_challenge(detail: &str) -> bool {
    detail.to_lowercase().contains(OTP_REQUIRED_MARKER)
}

pub struct AuthService {
    api: Arc<ApiClient>,
    store: Arc<dyn SessionStore>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn SessionStore>) -> Self {
        Self { api, store }
    }

    /// Submit credentials. HTTP 200 authenticates directly; a 401 carrying
    /// the "2FA required" marker opens the OTP challenge; anything else is
    /// a failure with the server's reason.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let result = self.api.post_form(
            "/token",
            &[("username", username), ("password", password)],
            Auth::Anonymous,
        );

        match result {
            Ok(body) => {
                let session = self.establish_session(&body, Role::User, username)?;
                Ok(LoginOutcome::Authenticated(session))
            }
            Err(Error::Api { status: 401, detail }) if is_otp_challenge(&detail) => {
                Ok(LoginOutcome::OtpRequired(PendingLogin {
                    username: username.to_string(),
                    password: password.to_string(),
                }))
            }
            Err(e) => Err(e),
        }
    }

    /// Answer the OTP challenge by re-sending the cached credentials with
    /// the code. On failure the challenge stays open and the cache stays
    /// valid; the caller clears the input and retries.
    pub fn submit_otp(&self, pending: &PendingLogin, otp: &str) -> Result<Session> {
        validate_otp(otp)?;
        let body = self.api.post_form(
            "/token_2fa",
            &[
                ("username", &pending.username),
                ("password", &pending.password),
                ("otp", otp.trim()),
            ],
            Auth::Anonymous,
        )?;
        self.establish_session(&body, Role::User, &pending.username)
    }

    /// Register a new account. Mirrors the fail-fast checks the server
    /// also enforces; its complexity rules surface verbatim on rejection.
    /// Returns the assigned account number.
    pub fn signup(&self, username: &str, password: &str) -> Result<String> {
        let username = username.trim();
        if username.len() < 4 {
            return Err(Error::validation(
                "Username must be at least 4 characters long",
            ));
        }
        if password.len() < 6 {
            return Err(Error::validation(
                "Password must be at least 6 characters long",
            ));
        }

        let body = self.api.post_form(
            "/signup",
            &[("username", username), ("password", password)],
            Auth::Anonymous,
        )?;

        Ok(body
            .get("account_number")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    pub fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        if new_password.len() < 6 {
            return Err(Error::validation(
                "Password must be at least 6 characters long",
            ));
        }
        self.api.post_form(
            "/change_password",
            &[
                ("old_password", old_password),
                ("new_password", new_password),
            ],
            Auth::Bearer,
        )?;
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.store.clear()
    }

    /// Store the token, then fetch the profile and persist the full
    /// session. The profile fetch is best effort: if it fails the token is
    /// still valid and the session survives with empty profile fields,
    /// which views render as "unknown" rather than crashing.
    fn establish_session(
        &self,
        body: &JsonValue,
        role: Role,
        fallback_username: &str,
    ) -> Result<Session> {
        let token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::api(200, "Login response did not include an access token"))?;

        let mut session = Session::new(token, role);
        session.username = body
            .get("username")
            .and_then(|v| v.as_str())
            .unwrap_or(fallback_username)
            .to_string();
        session.account_number = body
            .get("account_number")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        // The profile fetch authenticates with the new token, so it has to
        // be in the store first.
        self.store.save(&session)?;

        if let Ok(profile_body) = self.api.get("/users/me", Auth::Bearer) {
            if let Ok(profile) = serde_json::from_value::<Profile>(profile_body) {
                session.username = profile.username;
                session.account_number = profile.account_number;
            }
        }

        self.store.save(&session)?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_challenge_marker() {
        assert!(is_otp_challenge("2FA required"));
        assert!(is_otp_challenge("2fa required for this account"));
        assert!(!is_otp_challenge("Incorrect username or password"));
        assert!(!is_otp_challenge(""));
    }
}
