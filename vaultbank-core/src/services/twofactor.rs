//! Two-factor enrollment and disable flows
//!
//! Enrollment is a two-step exchange: the server hands out a provisioning
//! secret without enabling anything, the user scans it into an
//! authenticator app, and the secret goes back together with a 6-digit
//! code to finalize. The secret lives only in a `PendingEnrollment` value
//! in memory; it is never persisted. Disabling is a single code-gated
//! step. Both entry points are gated on the server-reported status, which
//! callers re-query when the settings flow opens so they never act on
//! stale state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::adapters::{ApiClient, Auth};
use crate::domain::result::{Error, Result};

/// Issuer label shown in authenticator apps
const OTPAUTH_ISSUER: &str = "VaultBank";

/// Server-reported 2FA state, from `GET /2fa/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorStatus {
    #[serde(rename = "has_2fa")]
    pub enabled: bool,
    #[serde(default)]
    pub username: String,
}

/// Provisioning secret held between "enrollment started" and "confirmed or
/// abandoned". Volatile only; dropping the value abandons the enrollment.
#[derive(Debug)]
pub struct PendingEnrollment {
    secret: String,
    username: String,
}

impl PendingEnrollment {
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Provisioning URI for authenticator apps, rendered as a QR code by
    /// the frontend (with the raw secret as manual-entry fallback).
    pub fn otpauth_url(&self) -> String {
        let issuer = urlencoding::encode(OTPAUTH_ISSUER);
        let account = urlencoding::encode(&self.username);
        format!(
            "otpauth://totp/{issuer}:{account}?secret={}&issuer={issuer}&digits=6&period=30",
            self.secret
        )
    }
}

/// Check a one-time code before it goes anywhere near the network
pub fn validate_otp(code: &str) -> Result<()> {
    let code = code.trim();
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::validation(
            "Verification code must be exactly 6 digits",
        ));
    }
    Ok(())
}

pub struct TwoFactorService {
    api: Arc<ApiClient>,
}

impl TwoFactorService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Current server-side 2FA state. This endpoint is the canonical
    /// status source; the `has_2fa` field on the profile is only consumed
    /// opportunistically during login.
    pub fn status(&self) -> Result<TwoFactorStatus> {
        let body = self.api.get("/2fa/status", Auth::Bearer)?;
        Ok(serde_json::from_value(body)?)
    }

    /// Request a provisioning secret. The server does not enable 2FA at
    /// this step; nothing changes until `confirm_enrollment` succeeds.
    pub fn begin_enrollment(&self) -> Result<PendingEnrollment> {
        let body = self.api.post_form("/enable_2fa", &[], Auth::Bearer)?;

        let secret = body
            .get("secret")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::api(200, "Server did not return a provisioning secret"))?
            .to_string();
        let username = body
            .get("username")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(PendingEnrollment { secret, username })
    }

    /// Exchange the pending secret plus the user's code to finalize
    /// enrollment. On failure the pending secret stays valid, so the
    /// caller can retry with a fresh code without restarting the flow.
    pub fn confirm_enrollment(&self, pending: &PendingEnrollment, otp: &str) -> Result<()> {
        validate_otp(otp)?;
        self.api.post_form(
            "/setup_2fa",
            &[("secret", pending.secret()), ("otp", otp.trim())],
            Auth::Bearer,
        )?;
        Ok(())
    }

    /// Disable 2FA, gated on a current code. Retry needs nothing
    /// re-requested; the user just enters a fresh code.
    pub fn disable(&self, otp: &str) -> Result<()> {
        validate_otp(otp)?;
        self.api
            .post_form("/disable_2fa", &[("otp", otp.trim())], Auth::Bearer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_otp_accepts_six_digits() {
        assert!(validate_otp("123456").is_ok());
        assert!(validate_otp(" 123456 ").is_ok());
    }

    #[test]
    fn test_validate_otp_rejects_bad_input() {
        assert!(validate_otp("").is_err());
        assert!(validate_otp("12345").is_err());
        assert!(validate_otp("1234567").is_err());
        assert!(validate_otp("12345a").is_err());
        assert!(validate_otp("12 456").is_err());
    }

    #[test]
    fn test_otpauth_url_shape() {
        let pending = PendingEnrollment {
            secret: "JBSWY3DPEHPK3PXP".to_string(),
            username: "alice@example".to_string(),
        };
        let url = pending.otpauth_url();
        assert!(url.starts_with("otpauth://totp/VaultBank:"));
        assert!(url.contains("secret=JBSWY3DPEHPK3PXP"));
        assert!(url.contains("issuer=VaultBank"));
        assert!(url.contains("alice%40example"));
        assert!(url.contains("digits=6"));
        assert!(url.contains("period=30"));
    }

    #[test]
    fn test_status_field_mapping() {
        let status: TwoFactorStatus =
            serde_json::from_str(r#"{"has_2fa": true, "username": "alice"}"#).unwrap();
        assert!(status.enabled);
        assert_eq!(status.username, "alice");
    }
}
