//! Admin panel operations
//!
//! The elevated surface mirrors the user one: bearer-authenticated calls,
//! 401 clears the session. Mutations (lock/unlock, password reset,
//! flag/unflag, log purge) are requested and never applied locally; the
//! frontend re-fetches after every mutation so it always renders
//! authoritative state. Unlike the user surface, admin mutations ride in
//! query parameters or JSON bodies.

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};

use crate::adapters::{ApiClient, Auth};
use crate::domain::admin::{
    AdminSettings, AdminTransaction, AdminUser, DashboardMetrics, SecurityLogEntry,
};
use crate::domain::result::{Error, Result};
use crate::domain::{Role, Session};
use crate::ports::SessionStore;

pub struct AdminService {
    api: Arc<ApiClient>,
    store: Arc<dyn SessionStore>,
}

impl AdminService {
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn SessionStore>) -> Self {
        Self { api, store }
    }

    /// Authenticate against the admin surface. Replaces whatever session
    /// was active; only one identity lives in the store at a time.
    pub fn login(&self, username: &str, password: &str, otp: Option<&str>) -> Result<Session> {
        let body = self.api.post_json(
            "/admin/login",
            &json!({
                "username": username,
                "password": password,
                "otp": otp,
            }),
            Auth::Anonymous,
        )?;

        let token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::api(200, "Login response did not include an access token"))?;

        let mut session = Session::new(token, Role::Admin);
        session.username = body
            .get("username")
            .and_then(|v| v.as_str())
            .unwrap_or(username)
            .to_string();

        self.store.save(&session)?;
        Ok(session)
    }

    pub fn dashboard(&self) -> Result<DashboardMetrics> {
        let body = self.authed_get("/admin/dashboard")?;
        Ok(serde_json::from_value(body)?)
    }

    pub fn users(&self) -> Result<Vec<AdminUser>> {
        let body = self.authed_get("/admin/users")?;
        Ok(serde_json::from_value(body)?)
    }

    pub fn recent_users(&self, limit: usize) -> Result<Vec<AdminUser>> {
        let body = self.authed_get(&format!("/admin/users/recent?limit={limit}"))?;
        Ok(serde_json::from_value(body)?)
    }

    pub fn user(&self, id: &str) -> Result<AdminUser> {
        let body = self.authed_get(&format!("/admin/users/{id}"))?;
        Ok(serde_json::from_value(body)?)
    }

    /// Lock or unlock an account. Returns the server's acknowledgment;
    /// callers re-fetch the user to see the new state.
    pub fn set_user_lock(&self, id: &str, lock: bool) -> Result<String> {
        self.require_admin()?;
        let body = self
            .api
            .post(&format!("/admin/users/{id}/lock?lock={lock}"), Auth::Bearer)?;
        Ok(ack_message(&body, "User status updated"))
    }

    /// Reset a user's password. The acknowledgment carries the temporary
    /// password when the server chose to include one.
    pub fn reset_user_password(&self, id: &str) -> Result<String> {
        self.require_admin()?;
        let body = self
            .api
            .post(&format!("/admin/users/{id}/reset-password"), Auth::Bearer)?;
        let message = match body.get("temp_password").and_then(|v| v.as_str()) {
            Some(temp) => format!("Password reset. Temporary password: {temp}"),
            None => ack_message(&body, "Password reset"),
        };
        Ok(message)
    }

    pub fn transactions(&self, filter: Option<&str>) -> Result<Vec<AdminTransaction>> {
        let path = match filter {
            Some(f) if f != "all" => format!("/admin/transactions?filter={f}"),
            _ => "/admin/transactions".to_string(),
        };
        let body = self.authed_get(&path)?;
        Ok(serde_json::from_value(body)?)
    }

    pub fn recent_transactions(&self, limit: usize) -> Result<Vec<AdminTransaction>> {
        let body = self.authed_get(&format!("/admin/transactions/recent?limit={limit}"))?;
        Ok(serde_json::from_value(body)?)
    }

    pub fn set_transaction_flag(&self, id: &str, flag: bool) -> Result<String> {
        self.require_admin()?;
        let body = self.api.post(
            &format!("/admin/transactions/{id}/flag?flag={flag}"),
            Auth::Bearer,
        )?;
        Ok(ack_message(&body, "Transaction flag updated"))
    }

    pub fn security_logs(&self, limit: usize) -> Result<Vec<SecurityLogEntry>> {
        let body = self.authed_get(&format!("/admin/security/logs?limit={limit}"))?;
        Ok(serde_json::from_value(body)?)
    }

    pub fn update_settings(&self, settings: &AdminSettings) -> Result<()> {
        self.require_admin()?;
        self.api.post_json(
            "/admin/settings",
            &serde_json::to_value(settings)?,
            Auth::Bearer,
        )?;
        Ok(())
    }

    /// Purge security logs older than the given number of days
    pub fn purge_logs(&self, days: u32) -> Result<String> {
        self.require_admin()?;
        let body =
            self.api
                .post_json("/admin/logs/clear", &json!({ "days": days }), Auth::Bearer)?;
        Ok(ack_message(&body, "Logs cleared"))
    }

    /// Invalidate every active session server-wide
    pub fn lock_all_sessions(&self) -> Result<String> {
        self.require_admin()?;
        let body = self.api.post("/admin/sessions/lock-all", Auth::Bearer)?;
        Ok(ack_message(&body, "All sessions locked"))
    }

    fn authed_get(&self, path: &str) -> Result<JsonValue> {
        self.require_admin()?;
        self.api.get(path, Auth::Bearer)
    }

    /// Admin calls need an admin-role session; a user session gets a clear
    /// error instead of an opaque server rejection.
    fn require_admin(&self) -> Result<()> {
        match self.store.load()? {
            Some(session) if session.is_admin() => Ok(()),
            Some(_) => Err(Error::validation(
                "Admin session required. Run 'vb admin login' first.",
            )),
            None => Err(Error::NotLoggedIn),
        }
    }
}

fn ack_message(body: &JsonValue, fallback: &str) -> String {
    body.get("message")
        .and_then(|v| v.as_str())
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemorySessionStore;

    fn service_with(session: Option<Session>) -> AdminService {
        let store = Arc::new(MemorySessionStore::new());
        if let Some(s) = &session {
            store.save(s).unwrap();
        }
        let api = Arc::new(ApiClient::new("http://127.0.0.1:1", store.clone()).unwrap());
        AdminService::new(api, store)
    }

    #[test]
    fn test_require_admin_rejects_user_session() {
        let mut user = Session::new("tok", Role::User);
        user.username = "alice".to_string();
        let service = service_with(Some(user));

        let err = service.require_admin().unwrap_err();
        assert!(err.to_string().contains("Admin session required"));
    }

    #[test]
    fn test_require_admin_rejects_logged_out() {
        let service = service_with(None);
        assert!(matches!(
            service.require_admin().unwrap_err(),
            Error::NotLoggedIn
        ));
    }

    #[test]
    fn test_require_admin_accepts_admin_session() {
        let service = service_with(Some(Session::new("tok", Role::Admin)));
        assert!(service.require_admin().is_ok());
    }

    #[test]
    fn test_ack_message_prefers_server_text() {
        assert_eq!(
            ack_message(&json!({"message": "done"}), "fallback"),
            "done"
        );
        assert_eq!(ack_message(&json!({}), "fallback"), "fallback");
    }
}
