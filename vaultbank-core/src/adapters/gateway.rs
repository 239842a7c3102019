//! Banking API gateway
//!
//! Thin wrapper around the remote banking API. All requests share one
//! blocking HTTP client with a 30-second timeout. Responses are reduced to
//! a uniform result: 401 on an authenticated call clears the session store
//! and short-circuits to `Error::SessionExpired`, transport failures map to
//! user-friendly `Error::Network` messages, and all other non-2xx replies
//! surface the server's `detail` field for domain-specific handling.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value as JsonValue;
use url::Url;

use crate::domain::result::{Error, Result};
use crate::ports::SessionStore;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Authentication mode for a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Send the stored session token as a bearer header
    Bearer,
    /// Login/signup endpoints are called without credentials; a 401 from
    /// them is a domain reply, not session expiry
    Anonymous,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, store: Arc<dyn SessionStore>) -> Result<Self> {
        // Parse to validate, keep the string form for path concatenation
        Url::parse(base_url)
            .map_err(|_| Error::config(format!("invalid API base URL: {base_url}")))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            store,
        })
    }

    pub fn get(&self, path: &str, auth: Auth) -> Result<JsonValue> {
        self.dispatch(self.http.get(self.endpoint(path)), auth)
    }

    /// POST with an `application/x-www-form-urlencoded` body. All mutating
    /// endpoints other than the admin surface take form bodies.
    pub fn post_form(&self, path: &str, fields: &[(&str, &str)], auth: Auth) -> Result<JsonValue> {
        self.dispatch(self.http.post(self.endpoint(path)).form(fields), auth)
    }

    /// POST with a JSON body (admin surface)
    pub fn post_json(&self, path: &str, body: &JsonValue, auth: Auth) -> Result<JsonValue> {
        self.dispatch(self.http.post(self.endpoint(path)).json(body), auth)
    }

    /// POST with no body; parameters ride in the path's query string
    pub fn post(&self, path: &str, auth: Auth) -> Result<JsonValue> {
        self.dispatch(self.http.post(self.endpoint(path)), auth)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn dispatch(&self, request: RequestBuilder, auth: Auth) -> Result<JsonValue> {
        let request = match auth {
            Auth::Bearer => {
                let session = self.store.load()?.ok_or(Error::NotLoggedIn)?;
                request.bearer_auth(session.token)
            }
            Auth::Anonymous => request,
        };

        let response = request.send().map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();

        if status == 401 && auth == Auth::Bearer {
            // Expired or revoked token. Drop the session before reporting
            // so every view sees "logged out" from here on.
            self.store.clear()?;
            return Err(Error::SessionExpired);
        }

        interpret_response(status, &body)
    }
}

/// Reduce a response to the caller-facing result. Pure so the status/body
/// handling is testable without a live server.
fn interpret_response(status: u16, body: &str) -> Result<JsonValue> {
    let json: JsonValue = serde_json::from_str(body).unwrap_or(JsonValue::Null);

    if (200..300).contains(&status) {
        return Ok(json);
    }

    Err(Error::api(status, extract_detail(&json, status)))
}

/// Server rejections carry the reason in a `detail` field. FastAPI-style
/// validation errors arrive as a list of `{msg}` objects instead.
fn extract_detail(body: &JsonValue, status: u16) -> String {
    match body.get("detail") {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                format!("Request failed: HTTP {status}")
            } else {
                msgs.join("; ")
            }
        }
        _ => format!("Request failed: HTTP {status}"),
    }
}

/// Map transport errors to user-friendly messages
fn map_transport_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Network(format!(
            "Connection timed out after {REQUEST_TIMEOUT_SECS} seconds"
        ))
    } else if error.is_connect() {
        Error::Network("Unable to reach the banking server. Please check your connection.".to_string())
    } else {
        Error::Network(format!("Request failed: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemorySessionStore;

    #[test]
    fn test_endpoint_joins_cleanly() {
        let store = Arc::new(MemorySessionStore::new());
        let client = ApiClient::new("http://127.0.0.1:8000/", store).unwrap();
        assert_eq!(
            client.endpoint("/transactions"),
            "http://127.0.0.1:8000/transactions"
        );
        assert_eq!(
            client.endpoint("admin/users/recent?limit=5"),
            "http://127.0.0.1:8000/admin/users/recent?limit=5"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let store = Arc::new(MemorySessionStore::new());
        assert!(ApiClient::new("not a url", store).is_err());
    }

    #[test]
    fn test_success_parses_json_body() {
        let body = r#"{"balance": 42.5}"#;
        let json = interpret_response(200, body).unwrap();
        assert_eq!(json["balance"].as_f64(), Some(42.5));
    }

    #[test]
    fn test_rejection_surfaces_detail_verbatim() {
        let err = interpret_response(400, r#"{"detail": "Insufficient funds"}"#).unwrap_err();
        match err {
            Error::Api { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "Insufficient funds");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_list_details_are_joined() {
        let body = r#"{"detail": [{"msg": "field required"}, {"msg": "value too short"}]}"#;
        let err = interpret_response(422, body).unwrap_err();
        assert_eq!(err.to_string(), "field required; value too short");
    }

    #[test]
    fn test_empty_body_rejection_reports_status() {
        let err = interpret_response(500, "").unwrap_err();
        assert_eq!(err.to_string(), "Request failed: HTTP 500");
    }

    #[test]
    fn test_anonymous_401_is_a_domain_reply() {
        // The login endpoint answers 401 both for bad credentials and the
        // "2FA required" step-up marker; neither is session expiry.
        let err = interpret_response(401, r#"{"detail": "2FA required"}"#).unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "2FA required");
    }
}
