//! Admin-panel projections
//!
//! Read/write views used only by the elevated admin surface. Mutations are
//! requested against the server and never applied to these values locally;
//! callers re-fetch after every mutation.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// Server ids have shipped as both numbers and strings; accept either.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => s,
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    })
}

/// A user as listed in the admin panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub two_factor_enabled: bool,
    #[serde(default)]
    pub failed_attempts: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub last_ip: Option<String>,
}

/// A transaction as listed in the admin panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminTransaction {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, alias = "sender_username")]
    pub from_account: Option<String>,
    #[serde(default, alias = "recipient_username")]
    pub to_account: Option<String>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default, alias = "type")]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_flagged: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One row of the security event log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityLogEntry {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
}

/// Aggregates shown on the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetrics {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub active_sessions: u64,
    #[serde(default)]
    pub today_transactions: u64,
    #[serde(default)]
    pub failed_logins_24h: u64,
    #[serde(default)]
    pub user_trend: Option<i64>,
    #[serde(default)]
    pub session_status: Option<String>,
    #[serde(default)]
    pub transaction_total: Option<Decimal>,
    #[serde(default)]
    pub blocked_attempts: Option<u64>,
}

/// Server-side security settings managed from the admin panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSettings {
    pub max_attempts: u32,
    pub lock_duration: u32,
    pub enable_2fa: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_accepts_numbers_and_strings() {
        let numeric: AdminUser =
            serde_json::from_str(r#"{"id": 7, "username": "alice"}"#).unwrap();
        assert_eq!(numeric.id, "7");

        let string: AdminUser =
            serde_json::from_str(r#"{"id": "alice", "username": "alice"}"#).unwrap();
        assert_eq!(string.id, "alice");
    }

    #[test]
    fn test_admin_transaction_username_aliases() {
        let tx: AdminTransaction = serde_json::from_str(
            r#"{"id": 1, "sender_username": "alice", "recipient_username": "bob",
                "amount": 12.5, "type": "transfer", "is_flagged": true}"#,
        )
        .unwrap();
        assert_eq!(tx.from_account.as_deref(), Some("alice"));
        assert_eq!(tx.to_account.as_deref(), Some("bob"));
        assert!(tx.is_flagged);
    }
}
