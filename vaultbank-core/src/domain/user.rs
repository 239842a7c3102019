//! User-facing profile and account projections

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Profile returned by `GET /users/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub account_number: String,
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub has_2fa: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

/// Recipient resolved through the account-number lookup endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub username: String,
    pub account_number: String,
}

/// Balance snapshot returned by `GET /balance`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceInfo {
    pub username: String,
    pub balance: Decimal,
    pub account_number: String,
}
