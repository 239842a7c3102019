//! Transaction domain model
//!
//! Transactions are sourced read-only from the server. The API has shipped
//! two wire shapes over time: a `{from_account, to_account}` pair and an
//! older `{type, related_account}` form. `TransactionRecord` tolerates both
//! and the client derives a display kind and signed display amount locally.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Client-derived classification of a transaction, used only for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    TransferIn,
    TransferOut,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::TransferIn => "transfer-in",
            Self::TransferOut => "transfer-out",
        }
    }

    /// Incoming kinds render with a positive display amount
    pub fn is_incoming(&self) -> bool {
        matches!(self, Self::Deposit | Self::TransferIn)
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::TransferIn | Self::TransferOut)
    }

    /// Parse a user-supplied or server-supplied type name
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "deposit" => Some(Self::Deposit),
            "withdraw" | "withdrawal" => Some(Self::Withdraw),
            "transfer-in" | "transfer_in" | "transfer_received" => Some(Self::TransferIn),
            "transfer-out" | "transfer_out" | "transfer_sent" => Some(Self::TransferOut),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single transaction as returned by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "fromAccount", alias = "from", alias = "sender_account")]
    pub from_account: Option<String>,
    #[serde(default, alias = "toAccount", alias = "to", alias = "recipient_account")]
    pub to_account: Option<String>,
    /// Raw server type (`deposit`, `withdrawal`, `transfer_sent`, ...)
    #[serde(default, rename = "type", alias = "transaction_type")]
    pub raw_type: Option<String>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub balance_after: Option<Decimal>,
    #[serde(default)]
    pub related_account: Option<String>,
}

impl TransactionRecord {
    /// Classify this transaction relative to the viewing account.
    ///
    /// Precedence: endpoint comparison when both endpoints are present,
    /// then the server's raw type, then keyword/sign heuristics.
    pub fn infer_kind(&self, current_account: &str) -> TransactionKind {
        let me = normalize_account(current_account);

        if let (Some(from), Some(to)) = (&self.from_account, &self.to_account) {
            if !me.is_empty() {
                if normalize_account(from) == me {
                    return TransactionKind::TransferOut;
                }
                if normalize_account(to) == me {
                    return TransactionKind::TransferIn;
                }
            }
        }

        if let Some(kind) = self.raw_type.as_deref().and_then(TransactionKind::parse) {
            return kind;
        }

        let description = self
            .description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        if description.contains("deposit") || self.amount > Decimal::ZERO {
            return TransactionKind::Deposit;
        }
        if description.contains("withdraw") || self.amount < Decimal::ZERO {
            return TransactionKind::Withdraw;
        }
        if self.amount >= Decimal::ZERO {
            TransactionKind::Deposit
        } else {
            TransactionKind::Withdraw
        }
    }

    /// Signed display amount: magnitude of `amount`, positive for incoming
    /// kinds, negative for outgoing ones.
    pub fn display_amount(&self, kind: TransactionKind) -> Decimal {
        let magnitude = self.amount.abs();
        if kind.is_incoming() {
            magnitude
        } else {
            -magnitude
        }
    }

    /// Effective timestamp: prefer `timestamp`, fall back to `date`, then
    /// `created_at`. `None` when all three are absent or unparseable.
    pub fn effective_timestamp(&self) -> Option<NaiveDateTime> {
        [&self.timestamp, &self.date, &self.created_at]
            .into_iter()
            .flatten()
            .find_map(|raw| parse_timestamp(raw))
    }
}

/// Strip separator characters from an account number and upper-case it so
/// `ABCD-1234` and `abcd1234` compare equal.
pub fn normalize_account(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}

/// Parse the timestamp formats the server has been observed to emit:
/// RFC 3339, SQL datetime, and bare dates.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}
