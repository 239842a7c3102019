//! Account operations: balance, deposit, withdraw, transfer
//!
//! All money handling happens server-side; this service only guards
//! obviously invalid input before submission and relays the server's
//! answers.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::adapters::{ApiClient, Auth};
use crate::domain::result::{Error, Result};
use crate::domain::{normalize_account, BalanceInfo, Recipient};

/// Upper bound the original client enforced on a single operation
const MAX_AMOUNT: i64 = 1_000_000;

/// Minimum significant characters before a recipient lookup fires
const MIN_ACCOUNT_CHARS: usize = 5;

/// Server acknowledgment of a mutating operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationReceipt {
    #[serde(default)]
    pub message: String,
    pub new_balance: Decimal,
}

/// Fail-fast amount check: positive, bounded, at most two decimal places
pub fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::validation(
            "Please enter a valid amount greater than 0",
        ));
    }
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(Error::validation("Amount exceeds maximum limit"));
    }
    if amount.normalize().scale() > 2 {
        return Err(Error::validation(
            "Amount can have at most 2 decimal places",
        ));
    }
    Ok(())
}

pub struct AccountService {
    api: Arc<ApiClient>,
}

impl AccountService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub fn balance(&self) -> Result<BalanceInfo> {
        let body = self.api.get("/balance", Auth::Bearer)?;
        Ok(serde_json::from_value(body)?)
    }

    pub fn deposit(&self, amount: Decimal) -> Result<OperationReceipt> {
        validate_amount(amount)?;
        let body = self.api.post_form(
            "/deposit",
            &[("amount", &format_amount(amount))],
            Auth::Bearer,
        )?;
        Ok(serde_json::from_value(body)?)
    }

    pub fn withdraw(&self, amount: Decimal) -> Result<OperationReceipt> {
        validate_amount(amount)?;
        let body = self.api.post_form(
            "/withdraw",
            &[("amount", &format_amount(amount))],
            Auth::Bearer,
        )?;
        Ok(serde_json::from_value(body)?)
    }

    /// Resolve an account number to its holder. `Ok(None)` means the
    /// server answered 404 (no such account); short inputs fail fast
    /// before any network call.
    pub fn lookup_recipient(&self, account_number: &str) -> Result<Option<Recipient>> {
        let normalized = normalize_account(account_number);
        if normalized.len() < MIN_ACCOUNT_CHARS {
            return Err(Error::validation("Account number too short"));
        }

        match self.api.get(&format!("/users/{normalized}"), Auth::Bearer) {
            Ok(body) => Ok(Some(serde_json::from_value(body)?)),
            Err(Error::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Move money to a previously looked-up recipient. Transferring to
    /// your own account is rejected before submission; everything else
    /// (insufficient funds, vanished recipient) is the server's call.
    pub fn transfer(
        &self,
        amount: Decimal,
        recipient: &Recipient,
        own_account: &str,
    ) -> Result<OperationReceipt> {
        validate_amount(amount)?;
        if normalize_account(&recipient.account_number) == normalize_account(own_account) {
            return Err(Error::validation(
                "You cannot transfer funds to your own account",
            ));
        }

        let body = self.api.post_form(
            "/transfer",
            &[
                ("amount", &format_amount(amount)),
                ("to_account_number", &recipient.account_number),
            ],
            Auth::Bearer,
        )?;
        Ok(serde_json::from_value(body)?)
    }
}

fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_amount_bounds() {
        assert!(validate_amount(Decimal::from_str("0.01").unwrap()).is_ok());
        assert!(validate_amount(Decimal::from(1_000_000)).is_ok());

        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(Decimal::from(-5)).is_err());
        assert!(validate_amount(Decimal::from(1_000_001)).is_err());
    }

    #[test]
    fn test_validate_amount_decimal_places() {
        assert!(validate_amount(Decimal::from_str("10.25").unwrap()).is_ok());
        assert!(validate_amount(Decimal::from_str("10.255").unwrap()).is_err());
        // Trailing zeros don't count as extra places
        assert!(validate_amount(Decimal::from_str("10.2500").unwrap()).is_ok());
    }

    #[test]
    fn test_format_amount_two_places() {
        assert_eq!(format_amount(Decimal::from(50)), "50.00");
        assert_eq!(format_amount(Decimal::from_str("12.5").unwrap()), "12.50");
    }
}
