//! Core domain entities
//!
//! Pure data structures with derivation and validation logic - no I/O or
//! external dependencies.

pub mod admin;
pub mod result;
mod session;
mod transaction;
mod user;

pub use admin::{
    AdminSettings, AdminTransaction, AdminUser, DashboardMetrics, SecurityLogEntry,
};
pub use session::{Role, Session};
pub use transaction::{normalize_account, TransactionKind, TransactionRecord};
pub use user::{BalanceInfo, Profile, Recipient};
