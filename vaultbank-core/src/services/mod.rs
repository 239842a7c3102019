//! Service layer - client flows and view logic
//!
//! Services coordinate the gateway, session store, and domain logic. Each
//! service covers one surface of the client: auth, 2FA, account
//! operations, transaction history, the admin panel, and the ambient
//! concerns (inactivity, event logging).

mod account;
mod activity;
mod admin;
mod auth;
mod history;
pub mod logging;
mod twofactor;

pub use account::{validate_amount, AccountService, OperationReceipt};
pub use activity::{InactivityMonitor, MonitorState};
pub use admin::AdminService;
pub use auth::{is_otp_challenge, AuthService, LoginOutcome, PendingLogin};
pub use history::{
    HistoryEntry, HistoryFilter, HistoryService, HistoryStats, HistoryView, KindFilter,
};
pub use logging::{LogEvent, LoggingService};
pub use twofactor::{
    validate_otp, PendingEnrollment, TwoFactorService, TwoFactorStatus,
};
