//! VaultBank Core - client logic for the VaultBank terminal client
//!
//! This crate implements the client side of the banking API following
//! hexagonal architecture:
//!
//! - **domain**: Core entities (Session, TransactionRecord, admin views)
//! - **ports**: Trait definitions for external dependencies (SessionStore)
//! - **services**: Client flows (auth, 2FA, account ops, history, admin)
//! - **adapters**: Concrete implementations (file session store, HTTP
//!   gateway)
//!
//! All balances, transfers, and 2FA verification live on the remote
//! server; this crate caches session state, guards obviously invalid
//! input, and renders the server's answers.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::{ApiClient, FileSessionStore};
use config::Config;
use ports::SessionStore;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{
    Role, Session, TransactionKind, TransactionRecord,
};

/// Main context for VaultBank client operations
///
/// The primary entry point for all client logic. It owns the session
/// store, the API gateway, and all services, so frontends never touch
/// ambient global state.
pub struct BankContext {
    pub config: Config,
    pub session_store: Arc<dyn SessionStore>,
    pub api: Arc<ApiClient>,
    pub auth_service: AuthService,
    pub two_factor_service: TwoFactorService,
    pub account_service: AccountService,
    pub history_service: HistoryService,
    pub admin_service: AdminService,
}

impl BankContext {
    /// Create a context backed by the file session store in `app_dir`
    pub fn new(app_dir: &Path) -> Result<Self> {
        let config = Config::load(app_dir)?;
        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(app_dir));
        Self::with_store(config, store)
    }

    /// Create a context over any session store (tests use the in-memory
    /// adapter)
    pub fn with_store(config: Config, store: Arc<dyn SessionStore>) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config.api_base_url, Arc::clone(&store))?);

        let auth_service = AuthService::new(Arc::clone(&api), Arc::clone(&store));
        let two_factor_service = TwoFactorService::new(Arc::clone(&api));
        let account_service = AccountService::new(Arc::clone(&api));
        let history_service = HistoryService::new(Arc::clone(&api), Arc::clone(&store));
        let admin_service = AdminService::new(Arc::clone(&api), Arc::clone(&store));

        Ok(Self {
            config,
            session_store: store,
            api,
            auth_service,
            two_factor_service,
            account_service,
            history_service,
            admin_service,
        })
    }

    /// The active session, as every authenticated view reads it. Absent
    /// means "go log in" before any other page logic runs.
    pub fn current_session(&self) -> Result<Session, Error> {
        self.session_store.load()?.ok_or(Error::NotLoggedIn)
    }
}
