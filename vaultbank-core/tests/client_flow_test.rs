//! Integration tests for vaultbank-core client flows
//!
//! These exercise the flows end-to-end against wire-shaped JSON and real
//! files; network IO stays out (HTTP interpretation is covered by unit
//! tests at the gateway boundary).

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use vaultbank_core::adapters::{FileSessionStore, MemorySessionStore};
use vaultbank_core::config::Config;
use vaultbank_core::domain::{Role, Session, TransactionKind, TransactionRecord};
use vaultbank_core::ports::SessionStore;
use vaultbank_core::services::{
    HistoryFilter, HistoryView, InactivityMonitor, KindFilter, MonitorState,
};
use vaultbank_core::BankContext;

// ============================================================================
// Test Helpers
// ============================================================================

fn wire_transactions() -> Vec<TransactionRecord> {
    // The exact rows the server's two wire revisions produce
    serde_json::from_str(
        r#"[
            {"id": "tx_1", "type": "deposit", "amount": 100.0,
             "description": "Deposit: $100.00", "balance_after": 100.0,
             "timestamp": "2025-06-10 09:15:00"},
            {"id": "tx_2", "type": "withdrawal", "amount": 30.0,
             "description": "Withdrawal: $30.00", "balance_after": 70.0,
             "timestamp": "2025-06-11 14:00:00"},
            {"id": "tx_3", "from_account": "AAAA-1111", "to_account": "BBBB-2222",
             "amount": 25.0, "description": "Transfer to BBBB-2222",
             "balance_after": 45.0, "timestamp": "2025-06-12 10:30:00"},
            {"id": "tx_4", "from_account": "CCCC-3333", "to_account": "AAAA-1111",
             "amount": 50.0, "description": "Transfer from CCCC-3333",
             "timestamp": "2025-06-13 16:45:00"}
        ]"#,
    )
    .unwrap()
}

fn view() -> HistoryView {
    HistoryView::new(wire_transactions(), "AAAA-1111".to_string(), 10)
}

fn now() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

// ============================================================================
// Transaction history over wire data
// ============================================================================

#[test]
fn test_transfer_direction_inferred_from_endpoints() {
    let view = view();
    let entries = view.filtered(now());

    let outgoing = entries.iter().find(|e| e.record.id == "tx_3").unwrap();
    assert_eq!(outgoing.kind, TransactionKind::TransferOut);
    assert_eq!(outgoing.display_amount, Decimal::new(-2500, 2));

    let incoming = entries.iter().find(|e| e.record.id == "tx_4").unwrap();
    assert_eq!(incoming.kind, TransactionKind::TransferIn);
    assert_eq!(incoming.display_amount, Decimal::new(5000, 2));
}

#[test]
fn test_sign_always_agrees_with_kind() {
    let view = view();
    for entry in view.filtered(now()) {
        if entry.kind.is_incoming() {
            assert!(entry.display_amount >= Decimal::ZERO, "{}", entry.record.id);
        } else {
            assert!(entry.display_amount <= Decimal::ZERO, "{}", entry.record.id);
        }
    }
}

#[test]
fn test_filter_pipeline_and_stats() {
    let mut view = view();
    view.set_filter(HistoryFilter {
        kind: KindFilter::All,
        period_days: Some(30),
        search: "transfer".to_string(),
    });

    let entries = view.filtered(now());
    assert_eq!(entries.len(), 2);

    let stats = view.stats(now());
    assert_eq!(stats.total_deposits, Decimal::ZERO);
    assert_eq!(stats.total_transfers, Decimal::new(7500, 2));
    assert_eq!(stats.net_change, Decimal::new(2500, 2));
}

#[test]
fn test_csv_export_of_filtered_set() {
    let mut view = view();
    view.set_filter(HistoryFilter {
        kind: KindFilter::Only(TransactionKind::Deposit),
        ..Default::default()
    });

    let csv = view.export_csv(now()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2, "header plus the one deposit");
    assert_eq!(lines[0], "date,type,description,amount,balance_after");
    assert_eq!(
        lines[1],
        "2025-06-10 09:15:00,DEPOSIT,Deposit: $100.00,100.00,100.00"
    );
}

// ============================================================================
// Session lifecycle
// ============================================================================

#[test]
fn test_session_survives_context_restart() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(dir.path());

    let mut session = Session::new("tok-abc", Role::User);
    session.username = "alice".to_string();
    session.account_number = "AAAA-1111".to_string();
    store.save(&session).unwrap();

    // A fresh context over the same directory sees the same session
    let ctx = BankContext::new(dir.path()).unwrap();
    let loaded = ctx.current_session().unwrap();
    assert_eq!(loaded, session);

    ctx.session_store.clear().unwrap();
    assert!(ctx.current_session().is_err());
}

#[test]
fn test_logged_out_context_guards_views() {
    let config = Config::default();
    let ctx = BankContext::with_store(config, Arc::new(MemorySessionStore::new())).unwrap();

    // The guard runs before any page logic: no session, no history fetch
    assert!(ctx.current_session().is_err());
    assert!(ctx.history_service.load(10).is_err());
}

#[test]
fn test_admin_session_replaces_user_session() {
    let store = MemorySessionStore::new();

    let mut user = Session::new("tok-user", Role::User);
    user.username = "alice".to_string();
    store.save(&user).unwrap();

    let admin = Session::new("tok-admin", Role::Admin);
    store.save(&admin).unwrap();

    // Last writer wins; only one identity is ever active
    let active = store.load().unwrap().unwrap();
    assert!(active.is_admin());
    assert_eq!(active.token, "tok-admin");
}

// ============================================================================
// Inactivity monitor
// ============================================================================

#[test]
fn test_inactivity_flow_prompt_and_logout() {
    let store = MemorySessionStore::new();
    store.save(&Session::new("tok", Role::User)).unwrap();

    let timeout = Duration::from_secs(15 * 60);
    let start = Instant::now();
    let mut monitor = InactivityMonitor::new(timeout, start);

    // Activity keeps the session alive
    let mid = start + Duration::from_secs(10 * 60);
    monitor.record_activity(mid);
    assert!(matches!(
        monitor.poll(start + Duration::from_secs(14 * 60)),
        MonitorState::Armed { .. }
    ));

    // Expiry with the user declining to continue clears the session
    let expired_at = mid + timeout;
    assert_eq!(monitor.poll(expired_at), MonitorState::Expired);
    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
}
