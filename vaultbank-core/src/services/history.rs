//! Transaction history view
//!
//! Fetches the account's transaction list once and derives everything else
//! locally: per-transaction kind and signed display amount, a filtered
//! projection (type, period, search), fixed-size pagination, aggregate
//! stats, and CSV export. The fetched list is never mutated; filtering
//! only changes which slice of it is projected, so re-applying the same
//! filter always yields the same result.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::adapters::{ApiClient, Auth};
use crate::domain::result::{Error, Result};
use crate::domain::{TransactionKind, TransactionRecord};
use crate::ports::SessionStore;

/// Type filter: everything, or exactly one display kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    Only(TransactionKind),
}

/// Conjunction of the three filter dimensions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    pub kind: KindFilter,
    /// Keep transactions newer than `now - days`; `None` means all time
    pub period_days: Option<i64>,
    /// Case-insensitive substring match against description or the raw
    /// amount string; empty matches everything
    pub search: String,
}

/// A transaction projected for display
#[derive(Debug, Clone)]
pub struct HistoryEntry<'a> {
    pub record: &'a TransactionRecord,
    pub kind: TransactionKind,
    pub display_amount: Decimal,
}

/// Aggregates over the currently filtered set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub total_transfers: Decimal,
    pub net_change: Decimal,
}

pub struct HistoryService {
    api: Arc<ApiClient>,
    store: Arc<dyn SessionStore>,
}

impl HistoryService {
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn SessionStore>) -> Self {
        Self { api, store }
    }

    /// Fetch the full transaction list for the authenticated account
    pub fn load(&self, page_size: usize) -> Result<HistoryView> {
        let session = self.store.load()?.ok_or(Error::NotLoggedIn)?;
        let body = self.api.get("/transactions", Auth::Bearer)?;

        let raw = body
            .get("transactions")
            .cloned()
            .unwrap_or(JsonValue::Array(Vec::new()));
        let transactions: Vec<TransactionRecord> = serde_json::from_value(raw)?;

        Ok(HistoryView::new(
            transactions,
            session.account_number,
            page_size,
        ))
    }
}

pub struct HistoryView {
    /// Sorted newest-first at construction; read-only afterwards
    transactions: Vec<TransactionRecord>,
    account_number: String,
    filter: HistoryFilter,
    /// 1-based, always within [1, total_pages]
    page: usize,
    page_size: usize,
}

impl HistoryView {
    pub fn new(
        mut transactions: Vec<TransactionRecord>,
        account_number: String,
        page_size: usize,
    ) -> Self {
        // Newest first; undated records sink to the end
        transactions.sort_by(|a, b| {
            b.effective_timestamp()
                .cmp(&a.effective_timestamp())
        });

        Self {
            transactions,
            account_number,
            filter: HistoryFilter::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn filter(&self) -> &HistoryFilter {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_fetched(&self) -> usize {
        self.transactions.len()
    }

    /// Replace the filter. Any actual change resets pagination to page 1.
    pub fn set_filter(&mut self, filter: HistoryFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.page = 1;
        }
    }

    /// The filtered projection, newest first. Pure with respect to the
    /// fetched list.
    pub fn filtered(&self, now: NaiveDateTime) -> Vec<HistoryEntry<'_>> {
        let cutoff = self.filter.period_days.map(|days| now - Duration::days(days));
        let term = self.filter.search.trim().to_lowercase();

        self.transactions
            .iter()
            .map(|record| {
                let kind = record.infer_kind(&self.account_number);
                HistoryEntry {
                    record,
                    kind,
                    display_amount: record.display_amount(kind),
                }
            })
            .filter(|entry| match self.filter.kind {
                KindFilter::All => true,
                KindFilter::Only(kind) => entry.kind == kind,
            })
            .filter(|entry| match cutoff {
                None => true,
                // No timestamp cannot satisfy "newer than the cutoff"
                Some(cutoff) => entry
                    .record
                    .effective_timestamp()
                    .is_some_and(|ts| ts >= cutoff),
            })
            .filter(|entry| {
                if term.is_empty() {
                    return true;
                }
                let description = entry
                    .record
                    .description
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase();
                description.contains(&term)
                    || entry.record.amount.to_string().to_lowercase().contains(&term)
            })
            .collect()
    }

    pub fn total_pages(&self, now: NaiveDateTime) -> usize {
        let count = self.filtered(now).len();
        count.div_ceil(self.page_size).max(1)
    }

    /// Navigate to a page, clamped to the valid range
    pub fn go_to_page(&mut self, page: usize, now: NaiveDateTime) {
        self.page = page.clamp(1, self.total_pages(now));
    }

    pub fn next_page(&mut self, now: NaiveDateTime) {
        self.go_to_page(self.page + 1, now);
    }

    pub fn prev_page(&mut self, now: NaiveDateTime) {
        self.go_to_page(self.page.saturating_sub(1), now);
    }

    /// The current page's window of the filtered projection. Empty when
    /// nothing matches; never panics at the boundaries.
    pub fn page_entries(&self, now: NaiveDateTime) -> Vec<HistoryEntry<'_>> {
        let filtered = self.filtered(now);
        let page = self.page.clamp(1, self.total_pages(now));
        let start = (page - 1) * self.page_size;
        filtered
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect()
    }

    /// Aggregates over the filtered set, not the full fetch
    pub fn stats(&self, now: NaiveDateTime) -> HistoryStats {
        let mut stats = HistoryStats {
            total_deposits: Decimal::ZERO,
            total_withdrawals: Decimal::ZERO,
            total_transfers: Decimal::ZERO,
            net_change: Decimal::ZERO,
        };

        for entry in self.filtered(now) {
            let magnitude = entry.display_amount.abs();
            match entry.kind {
                TransactionKind::Deposit => stats.total_deposits += magnitude,
                TransactionKind::Withdraw => stats.total_withdrawals += magnitude,
                TransactionKind::TransferIn | TransactionKind::TransferOut => {
                    stats.total_transfers += magnitude
                }
            }
            stats.net_change += entry.display_amount;
        }

        stats
    }

    /// Serialize the filtered set as CSV. Exporting nothing is an error so
    /// the frontend can tell the user instead of producing an empty file.
    pub fn export_csv(&self, now: NaiveDateTime) -> Result<String> {
        let filtered = self.filtered(now);
        if filtered.is_empty() {
            return Err(Error::validation("No transactions to export"));
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["date", "type", "description", "amount", "balance_after"])?;

        for entry in filtered {
            let date = entry
                .record
                .effective_timestamp()
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            let kind = entry.kind.label().to_uppercase();
            let amount = format!("{:.2}", entry.display_amount);
            let balance_after = entry
                .record
                .balance_after
                .map(|b| format!("{:.2}", b))
                .unwrap_or_default();

            writer.write_record([
                date.as_str(),
                kind.as_str(),
                entry.record.description.as_deref().unwrap_or_default(),
                amount.as_str(),
                balance_after.as_str(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::validation(format!("CSV serialization failed: {e}")))?;
        String::from_utf8(bytes).map_err(|e| Error::validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn tx(
        id: &str,
        amount: i64,
        raw_type: Option<&str>,
        description: Option<&str>,
        timestamp: Option<&str>,
    ) -> TransactionRecord {
        TransactionRecord {
            id: id.to_string(),
            from_account: None,
            to_account: None,
            raw_type: raw_type.map(str::to_string),
            amount: Decimal::new(amount, 2),
            description: description.map(str::to_string),
            timestamp: timestamp.map(str::to_string),
            date: None,
            created_at: None,
            balance_after: None,
            related_account: None,
        }
    }

    fn sample_view() -> HistoryView {
        let transactions = vec![
            tx("t1", 10000, Some("deposit"), Some("Payroll"), Some("2025-06-14 09:00:00")),
            tx("t2", 2500, Some("withdrawal"), Some("ATM withdrawal"), Some("2025-06-13 18:30:00")),
            tx("t3", 5000, Some("transfer_sent"), Some("Transfer to BBBB"), Some("2025-06-01 10:00:00")),
            tx("t4", 7500, Some("transfer_received"), Some("Transfer from CCCC"), Some("2025-05-01 10:00:00")),
            tx("t5", 300, Some("deposit"), Some("Interest"), Some("2024-12-31 00:00:00")),
        ];
        HistoryView::new(transactions, "AAAA1111".to_string(), 2)
    }

    #[test]
    fn test_sorted_newest_first() {
        let view = sample_view();
        let all = view.filtered(now());
        let ids: Vec<&str> = all.iter().map(|e| e.record.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3", "t4", "t5"]);
    }

    #[test]
    fn test_undated_records_sort_last() {
        let transactions = vec![
            tx("undated", 100, Some("deposit"), None, None),
            tx("dated", 100, Some("deposit"), None, Some("2025-01-01 00:00:00")),
        ];
        let view = HistoryView::new(transactions, "A".to_string(), 10);
        let ids: Vec<&str> = view
            .filtered(now())
            .iter()
            .map(|e| e.record.id.as_str())
            .collect();
        assert_eq!(ids, vec!["dated", "undated"]);
    }

    #[test]
    fn test_kind_filter() {
        let mut view = sample_view();
        view.set_filter(HistoryFilter {
            kind: KindFilter::Only(TransactionKind::Deposit),
            ..Default::default()
        });
        let filtered = view.filtered(now());
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|e| e.kind == TransactionKind::Deposit));
    }

    #[test]
    fn test_period_filter_excludes_old_and_undated() {
        let mut view = sample_view();
        view.set_filter(HistoryFilter {
            period_days: Some(30),
            ..Default::default()
        });
        let ids: Vec<&str> = view
            .filtered(now())
            .iter()
            .map(|e| e.record.id.as_str())
            .collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_search_matches_description_or_amount() {
        let mut view = sample_view();
        view.set_filter(HistoryFilter {
            search: "transfer".to_string(),
            ..Default::default()
        });
        assert_eq!(view.filtered(now()).len(), 2);

        view.set_filter(HistoryFilter {
            search: "25".to_string(),
            ..Default::default()
        });
        // Matches the raw amount string "25.00"
        assert_eq!(view.filtered(now()).len(), 1);
        assert_eq!(view.filtered(now())[0].record.id, "t2");
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let mut view = sample_view();
        let filter = HistoryFilter {
            kind: KindFilter::Only(TransactionKind::Deposit),
            period_days: Some(365),
            search: "p".to_string(),
        };
        view.set_filter(filter.clone());
        let first: Vec<String> = view
            .filtered(now())
            .iter()
            .map(|e| e.record.id.clone())
            .collect();

        view.set_filter(filter);
        let second: Vec<String> = view
            .filtered(now())
            .iter()
            .map(|e| e.record.id.clone())
            .collect();

        assert_eq!(first, second);
        assert_eq!(view.total_fetched(), 5, "source list is never mutated");
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut view = sample_view();
        view.next_page(now());
        assert_eq!(view.page(), 2);

        view.set_filter(HistoryFilter {
            search: "transfer".to_string(),
            ..Default::default()
        });
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_pagination_partitions_without_overlap() {
        let mut view = sample_view();
        let mut seen = Vec::new();
        for page in 1..=view.total_pages(now()) {
            view.go_to_page(page, now());
            for entry in view.page_entries(now()) {
                seen.push(entry.record.id.clone());
            }
        }
        assert_eq!(seen, vec!["t1", "t2", "t3", "t4", "t5"]);
    }

    #[test]
    fn test_pagination_clamps_navigation() {
        let mut view = sample_view();
        view.go_to_page(99, now());
        assert_eq!(view.page(), 3);
        view.prev_page(now());
        assert_eq!(view.page(), 2);
        view.go_to_page(0, now());
        assert_eq!(view.page(), 1);
        view.prev_page(now());
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_empty_filtered_list_renders_empty_page() {
        let mut view = sample_view();
        view.set_filter(HistoryFilter {
            search: "no such transaction".to_string(),
            ..Default::default()
        });
        assert_eq!(view.total_pages(now()), 1);
        assert!(view.page_entries(now()).is_empty());
    }

    #[test]
    fn test_stats_cover_filtered_set_only() {
        let mut view = sample_view();
        let all = view.stats(now());
        assert_eq!(all.total_deposits, Decimal::new(10300, 2));
        assert_eq!(all.total_withdrawals, Decimal::new(2500, 2));
        assert_eq!(all.total_transfers, Decimal::new(12500, 2));
        // +103.00 - 25.00 - 50.00 + 75.00
        assert_eq!(all.net_change, Decimal::new(10300, 2));

        view.set_filter(HistoryFilter {
            period_days: Some(30),
            ..Default::default()
        });
        let recent = view.stats(now());
        assert_eq!(recent.total_deposits, Decimal::new(10000, 2));
        assert_eq!(recent.total_transfers, Decimal::new(5000, 2));
        assert_eq!(recent.net_change, Decimal::new(2500, 2));
    }

    #[test]
    fn test_export_csv_fields() {
        let view = sample_view();
        let csv = view.export_csv(now()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,type,description,amount,balance_after"
        );
        let first = lines.next().unwrap();
        assert!(first.contains("DEPOSIT"));
        assert!(first.contains("100.00"));

        // Outgoing rows carry the signed display amount
        assert!(csv.contains("-25.00"));
        assert!(csv.contains("TRANSFER-OUT"));
    }

    #[test]
    fn test_export_escapes_embedded_delimiters() {
        let transactions = vec![tx(
            "t1",
            100,
            Some("deposit"),
            Some("Coffee, \"the good stuff\""),
            Some("2025-06-01 00:00:00"),
        )];
        let view = HistoryView::new(transactions, "A".to_string(), 10);
        let csv = view.export_csv(now()).unwrap();
        assert!(csv.contains("\"Coffee, \"\"the good stuff\"\"\""));
    }

    #[test]
    fn test_export_empty_set_is_an_error() {
        let mut view = sample_view();
        view.set_filter(HistoryFilter {
            search: "nothing matches".to_string(),
            ..Default::default()
        });
        let err = view.export_csv(now()).unwrap_err();
        assert!(err.to_string().contains("No transactions to export"));
    }
}
