//! History command - browse, filter, and export transactions

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use serde_json::json;

use vaultbank_core::services::{HistoryFilter, HistoryView, KindFilter};
use vaultbank_core::TransactionKind;

use super::get_context;
use crate::output;

pub fn run(
    kind: Option<String>,
    days: Option<i64>,
    search: Option<String>,
    page: usize,
    export: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    ctx.current_session()?;

    let kind = match kind.as_deref() {
        None => KindFilter::All,
        Some(raw) => match TransactionKind::parse(raw) {
            Some(k) => KindFilter::Only(k),
            None => anyhow::bail!(
                "Unknown type '{raw}'. Available: deposit, withdraw, transfer-in, transfer-out"
            ),
        },
    };

    let spinner = output::spinner("Loading transactions...");
    let result = ctx.history_service.load(ctx.config.history_page_size);
    spinner.finish_and_clear();
    let mut view: HistoryView = result?;

    let now = Utc::now().naive_utc();
    view.set_filter(HistoryFilter {
        kind,
        period_days: days,
        search: search.unwrap_or_default(),
    });
    view.go_to_page(page, now);

    if let Some(path) = export {
        let csv = view.export_csv(now)?;
        std::fs::write(&path, csv)?;
        output::success(&format!(
            "Exported {} transactions to {}",
            view.filtered(now).len(),
            path.display()
        ));
        return Ok(());
    }

    if json {
        let entries: Vec<_> = view
            .page_entries(now)
            .iter()
            .map(|e| {
                json!({
                    "id": e.record.id,
                    "type": e.kind,
                    "amount": e.display_amount,
                    "description": e.record.description,
                    "timestamp": e.record.effective_timestamp()
                        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string()),
                    "balanceAfter": e.record.balance_after,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "page": view.page(),
                "totalPages": view.total_pages(now),
                "stats": view.stats(now),
                "transactions": entries,
            }))?
        );
        return Ok(());
    }

    let entries = view.page_entries(now);
    if entries.is_empty() {
        println!("No transactions");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Date", "Type", "Description", "Amount", "Balance"]);
    for entry in &entries {
        let date = entry
            .record
            .effective_timestamp()
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let balance = entry
            .record
            .balance_after
            .map(output::format_dollars)
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            date,
            entry.kind.label().to_string(),
            entry
                .record
                .description
                .clone()
                .unwrap_or_else(|| "Transaction".to_string()),
            output::format_signed_amount(entry.display_amount),
            balance,
        ]);
    }
    println!("{table}");

    let stats = view.stats(now);
    println!();
    println!(
        "Deposits: {}   Withdrawals: {}   Transfers: {}   Net: {}",
        output::format_dollars(stats.total_deposits),
        output::format_dollars(stats.total_withdrawals),
        output::format_dollars(stats.total_transfers),
        output::format_signed_amount(stats.net_change),
    );
    println!(
        "{}",
        format!("Page {} of {}", view.page(), view.total_pages(now)).dimmed()
    );

    Ok(())
}
