//! Interactive shell with an inactivity timeout
//!
//! The dashboard equivalent: one prompt loop over the account operations,
//! guarded by the single-countdown inactivity monitor. Every accepted
//! input counts as activity. When the countdown expires the user is asked
//! whether to stay signed in; declining (or dismissing) clears the session
//! and ends the shell.

use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use dialoguer::{Confirm, Input};
use rust_decimal::Decimal;

use vaultbank_core::services::{HistoryFilter, HistoryView, InactivityMonitor, KindFilter};
use vaultbank_core::{BankContext, Error, TransactionKind};

use super::get_context;
use crate::output;

pub fn run() -> Result<()> {
    let ctx = get_context()?;
    let session = ctx.current_session()?;

    println!(
        "Hello, {}! Welcome back to your dashboard.",
        session.display_name().bold()
    );
    println!("Type 'help' for commands, 'quit' to leave.");

    let timeout = Duration::from_secs(ctx.config.inactivity_minutes * 60);
    let mut monitor = InactivityMonitor::new(timeout, Instant::now());
    let mut view: Option<HistoryView> = None;

    loop {
        // Cooperative check: the one countdown is evaluated at the prompt,
        // never from a background thread.
        if monitor.is_expired(Instant::now()) {
            let stay = Confirm::new()
                .with_prompt("Session expired due to inactivity. Stay logged in?")
                .default(false)
                .interact()
                .unwrap_or(false);
            if stay {
                monitor.record_activity(Instant::now());
            } else {
                ctx.auth_service.logout()?;
                output::warning("Logged out due to inactivity.");
                return Ok(());
            }
        }

        let line: String = Input::new()
            .with_prompt("vb")
            .allow_empty(true)
            .interact_text()?;
        monitor.record_activity(Instant::now());

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let arg = parts.next();

        let result = match command {
            "" => Ok(()),
            "help" => {
                print_help();
                Ok(())
            }
            "quit" | "exit" => return Ok(()),
            "logout" => {
                ctx.auth_service.logout()?;
                output::success("Logged out.");
                return Ok(());
            }
            "balance" => show_balance(&ctx),
            "history" => show_history(&ctx, &mut view, None),
            "next" => page_history(&mut view, 1),
            "prev" => page_history(&mut view, -1),
            "filter" => show_history(&ctx, &mut view, arg),
            "deposit" => mutate_amount(&ctx, arg, |ctx, amount| {
                ctx.account_service.deposit(amount).map(|r| r.new_balance)
            }),
            "withdraw" => mutate_amount(&ctx, arg, |ctx, amount| {
                ctx.account_service.withdraw(amount).map(|r| r.new_balance)
            }),
            other => {
                output::warning(&format!("Unknown command: {other}"));
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            // Session death ends the shell; everything else stays inline
            Err(Error::SessionExpired) | Err(Error::NotLoggedIn) => {
                output::error("Session expired. Please log in again.");
                return Ok(());
            }
            Err(e) => output::error(&e.to_string()),
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  balance            show current balance");
    println!("  history            load and show transactions");
    println!("  filter <type>      filter by type (deposit, withdraw, transfer-in, transfer-out, all)");
    println!("  next / prev        page through results");
    println!("  deposit <amount>   deposit money");
    println!("  withdraw <amount>  withdraw money");
    println!("  logout             log out and leave");
    println!("  quit               leave without logging out");
}

fn show_balance(ctx: &BankContext) -> Result<(), Error> {
    let spinner = output::spinner("Fetching balance...");
    let result = ctx.account_service.balance();
    spinner.finish_and_clear();
    let balance = result?;
    println!("Balance: {}", output::format_dollars(balance.balance));
    Ok(())
}

fn show_history(
    ctx: &BankContext,
    view: &mut Option<HistoryView>,
    kind: Option<&str>,
) -> Result<(), Error> {
    if view.is_none() {
        let spinner = output::spinner("Loading transactions...");
        let loaded = ctx.history_service.load(ctx.config.history_page_size);
        spinner.finish_and_clear();
        *view = Some(loaded?);
    }

    let loaded = view.as_mut().expect("history view was just loaded");
    if let Some(raw) = kind {
        let filter = if raw == "all" {
            KindFilter::All
        } else {
            match TransactionKind::parse(raw) {
                Some(k) => KindFilter::Only(k),
                None => {
                    return Err(Error::validation(format!("Unknown type '{raw}'")));
                }
            }
        };
        loaded.set_filter(HistoryFilter {
            kind: filter,
            ..loaded.filter().clone()
        });
    }

    render_page(loaded);
    Ok(())
}

fn page_history(view: &mut Option<HistoryView>, step: i64) -> Result<(), Error> {
    let Some(loaded) = view.as_mut() else {
        return Err(Error::validation("Run 'history' first"));
    };
    let now = Utc::now().naive_utc();
    if step > 0 {
        loaded.next_page(now);
    } else {
        loaded.prev_page(now);
    }
    render_page(loaded);
    Ok(())
}

fn render_page(view: &HistoryView) {
    let now = Utc::now().naive_utc();
    let entries = view.page_entries(now);
    if entries.is_empty() {
        println!("No transactions");
        return;
    }

    for entry in &entries {
        let date = entry
            .record
            .effective_timestamp()
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  {:<12}  {}  {}",
            date,
            entry.kind.label(),
            output::format_signed_amount(entry.display_amount),
            entry.record.description.as_deref().unwrap_or("Transaction"),
        );
    }
    println!(
        "{}",
        format!("Page {} of {}", view.page(), view.total_pages(now)).dimmed()
    );
}

fn mutate_amount(
    ctx: &BankContext,
    arg: Option<&str>,
    op: impl Fn(&BankContext, Decimal) -> Result<Decimal, Error>,
) -> Result<(), Error> {
    let raw = arg.ok_or_else(|| Error::validation("Amount required"))?;
    let amount = Decimal::from_str(raw)
        .map_err(|_| Error::validation(format!("'{raw}' is not a valid amount")))?;

    let spinner = output::spinner("Processing...");
    let result = op(ctx, amount);
    spinner.finish_and_clear();
    let new_balance = result?;

    output::success(&format!(
        "Done. New balance: {}",
        output::format_dollars(new_balance)
    ));
    Ok(())
}
