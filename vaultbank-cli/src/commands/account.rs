//! Balance, deposit, withdraw, and transfer commands

use std::str::FromStr;

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input};
use rust_decimal::Decimal;

use vaultbank_core::services::{LogEvent, OperationReceipt};

use super::{get_context, get_logger, log_event};
use crate::output;

fn parse_amount(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|_| anyhow::anyhow!("'{raw}' is not a valid amount"))
}

fn print_receipt(receipt: &OperationReceipt) {
    if receipt.message.is_empty() {
        output::success(&format!(
            "Done. New balance: {}",
            output::format_dollars(receipt.new_balance)
        ));
    } else {
        output::success(&format!(
            "{} New balance: {}",
            receipt.message,
            output::format_dollars(receipt.new_balance)
        ));
    }
}

pub fn run_balance(json: bool) -> Result<()> {
    let ctx = get_context()?;
    ctx.current_session()?;

    let spinner = output::spinner("Fetching balance...");
    let result = ctx.account_service.balance();
    spinner.finish_and_clear();
    let balance = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&balance)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Balance:".bold(),
        output::format_dollars(balance.balance)
    );
    Ok(())
}

pub fn run_deposit(amount: &str) -> Result<()> {
    let ctx = get_context()?;
    ctx.current_session()?;
    let logger = get_logger();
    let amount = parse_amount(amount)?;

    let spinner = output::spinner("Processing deposit...");
    let result = ctx.account_service.deposit(amount);
    spinner.finish_and_clear();

    match result {
        Ok(receipt) => {
            log_event(&logger, LogEvent::new("deposit_success").with_command("deposit"));
            print_receipt(&receipt);
            Ok(())
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("deposit_failed")
                    .with_command("deposit")
                    .with_error(e.to_string()),
            );
            Err(e.into())
        }
    }
}

pub fn run_withdraw(amount: &str) -> Result<()> {
    let ctx = get_context()?;
    ctx.current_session()?;
    let logger = get_logger();
    let amount = parse_amount(amount)?;

    let spinner = output::spinner("Processing withdrawal...");
    let result = ctx.account_service.withdraw(amount);
    spinner.finish_and_clear();

    match result {
        Ok(receipt) => {
            log_event(&logger, LogEvent::new("withdraw_success").with_command("withdraw"));
            print_receipt(&receipt);
            Ok(())
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("withdraw_failed")
                    .with_command("withdraw")
                    .with_error(e.to_string()),
            );
            Err(e.into())
        }
    }
}

pub fn run_transfer(amount: &str, to: Option<String>) -> Result<()> {
    let ctx = get_context()?;
    let session = ctx.current_session()?;
    let logger = get_logger();
    let amount = parse_amount(amount)?;

    let account_number: String = match to {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Recipient account number")
            .interact_text()?,
    };

    // Resolve the recipient first so the user confirms against a name,
    // not just a number.
    let spinner = output::spinner("Searching...");
    let recipient = ctx.account_service.lookup_recipient(&account_number);
    spinner.finish_and_clear();

    let recipient = match recipient? {
        Some(r) => r,
        None => {
            output::error("Recipient not found");
            return Ok(());
        }
    };
    println!("Recipient: {}", recipient.username.green());

    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Transfer {} to {}?",
            output::format_dollars(amount),
            recipient.username
        ))
        .default(false)
        .interact()?;
    if !confirmed {
        output::warning("Transfer cancelled.");
        return Ok(());
    }

    let spinner = output::spinner("Processing transfer...");
    let result = ctx
        .account_service
        .transfer(amount, &recipient, &session.account_number);
    spinner.finish_and_clear();

    match result {
        Ok(receipt) => {
            log_event(&logger, LogEvent::new("transfer_success").with_command("transfer"));
            print_receipt(&receipt);
            Ok(())
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("transfer_failed")
                    .with_command("transfer")
                    .with_error(e.to_string()),
            );
            Err(e.into())
        }
    }
}
