//! Status command - session, profile, and 2FA summary

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let session = ctx.current_session()?;

    // Settings act on the server's current answer, never a cached one
    let two_factor = if session.is_admin() {
        None
    } else {
        Some(ctx.two_factor_service.status()?)
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "username": session.username,
                "accountNumber": session.account_number,
                "role": session.role,
                "twoFactorEnabled": two_factor.as_ref().map(|s| s.enabled),
            }))?
        );
        return Ok(());
    }

    println!("{}", "Session".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Username", session.display_name()]);
    table.add_row(vec![
        "Account #",
        if session.account_number.is_empty() {
            "unknown"
        } else {
            &session.account_number
        },
    ]);
    table.add_row(vec![
        "Role",
        if session.is_admin() { "admin" } else { "user" },
    ]);
    if let Some(status) = &two_factor {
        table.add_row(vec![
            "2FA",
            if status.enabled { "enabled" } else { "disabled" },
        ]);
    }
    println!("{table}");

    Ok(())
}
