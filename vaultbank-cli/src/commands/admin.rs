//! Admin panel commands
//!
//! Every mutation re-fetches the affected view afterwards so the terminal
//! always shows authoritative server state, never a locally patched row.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{Confirm, Input, Password};

use vaultbank_core::domain::admin::{AdminSettings, AdminTransaction, AdminUser};

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Log in with an administrator account
    Login,
    /// Show dashboard metrics
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List users
    Users {
        /// Only the most recently created users
        #[arg(long)]
        recent: Option<usize>,
        /// Filter rows by a case-insensitive search term
        #[arg(long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one user in detail
    User {
        /// User id
        id: String,
    },
    /// Lock a user account
    Lock {
        /// User id
        id: String,
    },
    /// Unlock a user account
    Unlock {
        /// User id
        id: String,
    },
    /// Reset a user's password
    ResetPassword {
        /// User id
        id: String,
    },
    /// List transactions
    Transactions {
        /// Server-side filter to apply
        #[arg(long)]
        filter: Option<String>,
        /// Only the most recent transactions
        #[arg(long)]
        recent: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Flag a transaction for review
    Flag {
        /// Transaction id
        id: String,
    },
    /// Remove a transaction's review flag
    Unflag {
        /// Transaction id
        id: String,
    },
    /// Show security logs
    Logs {
        /// Maximum entries to fetch
        #[arg(long, default_value_t = 50)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update server security settings
    Settings {
        /// Failed attempts before lockout
        #[arg(long)]
        max_attempts: u32,
        /// Lockout duration in minutes
        #[arg(long)]
        lock_duration: u32,
        /// Require 2FA for all users
        #[arg(long)]
        enable_2fa: bool,
    },
    /// Purge security logs older than N days
    PurgeLogs {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Force all users to log out
    LockSessions,
}

pub fn run(command: AdminCommands) -> Result<()> {
    match command {
        AdminCommands::Login => run_login(),
        AdminCommands::Dashboard { json } => run_dashboard(json),
        AdminCommands::Users { recent, search, json } => run_users(recent, search, json),
        AdminCommands::User { id } => run_user(&id),
        AdminCommands::Lock { id } => run_lock(&id, true),
        AdminCommands::Unlock { id } => run_lock(&id, false),
        AdminCommands::ResetPassword { id } => run_reset_password(&id),
        AdminCommands::Transactions { filter, recent, json } => {
            run_transactions(filter, recent, json)
        }
        AdminCommands::Flag { id } => run_flag(&id, true),
        AdminCommands::Unflag { id } => run_flag(&id, false),
        AdminCommands::Logs { limit, json } => run_logs(limit, json),
        AdminCommands::Settings { max_attempts, lock_duration, enable_2fa } => {
            run_settings(max_attempts, lock_duration, enable_2fa)
        }
        AdminCommands::PurgeLogs { days } => run_purge_logs(days),
        AdminCommands::LockSessions => run_lock_sessions(),
    }
}

fn run_login() -> Result<()> {
    let ctx = get_context()?;

    let username: String = Input::new().with_prompt("Admin username").interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;
    let otp: String = Input::new()
        .with_prompt("2FA code (leave empty if not enrolled)")
        .allow_empty(true)
        .interact_text()?;

    let otp = if otp.trim().is_empty() {
        None
    } else {
        Some(otp)
    };

    let spinner = output::spinner("Signing in...");
    let result = ctx.admin_service.login(&username, &password, otp.as_deref());
    spinner.finish_and_clear();
    let session = result?;

    println!(
        "{} Logged in as administrator {}",
        "Success!".green(),
        session.display_name()
    );
    Ok(())
}

fn run_dashboard(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let spinner = output::spinner("Loading dashboard...");
    let result = ctx.admin_service.dashboard();
    spinner.finish_and_clear();
    let metrics = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.add_row(vec!["Total users", &metrics.total_users.to_string()]);
    table.add_row(vec!["Active sessions", &metrics.active_sessions.to_string()]);
    table.add_row(vec![
        "Transactions today",
        &metrics.today_transactions.to_string(),
    ]);
    table.add_row(vec![
        "Failed logins (24h)",
        &metrics.failed_logins_24h.to_string(),
    ]);
    if let Some(total) = metrics.transaction_total {
        table.add_row(vec!["Transaction volume", &output::format_dollars(total)]);
    }
    if let Some(blocked) = metrics.blocked_attempts {
        table.add_row(vec!["Blocked attempts", &blocked.to_string()]);
    }
    println!("{table}");
    Ok(())
}

fn fetch_users(recent: Option<usize>) -> Result<Vec<AdminUser>> {
    let ctx = get_context()?;
    let spinner = output::spinner("Loading users...");
    let result = match recent {
        Some(limit) => ctx.admin_service.recent_users(limit),
        None => ctx.admin_service.users(),
    };
    spinner.finish_and_clear();
    Ok(result?)
}

fn run_users(recent: Option<usize>, search: Option<String>, json: bool) -> Result<()> {
    let mut users = fetch_users(recent)?;

    if let Some(term) = search {
        let term = term.to_lowercase();
        users.retain(|u| {
            u.username.to_lowercase().contains(&term)
                || u.account_number
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(&term)
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("No users found");
        return Ok(());
    }

    print_users_table(&users);
    Ok(())
}

fn print_users_table(users: &[AdminUser]) {
    let mut table = output::create_table();
    table.set_header(vec!["ID", "Username", "Account #", "Balance", "Status"]);
    for user in users {
        table.add_row(vec![
            user.id.clone(),
            user.username.clone(),
            user.account_number.clone().unwrap_or_else(|| "N/A".to_string()),
            user.balance
                .map(output::format_dollars)
                .unwrap_or_else(|| "$0.00".to_string()),
            if user.is_locked {
                "LOCKED".red().to_string()
            } else {
                "ACTIVE".green().to_string()
            },
        ]);
    }
    println!("{table}");
}

fn run_user(id: &str) -> Result<()> {
    let ctx = get_context()?;
    let spinner = output::spinner("Loading user...");
    let result = ctx.admin_service.user(id);
    spinner.finish_and_clear();
    print_user_detail(&result?);
    Ok(())
}

fn print_user_detail(user: &AdminUser) {
    println!("{}", format!("User: {}", user.username).bold());
    let mut table = output::create_table();
    table.add_row(vec![
        "Account #",
        user.account_number.as_deref().unwrap_or("N/A"),
    ]);
    table.add_row(vec!["Email", user.email.as_deref().unwrap_or("Not provided")]);
    table.add_row(vec![
        "Balance",
        &user
            .balance
            .map(output::format_dollars)
            .unwrap_or_else(|| "$0.00".to_string()),
    ]);
    table.add_row(vec![
        "Status",
        if user.is_locked { "LOCKED" } else { "ACTIVE" },
    ]);
    table.add_row(vec![
        "2FA",
        if user.two_factor_enabled { "Yes" } else { "No" },
    ]);
    table.add_row(vec![
        "Failed attempts",
        &user.failed_attempts.unwrap_or(0).to_string(),
    ]);
    table.add_row(vec!["Created", user.created_at.as_deref().unwrap_or("N/A")]);
    table.add_row(vec![
        "Last login",
        user.last_login.as_deref().unwrap_or("Never"),
    ]);
    table.add_row(vec!["Last IP", user.last_ip.as_deref().unwrap_or("N/A")]);
    println!("{table}");
}

fn run_lock(id: &str, lock: bool) -> Result<()> {
    let ctx = get_context()?;

    let action = if lock { "LOCK" } else { "UNLOCK" };
    let confirmed = Confirm::new()
        .with_prompt(format!("Are you sure you want to {action} this account?"))
        .default(false)
        .interact()?;
    if !confirmed {
        output::warning("Cancelled.");
        return Ok(());
    }

    let spinner = output::spinner("Updating...");
    let result = ctx.admin_service.set_user_lock(id, lock);
    spinner.finish_and_clear();
    output::success(&result?);

    // Show the authoritative state after the mutation
    print_user_detail(&ctx.admin_service.user(id)?);
    Ok(())
}

fn run_reset_password(id: &str) -> Result<()> {
    let ctx = get_context()?;

    let confirmed = Confirm::new()
        .with_prompt("Reset this user's password? They will need to set a new one on next login.")
        .default(false)
        .interact()?;
    if !confirmed {
        output::warning("Cancelled.");
        return Ok(());
    }

    let spinner = output::spinner("Resetting...");
    let result = ctx.admin_service.reset_user_password(id);
    spinner.finish_and_clear();
    output::success(&result?);
    Ok(())
}

fn run_transactions(filter: Option<String>, recent: Option<usize>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let spinner = output::spinner("Loading transactions...");
    let result = match recent {
        Some(limit) => ctx.admin_service.recent_transactions(limit),
        None => ctx.admin_service.transactions(filter.as_deref()),
    };
    spinner.finish_and_clear();
    let transactions = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No transactions found");
        return Ok(());
    }

    print_transactions_table(&transactions);
    Ok(())
}

fn print_transactions_table(transactions: &[AdminTransaction]) {
    let mut table = output::create_table();
    table.set_header(vec!["ID", "From", "To", "Amount", "Type", "Status", "Timestamp"]);
    for tx in transactions {
        let flagged = if tx.is_flagged { " ⚑" } else { "" };
        table.add_row(vec![
            format!("{}{}", tx.id, flagged),
            tx.from_account.clone().unwrap_or_else(|| "SYSTEM".to_string()),
            tx.to_account.clone().unwrap_or_else(|| "SYSTEM".to_string()),
            output::format_dollars(tx.amount.abs()),
            tx.transaction_type
                .clone()
                .unwrap_or_else(|| "transfer".to_string()),
            tx.status.clone().unwrap_or_else(|| "PENDING".to_string()),
            tx.timestamp.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
}

fn run_flag(id: &str, flag: bool) -> Result<()> {
    let ctx = get_context()?;

    let action = if flag { "FLAG" } else { "UNFLAG" };
    let confirmed = Confirm::new()
        .with_prompt(format!("Are you sure you want to {action} this transaction?"))
        .default(false)
        .interact()?;
    if !confirmed {
        output::warning("Cancelled.");
        return Ok(());
    }

    let spinner = output::spinner("Updating...");
    let result = ctx.admin_service.set_transaction_flag(id, flag);
    spinner.finish_and_clear();
    output::success(&result?);

    // Re-fetch so the listing reflects the server's state
    print_transactions_table(&ctx.admin_service.recent_transactions(5)?);
    Ok(())
}

fn run_logs(limit: usize, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let spinner = output::spinner("Loading security logs...");
    let result = ctx.admin_service.security_logs(limit);
    spinner.finish_and_clear();
    let logs = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&logs)?);
        return Ok(());
    }

    if logs.is_empty() {
        println!("No security logs found");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Timestamp", "Event", "User", "IP", "Severity", "Details"]);
    for log in &logs {
        table.add_row(vec![
            log.timestamp.clone().unwrap_or_default(),
            log.event_type.clone(),
            log.username.clone().unwrap_or_else(|| "N/A".to_string()),
            log.ip_address.clone().unwrap_or_else(|| "N/A".to_string()),
            log.severity
                .clone()
                .unwrap_or_else(|| "info".to_string())
                .to_uppercase(),
            log.details.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn run_settings(max_attempts: u32, lock_duration: u32, enable_2fa: bool) -> Result<()> {
    let ctx = get_context()?;
    let settings = AdminSettings {
        max_attempts,
        lock_duration,
        enable_2fa,
    };

    let spinner = output::spinner("Saving settings...");
    let result = ctx.admin_service.update_settings(&settings);
    spinner.finish_and_clear();
    result?;

    output::success("Settings saved.");
    Ok(())
}

fn run_purge_logs(days: u32) -> Result<()> {
    let ctx = get_context()?;

    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Clear all logs older than {days} days? This cannot be undone."
        ))
        .default(false)
        .interact()?;
    if !confirmed {
        output::warning("Cancelled.");
        return Ok(());
    }

    let spinner = output::spinner("Purging...");
    let result = ctx.admin_service.purge_logs(days);
    spinner.finish_and_clear();
    output::success(&result?);
    Ok(())
}

fn run_lock_sessions() -> Result<()> {
    let ctx = get_context()?;

    let confirmed = Confirm::new()
        .with_prompt("Force all users to log out? This will invalidate all active sessions.")
        .default(false)
        .interact()?;
    if !confirmed {
        output::warning("Cancelled.");
        return Ok(());
    }

    let spinner = output::spinner("Locking sessions...");
    let result = ctx.admin_service.lock_all_sessions();
    spinner.finish_and_clear();
    output::success(&result?);
    Ok(())
}
