//! VaultBank CLI - terminal banking client

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{account, admin, history, login, password, shell, signup, status, twofactor};

/// VaultBank - banking in your terminal
#[derive(Parser)]
#[command(name = "vb", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to your account
    Login {
        /// Username (prompted when omitted)
        username: Option<String>,
    },

    /// Log out and clear the stored session
    Logout,

    /// Create a new account
    Signup,

    /// Show session, profile, and 2FA status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show your current balance
    Balance {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deposit money into your account
    Deposit {
        /// Amount, up to two decimal places
        amount: String,
    },

    /// Withdraw money from your account
    Withdraw {
        /// Amount, up to two decimal places
        amount: String,
    },

    /// Transfer money to another account
    Transfer {
        /// Amount, up to two decimal places
        amount: String,
        /// Recipient account number (prompted when omitted)
        #[arg(long)]
        to: Option<String>,
    },

    /// Browse your transaction history
    History {
        /// Filter by type (deposit, withdraw, transfer-in, transfer-out)
        #[arg(long = "type")]
        kind: Option<String>,
        /// Only show the last N days
        #[arg(long)]
        days: Option<i64>,
        /// Search descriptions and amounts
        #[arg(long)]
        search: Option<String>,
        /// Page to show
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Export the filtered set to a CSV file
        #[arg(long)]
        export: Option<std::path::PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage two-factor authentication
    #[command(name = "2fa")]
    TwoFactor {
        #[command(subcommand)]
        command: twofactor::TwoFactorCommands,
    },

    /// Change your password
    Passwd,

    /// Interactive session with an inactivity timeout
    Shell,

    /// Administrative operations
    Admin {
        #[command(subcommand)]
        command: admin::AdminCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { username } => login::run(username),
        Commands::Logout => login::run_logout(),
        Commands::Signup => signup::run(),
        Commands::Status { json } => status::run(json),
        Commands::Balance { json } => account::run_balance(json),
        Commands::Deposit { amount } => account::run_deposit(&amount),
        Commands::Withdraw { amount } => account::run_withdraw(&amount),
        Commands::Transfer { amount, to } => account::run_transfer(&amount, to),
        Commands::History { kind, days, search, page, export, json } => {
            history::run(kind, days, search, page, export, json)
        }
        Commands::TwoFactor { command } => twofactor::run(command),
        Commands::Passwd => password::run(),
        Commands::Shell => shell::run(),
        Commands::Admin { command } => admin::run(command),
    }
}
