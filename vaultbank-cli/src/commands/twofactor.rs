//! Two-factor authentication commands
//!
//! Enrollment renders the provisioning secret as a terminal QR code when
//! possible and always prints the manual-entry fallback. The secret only
//! ever lives in memory; cancelling the prompt abandons it.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Input;

use vaultbank_core::services::{LogEvent, PendingEnrollment};
use vaultbank_core::Error;

use super::{get_context, get_logger, log_event};
use crate::output;

#[derive(Subcommand)]
pub enum TwoFactorCommands {
    /// Show whether 2FA is enabled
    Status,
    /// Enroll in two-factor authentication
    Enable,
    /// Disable two-factor authentication
    Disable,
}

pub fn run(command: TwoFactorCommands) -> Result<()> {
    match command {
        TwoFactorCommands::Status => run_status(),
        TwoFactorCommands::Enable => run_enable(),
        TwoFactorCommands::Disable => run_disable(),
    }
}

fn run_status() -> Result<()> {
    let ctx = get_context()?;
    ctx.current_session()?;

    let status = ctx.two_factor_service.status()?;
    if status.enabled {
        output::success("Two-factor authentication is enabled.");
    } else {
        println!("Two-factor authentication is disabled.");
    }
    Ok(())
}

fn run_enable() -> Result<()> {
    let ctx = get_context()?;
    ctx.current_session()?;
    let logger = get_logger();

    // Gate on the server's current answer, not whatever we saw last
    if ctx.two_factor_service.status()?.enabled {
        anyhow::bail!("2FA is already enabled. Use 'vb 2fa disable' to turn it off.");
    }

    let spinner = output::spinner("Requesting provisioning secret...");
    let result = ctx.two_factor_service.begin_enrollment();
    spinner.finish_and_clear();
    let pending = result?;

    show_provisioning(&pending);

    loop {
        let code: String = Input::new()
            .with_prompt("6-digit code from your authenticator (leave empty to cancel)")
            .allow_empty(true)
            .interact_text()?;

        if code.trim().is_empty() {
            // Dropping `pending` discards the secret; nothing was enabled
            output::warning("Enrollment cancelled.");
            return Ok(());
        }

        let spinner = output::spinner("Verifying...");
        let result = ctx.two_factor_service.confirm_enrollment(&pending, &code);
        spinner.finish_and_clear();

        match result {
            Ok(()) => {
                log_event(&logger, LogEvent::new("2fa_enabled").with_command("2fa"));
                output::success("Two-factor authentication enabled.");
                return Ok(());
            }
            Err(e @ Error::Network(_)) => return Err(e.into()),
            // The pending secret stays valid; just ask for a fresh code
            Err(e) => output::error(&e.to_string()),
        }
    }
}

fn run_disable() -> Result<()> {
    let ctx = get_context()?;
    ctx.current_session()?;
    let logger = get_logger();

    if !ctx.two_factor_service.status()?.enabled {
        anyhow::bail!("2FA is not enabled on this account.");
    }

    loop {
        let code: String = Input::new()
            .with_prompt("6-digit code from your authenticator (leave empty to cancel)")
            .allow_empty(true)
            .interact_text()?;

        if code.trim().is_empty() {
            output::warning("Cancelled; 2FA remains enabled.");
            return Ok(());
        }

        let spinner = output::spinner("Verifying...");
        let result = ctx.two_factor_service.disable(&code);
        spinner.finish_and_clear();

        match result {
            Ok(()) => {
                log_event(&logger, LogEvent::new("2fa_disabled").with_command("2fa"));
                output::success("Two-factor authentication disabled.");
                return Ok(());
            }
            Err(e @ Error::Network(_)) => return Err(e.into()),
            Err(e) => output::error(&e.to_string()),
        }
    }
}

/// Render the provisioning QR code, falling back to manual entry when the
/// terminal can't show one
fn show_provisioning(pending: &PendingEnrollment) {
    let url = pending.otpauth_url();

    println!();
    println!("{}", "Scan this with your authenticator app:".bold());

    let rendered = if atty::is(atty::Stream::Stdout) {
        qrcode::QrCode::new(url.as_bytes()).ok().map(|code| {
            code.render::<qrcode::render::unicode::Dense1x2>()
                .quiet_zone(true)
                .build()
        })
    } else {
        None
    };

    match rendered {
        Some(qr) => println!("{qr}"),
        None => output::warning("Could not render a QR code in this terminal."),
    }

    println!();
    println!("Or enter the secret manually:");
    println!("  Secret: {}", pending.secret().bold());
    println!("  URI:    {url}");
    println!();
}
