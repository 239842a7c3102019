//! Login and logout commands
//!
//! Login walks the full auth state machine: credentials first, then the
//! OTP challenge when the server demands step-up. The submitted
//! credentials live only in the in-memory challenge value while the
//! prompt is open; leaving the prompt empty cancels and discards them.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};

use vaultbank_core::services::{LogEvent, LoginOutcome};
use vaultbank_core::Error;

use super::{get_context, get_logger, log_event};
use crate::output;

pub fn run(username: Option<String>) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let username: String = match username {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    let spinner = output::spinner("Signing in...");
    let outcome = ctx.auth_service.login(&username, &password);
    spinner.finish_and_clear();

    let session = match outcome {
        Ok(LoginOutcome::Authenticated(session)) => session,
        Ok(LoginOutcome::OtpRequired(pending)) => {
            output::info("This account has two-factor authentication enabled.");

            // The challenge stays open across wrong codes; only an empty
            // input abandons it.
            loop {
                let code: String = Input::new()
                    .with_prompt("6-digit code (leave empty to cancel)")
                    .allow_empty(true)
                    .interact_text()?;

                if code.trim().is_empty() {
                    output::warning("Login cancelled.");
                    return Ok(());
                }

                let spinner = output::spinner("Verifying code...");
                let result = ctx.auth_service.submit_otp(&pending, &code);
                spinner.finish_and_clear();

                match result {
                    Ok(session) => break session,
                    Err(e @ Error::Network(_)) => return Err(e.into()),
                    Err(e) => {
                        log_event(
                            &logger,
                            LogEvent::new("otp_rejected").with_command("login"),
                        );
                        output::error(&e.to_string());
                    }
                }
            }
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("login_failed")
                    .with_command("login")
                    .with_error(e.to_string()),
            );
            return Err(e.into());
        }
    };

    log_event(&logger, LogEvent::new("login_success").with_command("login"));
    println!(
        "{} Logged in as {}",
        "Success!".green(),
        session.display_name()
    );
    if session.account_number.is_empty() {
        output::warning("Profile could not be fetched; account number unknown.");
    } else {
        println!("Account number: {}", session.account_number);
    }

    Ok(())
}

pub fn run_logout() -> Result<()> {
    let ctx = get_context()?;
    ctx.auth_service.logout()?;
    output::success("Logged out.");
    Ok(())
}
