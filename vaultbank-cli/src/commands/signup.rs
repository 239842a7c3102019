//! Signup command

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};

use super::get_context;
use crate::output;

pub fn run() -> Result<()> {
    let ctx = get_context()?;

    let username: String = Input::new().with_prompt("Username").interact_text()?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let spinner = output::spinner("Creating account...");
    let result = ctx.auth_service.signup(&username, &password);
    spinner.finish_and_clear();

    let account_number = result?;
    println!("{} Your account has been created.", "Success!".green());
    if !account_number.is_empty() {
        println!("Account number: {account_number}");
    }
    println!("Run 'vb login' to sign in.");

    Ok(())
}
