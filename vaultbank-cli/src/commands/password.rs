//! Change-password command

use anyhow::Result;
use dialoguer::Password;

use super::get_context;
use crate::output;

pub fn run() -> Result<()> {
    let ctx = get_context()?;
    ctx.current_session()?;

    let old_password = Password::new().with_prompt("Current password").interact()?;
    let new_password = Password::new()
        .with_prompt("New password")
        .with_confirmation("Confirm new password", "Passwords do not match")
        .interact()?;

    let spinner = output::spinner("Changing password...");
    let result = ctx.auth_service.change_password(&old_password, &new_password);
    spinner.finish_and_clear();
    result?;

    output::success("Password changed.");
    Ok(())
}
