//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Spinner shown while a request is in flight. Doubles as the
/// double-submit guard: the command blocks on the request, so the user
/// cannot re-trigger the same action until it settles.
pub fn spinner(msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar
}

/// Format a signed amount with color: green for incoming, red for outgoing
pub fn format_signed_amount(amount: Decimal) -> String {
    let formatted = if amount >= Decimal::ZERO {
        format!("+${:.2}", amount)
    } else {
        format!("-${:.2}", amount.abs())
    };
    if amount >= Decimal::ZERO {
        formatted.green().to_string()
    } else {
        formatted.red().to_string()
    }
}

/// Format an unsigned dollar amount
pub fn format_dollars(amount: Decimal) -> String {
    format!("${:.2}", amount)
}
