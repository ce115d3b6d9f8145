//! Console output utilities.
//!
//! Everything here writes to stderr; stdout is reserved for item records.

use console::style;

/// Prefix hosts look for when scanning stderr for API error messages.
pub const API_ERROR_PREFIX: &str = "ERROR_MSG:";

/// Print an info message.
pub fn print_info(message: &str) {
    eprintln!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    eprintln!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print an API-provided error message in the machine-readable form.
pub fn print_api_error_message(message: &str) {
    eprintln!("{}", api_error_line(message));
}

fn api_error_line(message: &str) -> String {
    format!("{} {}", API_ERROR_PREFIX, message.trim())
}

/// Print the crawl settings.
pub fn print_config_summary(user: &str, fields: &str, destination: &str) {
    eprintln!();
    eprintln!("{}", style("Configuration:").bold());
    eprintln!("  User: {}", user);
    eprintln!("  Fields: {}", fields);
    eprintln!("  Output: {}", destination);
    eprintln!();
}
