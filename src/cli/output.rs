// Output formatting for the console surface

use colored::*;

/// Print an error message to stderr
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗ Error:".red().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}
