//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Session loading, date range handling, and the config command
//! - `reports` - Summary, transactions, trends, recurring and categories reports
//! - `serve` - Web server command

pub mod core;
pub mod reports;
pub mod serve;

// Re-export command functions for main.rs
pub use self::core::*;
pub use reports::*;
pub use serve::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
