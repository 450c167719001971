//! Fixflex Core Library
//!
//! Shared functionality for the fixflex spending tracker:
//! - CSV import for bank statement exports
//! - Date range filtering
//! - Category totals with a fixed vs. flexible split
//! - Session store with category reassignment
//! - Monthly buckets and month-over-month trends
//! - Recurring payment detection
//! - TOML configuration

pub mod aggregate;
pub mod categories;
pub mod config;
pub mod demo;
pub mod error;
pub mod filter;
pub mod import;
pub mod models;
pub mod recurring;
pub mod session;
pub mod trends;

pub use categories::{CategoryInfo, CategorySet, DEFAULT_FIXED_CATEGORIES};
pub use config::{ConfigSource, TrackerConfig};
pub use error::{Error, Result};
pub use filter::DateRange;
pub use import::{parse_csv, ParseOutcome, SkippedRow};
pub use models::*;
pub use recurring::RecurringConfig;
pub use session::{ImportSummary, Session};
