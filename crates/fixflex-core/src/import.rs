//! CSV import for bank statement exports
//!
//! One column layout is supported: a header row naming `Transaction Date`,
//! `Description` and `Amount`, with optional `Category`, `Type` and `Memo`.
//! Columns are matched by (trimmed) header name, so their order does not matter.

use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::NewTransaction;

/// A row that was dropped during import
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    /// 1-based line number in the file (the header is line 1)
    pub line: u64,
    pub reason: String,
}

/// Result of parsing one statement
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub transactions: Vec<NewTransaction>,
    pub skipped: Vec<SkippedRow>,
}

/// Header positions resolved from the first row
struct Columns {
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
    kind: Option<usize>,
    memo: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                Error::UnsupportedFormat(format!("missing required column '{}'", name))
            })
        };

        Ok(Self {
            date: require("Transaction Date")?,
            description: require("Description")?,
            amount: require("Amount")?,
            category: find("Category"),
            kind: find("Type"),
            memo: find("Memo"),
        })
    }
}

fn optional_field(record: &StringRecord, column: Option<usize>) -> Option<String> {
    column
        .and_then(|i| record.get(i))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse a statement CSV into new transactions
///
/// Rows with a missing or non-numeric amount are skipped and reported in
/// [`ParseOutcome::skipped`]; rows with an unparseable date are kept.
pub fn parse_csv<R: Read>(reader: R) -> Result<ParseOutcome> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = Columns::from_headers(&headers)?;
    let mut outcome = ParseOutcome::default();

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let amount = match record.get(columns.amount).map(str::trim) {
            None | Some("") => {
                warn!("Skipping line {}: missing amount", line);
                outcome.skipped.push(SkippedRow {
                    line,
                    reason: "missing amount".to_string(),
                });
                continue;
            }
            Some(raw) => match parse_amount(raw) {
                Ok(amount) => amount,
                Err(e) => {
                    warn!("Skipping line {}: {}", line, e);
                    outcome.skipped.push(SkippedRow {
                        line,
                        reason: e.to_string(),
                    });
                    continue;
                }
            },
        };

        let date = record.get(columns.date).unwrap_or("").trim();
        let description = record.get(columns.description).unwrap_or("").trim();

        if parse_transaction_date(date).is_none() {
            debug!("Line {} has unparseable date '{}'", line, date);
        }

        outcome.transactions.push(NewTransaction {
            transaction_date: date.to_string(),
            description: description.to_string(),
            amount,
            category: optional_field(&record, columns.category),
            kind: optional_field(&record, columns.kind),
            memo: optional_field(&record, columns.memo),
        });
    }

    debug!(
        "Parsed {} transactions ({} skipped)",
        outcome.transactions.len(),
        outcome.skipped.len()
    );
    Ok(outcome)
}

/// Parse a `month/day/year` statement date
///
/// Anything other than exactly three numeric `/`-separated fields forming a
/// real calendar date yields `None`.
pub fn parse_transaction_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.trim().split('/').collect();
    if parts.len() != 3 {
        return None;
    }

    let month: u32 = parts[0].trim().parse().ok()?;
    let day: u32 = parts[1].trim().parse().ok()?;
    let year: i32 = parts[2].trim().parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse an amount string, handling currency symbols and commas
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite())
        .ok_or_else(|| Error::Import(format!("Unable to parse amount: {}", s)))
}
