//! Recurring payment detection
//!
//! Groups recent expenses by normalized description and keeps the groups
//! that look like subscriptions or bills: three or more charges, or two
//! charges of nearly the same amount.

use std::collections::HashMap;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{RecurringCandidate, Transaction};

/// Maximum relative deviation from the mean for amounts to count as consistent
pub const DEFAULT_AMOUNT_TOLERANCE: f64 = 0.15;

/// How far back (in calendar months) charges are considered
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 6;

/// Shortest normalized description worth grouping
pub const DEFAULT_MIN_DESCRIPTION_LEN: usize = 3;

/// Occurrences that qualify a group regardless of amount consistency
pub const DEFAULT_MIN_OCCURRENCES: usize = 3;

/// Detector thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurringConfig {
    pub amount_tolerance: f64,
    pub lookback_months: u32,
    pub min_description_len: usize,
    pub min_occurrences: usize,
}

impl Default for RecurringConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: DEFAULT_AMOUNT_TOLERANCE,
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
            min_description_len: DEFAULT_MIN_DESCRIPTION_LEN,
            min_occurrences: DEFAULT_MIN_OCCURRENCES,
        }
    }
}

/// Normalize a description for grouping: lowercase, trimmed
pub fn normalize_description(description: &str) -> String {
    description.trim().to_lowercase()
}

/// Digits with optional separators, like a reference or account number
fn is_numeric(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | ' '))
}

/// Find recurring payment candidates, largest average amount first
pub fn detect_recurring<'a, I>(
    transactions: I,
    today: NaiveDate,
    config: &RecurringConfig,
) -> Vec<RecurringCandidate>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let cutoff = today
        .checked_sub_months(Months::new(config.lookback_months))
        .unwrap_or(NaiveDate::MIN);

    let mut groups: HashMap<String, Vec<(NaiveDate, &Transaction)>> = HashMap::new();
    for tx in transactions {
        let Some(date) = tx.date else { continue };
        if !tx.is_expense() || date < cutoff {
            continue;
        }
        let key = normalize_description(&tx.description);
        if key.chars().count() < config.min_description_len || is_numeric(&key) {
            continue;
        }
        groups.entry(key).or_default().push((date, tx));
    }

    let mut candidates: Vec<RecurringCandidate> = groups
        .into_iter()
        .filter_map(|(description, members)| candidate_from_group(description, members, config))
        .collect();

    candidates.sort_by(|a, b| {
        b.average_amount
            .partial_cmp(&a.average_amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.description.cmp(&b.description))
    });

    debug!("Detected {} recurring candidates", candidates.len());
    candidates
}

fn candidate_from_group(
    description: String,
    mut members: Vec<(NaiveDate, &Transaction)>,
    config: &RecurringConfig,
) -> Option<RecurringCandidate> {
    if members.len() < 2 {
        return None;
    }

    let average_amount =
        members.iter().map(|(_, t)| t.magnitude()).sum::<f64>() / members.len() as f64;
    let amount_consistent = average_amount > 0.0
        && members.iter().all(|(_, t)| {
            (t.magnitude() - average_amount).abs() / average_amount <= config.amount_tolerance
        });

    let qualifies = members.len() >= config.min_occurrences
        || (members.len() == 2 && amount_consistent);
    if !qualifies {
        debug!(
            "Group '{}' not recurring ({} charges, consistent: {})",
            description,
            members.len(),
            amount_consistent
        );
        return None;
    }

    // Most recent first; stable for same-day charges
    members.sort_by(|a, b| b.0.cmp(&a.0));
    let last_date = members[0].0;
    let first_date = members[members.len() - 1].0;
    let category = members[0].1.category().to_string();

    Some(RecurringCandidate {
        description,
        category,
        occurrences: members.len(),
        average_amount,
        amount_consistent,
        first_date,
        last_date,
        transactions: members.into_iter().map(|(_, t)| t.clone()).collect(),
    })
}
