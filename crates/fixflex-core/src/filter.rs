//! Date range filtering

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Transaction;

/// Inclusive date range; either bound may be unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// `months` calendar months before `today` (clamped to month end) through `today`
    pub fn trailing_months(today: NaiveDate, months: u32) -> Self {
        let start = today
            .checked_sub_months(Months::new(months))
            .unwrap_or(today);
        Self::new(start, today)
    }

    /// Both bounds set
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => true,
        }
    }
}

/// Outcome of applying a range
#[derive(Debug)]
pub struct Filtered<'a> {
    pub transactions: Vec<&'a Transaction>,
    /// The range had an unset bound, so nothing was filtered
    pub unbounded: bool,
}

/// Keep the transactions whose parsed date falls within `range`
///
/// Transactions without a parseable date are excluded. An unbounded range
/// is a no-op that returns the input unchanged.
pub fn filter_by_date<'a, I>(transactions: I, range: &DateRange) -> Filtered<'a>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    if !range.is_bounded() {
        return Filtered {
            transactions: transactions.into_iter().collect(),
            unbounded: true,
        };
    }

    let transactions = transactions
        .into_iter()
        .filter(|t| t.date.is_some_and(|d| range.contains(d)))
        .collect();

    Filtered {
        transactions,
        unbounded: false,
    }
}
