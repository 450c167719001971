//! Monthly buckets and month-over-month category trends

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::categories::CategorySet;
use crate::models::{CategoryTrend, MonthlyBucket, MonthlyReport, TotalsChange, Transaction, YearMonth};

/// Trailing months that always get a bucket, even when empty
pub const DEFAULT_TREND_MONTHS: u32 = 6;

/// Upper bound for the trailing window and for display windows
pub const MAX_TREND_MONTHS: u32 = 120;

/// Bucket expenses by calendar month
///
/// The `trailing_months` months ending with the month of `today` are always
/// present (zero-filled); any other month with expenses gets a bucket too.
/// The window is clamped to `DEFAULT_TREND_MONTHS..=MAX_TREND_MONTHS`.
/// Result is most recent month first.
pub fn build_monthly_buckets<'a, I>(
    transactions: I,
    categories: &CategorySet,
    today: NaiveDate,
    trailing_months: u32,
) -> Vec<MonthlyBucket>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let trailing_months = trailing_months.clamp(DEFAULT_TREND_MONTHS, MAX_TREND_MONTHS);
    let current = YearMonth::of(today);
    let mut buckets: BTreeMap<YearMonth, MonthlyBucket> = (0..trailing_months)
        .map(|i| current.minus_months(i))
        .map(|month| (month, MonthlyBucket::empty(month)))
        .collect();

    for tx in transactions {
        let Some(date) = tx.date else { continue };
        if !tx.is_expense() {
            continue;
        }

        let month = YearMonth::of(date);
        let bucket = buckets
            .entry(month)
            .or_insert_with(|| MonthlyBucket::empty(month));
        let category = tx.category();
        let amount = tx.magnitude();

        *bucket.categories.entry(category.to_string()).or_insert(0.0) += amount;
        if categories.is_fixed(category) {
            bucket.fixed_total += amount;
        } else {
            bucket.flexible_total += amount;
        }
        bucket.total += amount;
        bucket.transaction_count += 1;
    }

    debug!("Built {} monthly buckets", buckets.len());
    buckets.into_values().rev().collect()
}

/// Compare the two most recent buckets per category
///
/// Sorted by absolute percent change, largest first. Empty when fewer
/// than two buckets exist.
pub fn category_trends(buckets: &[MonthlyBucket]) -> Vec<CategoryTrend> {
    let [current, previous, ..] = buckets else {
        return Vec::new();
    };

    let names: BTreeSet<&String> = current
        .categories
        .keys()
        .chain(previous.categories.keys())
        .collect();

    let mut trends: Vec<CategoryTrend> = names
        .into_iter()
        .map(|name| {
            let current_month = current.amount_for(name);
            let previous_month = previous.amount_for(name);
            let change = current_month - previous_month;
            CategoryTrend {
                name: name.clone(),
                current_month,
                previous_month,
                change,
                percent_change: percent_change(current_month, previous_month).unwrap_or(100.0),
            }
        })
        .collect();

    trends.sort_by(|a, b| {
        b.percent_change
            .abs()
            .partial_cmp(&a.percent_change.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    trends
}

/// Change of the bucket totals between the two most recent months
pub fn totals_change(buckets: &[MonthlyBucket]) -> TotalsChange {
    let [current, previous, ..] = buckets else {
        return TotalsChange::default();
    };

    TotalsChange {
        total: percent_change(current.total, previous.total),
        fixed: percent_change(current.fixed_total, previous.fixed_total),
        flexible: percent_change(current.flexible_total, previous.flexible_total),
    }
}

/// Buckets, category trends and total changes in one report
pub fn monthly_report<'a, I>(
    transactions: I,
    categories: &CategorySet,
    today: NaiveDate,
    trailing_months: u32,
) -> MonthlyReport
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let months = build_monthly_buckets(transactions, categories, today, trailing_months);
    let trends = category_trends(&months);
    let change = totals_change(&months);
    MonthlyReport {
        months,
        trends,
        change,
    }
}

fn percent_change(current: f64, previous: f64) -> Option<f64> {
    (previous != 0.0).then(|| (current - previous) / previous * 100.0)
}
