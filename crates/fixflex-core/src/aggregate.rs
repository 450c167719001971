//! Category totals and the fixed/flexible split

use tracing::debug;

use crate::categories::CategorySet;
use crate::models::{CategorySpending, SpendingBreakdown, Transaction};

/// Sum expense magnitudes per category over `transactions`
///
/// Income and zero-amount rows are skipped. Always a full recompute.
pub fn analyze<'a, I>(transactions: I, categories: &CategorySet) -> SpendingBreakdown
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut breakdown = SpendingBreakdown::default();
    let mut counted = 0usize;

    for tx in transactions {
        if !tx.is_expense() {
            continue;
        }
        let category = tx.category();
        let amount = tx.magnitude();

        *breakdown
            .category_totals
            .entry(category.to_string())
            .or_insert(0.0) += amount;

        if categories.is_fixed(category) {
            breakdown.fixed_total += amount;
        } else {
            breakdown.flexible_total += amount;
        }
        counted += 1;
    }

    debug!(
        "Aggregated {} expenses into {} categories",
        counted,
        breakdown.category_totals.len()
    );
    breakdown
}

/// Categories sorted by amount, largest first, with their share of the total
pub fn ranked(breakdown: &SpendingBreakdown, categories: &CategorySet) -> Vec<CategorySpending> {
    let total = breakdown.total();
    let mut ranked: Vec<CategorySpending> = breakdown
        .category_totals
        .iter()
        .map(|(name, &amount)| CategorySpending {
            name: name.clone(),
            amount,
            percentage: if total > 0.0 {
                amount / total * 100.0
            } else {
                0.0
            },
            kind: categories.kind_of(name),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked
}
