//! In-memory tracker session
//!
//! A [`Session`] owns one dataset: every imported transaction keyed by a
//! stable id, the active date range and the filtered view it produces,
//! the category rule set, and the current category aggregates. The
//! filtered view is a list of ids, so a write through either view is seen
//! by both.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate;
use crate::categories::{CategoryInfo, CategorySet};
use crate::config::TrackerConfig;
use crate::demo::demo_transactions;
use crate::error::{Error, Result};
use crate::filter::{filter_by_date, DateRange};
use crate::import::{parse_csv, parse_transaction_date, SkippedRow};
use crate::models::{
    CategorySpending, MonthlyReport, NewTransaction, RecurringCandidate, SpendingBreakdown,
    Transaction, TransactionId, TransactionUpdate, FLAGGED_FOR_REVIEW, REVIEW_LATER,
};
use crate::recurring::detect_recurring;
use crate::trends::monthly_report;

/// Source name recorded for demo data
pub const DEMO_SOURCE: &str = "demo-data.csv";

/// Result of importing one statement into a session
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub source: String,
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
    /// Transactions in the session after the import
    pub total_transactions: usize,
}

/// One tracker dataset and everything derived from it
#[derive(Debug, Clone)]
pub struct Session {
    config: TrackerConfig,
    transactions: BTreeMap<TransactionId, Transaction>,
    next_id: u64,
    sources: Vec<String>,
    range: DateRange,
    range_initialized: bool,
    view: Vec<TransactionId>,
    categories: CategorySet,
    breakdown: SpendingBreakdown,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl Session {
    pub fn new(config: TrackerConfig) -> Self {
        let categories = config.category_set();
        Self {
            config,
            transactions: BTreeMap::new(),
            next_id: 1,
            sources: Vec::new(),
            range: DateRange::default(),
            range_initialized: false,
            view: Vec::new(),
            categories,
            breakdown: SpendingBreakdown::default(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Names of the statements loaded so far
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// The full set, in import order
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.values()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn category_list(&self) -> Vec<CategoryInfo> {
        self.categories.list()
    }

    /// Category totals over the filtered view
    pub fn breakdown(&self) -> &SpendingBreakdown {
        &self.breakdown
    }

    /// Filtered-view categories, largest first
    pub fn ranked_categories(&self) -> Vec<CategorySpending> {
        aggregate::ranked(&self.breakdown, &self.categories)
    }

    /// The filtered view; positions are the indices mutations take
    pub fn filtered(&self) -> Vec<&Transaction> {
        self.view
            .iter()
            .filter_map(|id| self.transactions.get(id))
            .collect()
    }

    /// Filtered transactions in one category, with their view indices
    pub fn in_category(&self, category: &str) -> Vec<(usize, &Transaction)> {
        self.filtered()
            .into_iter()
            .enumerate()
            .filter(|(_, t)| t.category() == category)
            .collect()
    }

    // ========== Ingest ==========

    /// Parse a statement and add its rows
    pub fn import_csv<R: Read>(
        &mut self,
        source: &str,
        reader: R,
        today: NaiveDate,
    ) -> Result<ImportSummary> {
        let outcome = parse_csv(reader)?;
        let imported = self.ingest(source, outcome.transactions, today);
        Ok(ImportSummary {
            source: source.to_string(),
            imported,
            skipped: outcome.skipped,
            total_transactions: self.len(),
        })
    }

    /// Add parsed transactions to the full set
    ///
    /// The first non-empty ingest sets the default date range ending `today`.
    /// Returns how many transactions were added.
    pub fn ingest(&mut self, source: &str, new: Vec<NewTransaction>, today: NaiveDate) -> usize {
        let added = new.len();
        for tx in new {
            let id = TransactionId(self.next_id);
            self.next_id += 1;
            let date = parse_transaction_date(&tx.transaction_date);
            self.transactions.insert(
                id,
                Transaction {
                    id,
                    date,
                    transaction_date: tx.transaction_date,
                    description: tx.description,
                    amount: tx.amount,
                    category: tx.category,
                    kind: tx.kind,
                    memo: tx.memo,
                },
            );
        }
        self.sources.push(source.to_string());
        self.categories.register_from(self.transactions.values());

        if added > 0 && !self.range_initialized {
            self.range = DateRange::trailing_months(today, self.config.default_range_months);
            self.range_initialized = true;
            debug!(
                "Default date range {:?} to {:?}",
                self.range.start, self.range.end
            );
        }

        self.refilter();
        info!(
            "Imported {} transactions from {} ({} total)",
            added,
            source,
            self.len()
        );
        added
    }

    /// Replace the session contents with the sample dataset
    pub fn load_demo(&mut self, today: NaiveDate) -> usize {
        self.clear();
        self.ingest(DEMO_SOURCE, demo_transactions(today), today)
    }

    fn clear(&mut self) {
        self.transactions.clear();
        self.sources.clear();
        self.view.clear();
        self.range = DateRange::default();
        self.range_initialized = false;
        self.categories = self.config.category_set();
        self.breakdown = SpendingBreakdown::default();
    }

    // ========== Date range ==========

    /// Set the active range and rebuild the filtered view
    ///
    /// Returns `true` when the range is unbounded and the view is the full set.
    pub fn set_date_range(&mut self, range: DateRange) -> bool {
        self.range = range;
        self.range_initialized = true;
        self.refilter()
    }

    fn refilter(&mut self) -> bool {
        let filtered = filter_by_date(self.transactions.values(), &self.range);
        let unbounded = filtered.unbounded;
        self.view = filtered.transactions.iter().map(|t| t.id).collect();
        if unbounded {
            debug!("Date range unbounded; view holds all {} transactions", self.view.len());
        }
        self.recompute();
        unbounded
    }

    fn recompute(&mut self) {
        let view: Vec<&Transaction> = self
            .view
            .iter()
            .filter_map(|id| self.transactions.get(id))
            .collect();
        self.breakdown = aggregate::analyze(view, &self.categories);
    }

    // ========== Category mutation ==========

    fn resolve(&self, index: usize) -> Result<TransactionId> {
        self.view.get(index).copied().ok_or_else(|| {
            warn!(
                "Invalid transaction index {} (view has {})",
                index,
                self.view.len()
            );
            Error::IndexOutOfRange {
                index,
                len: self.view.len(),
            }
        })
    }

    fn modify<F>(&mut self, index: usize, apply: F) -> Result<Transaction>
    where
        F: FnOnce(&mut Transaction),
    {
        let id = self.resolve(index)?;
        let tx = self
            .transactions
            .get_mut(&id)
            .ok_or_else(|| Error::InvalidData(format!("Transaction {} not in session", id)))?;
        apply(tx);
        let updated = tx.clone();

        self.categories.insert(updated.category());
        self.recompute();
        Ok(updated)
    }

    /// Move the filtered transaction at `index` into `category`
    pub fn reassign_category(&mut self, index: usize, category: &str) -> Result<Transaction> {
        let category = category.trim();
        if category.is_empty() {
            return Err(Error::EmptyCategoryName);
        }
        let updated = self.modify(index, |tx| tx.category = Some(category.to_string()))?;
        info!(
            "Moved '{}' ({:.2}) to {}",
            updated.description,
            updated.magnitude(),
            category
        );
        Ok(updated)
    }

    pub fn move_to_review_later(&mut self, index: usize) -> Result<Transaction> {
        self.reassign_category(index, REVIEW_LATER)
    }

    /// Move the transaction to "Flagged for Review" and note the date in its memo
    pub fn flag_transaction(&mut self, index: usize, today: NaiveDate) -> Result<Transaction> {
        let note = format!("[FLAGGED: {}]", today.format("%-m/%-d/%Y"));
        let updated = self.modify(index, |tx| {
            tx.category = Some(FLAGGED_FOR_REVIEW.to_string());
            tx.memo = Some(match tx.memo.as_deref().map(str::trim) {
                Some(memo) if !memo.is_empty() => format!("{} {}", memo, note),
                _ => note,
            });
        })?;
        info!("Flagged '{}' for review", updated.description);
        Ok(updated)
    }

    /// Apply edited fields to the filtered transaction at `index`
    pub fn update_transaction(
        &mut self,
        index: usize,
        update: TransactionUpdate,
    ) -> Result<Transaction> {
        if let Some(amount) = update.amount {
            if !amount.is_finite() {
                return Err(Error::InvalidData(format!("Invalid amount: {}", amount)));
            }
        }
        let category = match update.category.as_deref().map(str::trim) {
            Some("") => return Err(Error::EmptyCategoryName),
            other => other.map(str::to_string),
        };

        let updated = self.modify(index, |tx| {
            if let Some(description) = update.description {
                tx.description = description;
            }
            if let Some(amount) = update.amount {
                tx.amount = amount;
            }
            if let Some(memo) = update.memo {
                tx.memo = Some(memo).filter(|m| !m.trim().is_empty());
            }
            if let Some(category) = category {
                tx.category = Some(category);
            }
        })?;
        info!("Updated transaction {}", updated.id);
        Ok(updated)
    }

    /// Register a new category; see [`CategorySet::add_category`]
    pub fn add_category(&mut self, name: &str, is_fixed: bool) -> Result<String> {
        let name = self.categories.add_category(name, is_fixed)?;
        self.recompute();
        Ok(name)
    }

    // ========== Reports over the full set ==========

    /// Monthly buckets and trends over the configured trailing window
    ///
    /// Display windows are a slice of the result, see [`MonthlyReport::recent`].
    pub fn monthly_report(&self, today: NaiveDate) -> MonthlyReport {
        monthly_report(
            self.transactions.values(),
            &self.categories,
            today,
            self.config.trend_months,
        )
    }

    pub fn recurring(&self, today: NaiveDate) -> Vec<RecurringCandidate> {
        detect_recurring(self.transactions.values(), today, &self.config.recurring)
    }
}
