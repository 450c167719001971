//! Domain models for fixflex

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Category used when a transaction carries none
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Workflow pseudo-category for transactions the user wants to revisit
pub const REVIEW_LATER: &str = "Review Later";

/// Workflow pseudo-category for transactions that look wrong
pub const FLAGGED_FOR_REVIEW: &str = "Flagged for Review";

/// Stable identifier assigned to a transaction when it enters a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub u64);

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bank-statement line item owned by a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Date string as it appeared in the statement (month/day/year)
    pub transaction_date: String,
    /// Parsed calendar date; `None` when the raw string is unparseable
    pub date: Option<NaiveDate>,
    pub description: String,
    /// Negative = expense, non-negative = income/credit
    pub amount: f64,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub memo: Option<String>,
}

impl Transaction {
    /// Category label, falling back to "Uncategorized"
    pub fn category(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED)
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// Absolute amount, as displayed and aggregated
    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }
}

/// A parsed statement row before it is assigned an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub transaction_date: String,
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub memo: Option<String>,
}

impl NewTransaction {
    pub fn new(transaction_date: &str, description: &str, amount: f64) -> Self {
        Self {
            transaction_date: transaction_date.to_string(),
            description: description.to_string(),
            amount,
            category: None,
            kind: None,
            memo: None,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    pub fn with_memo(mut self, memo: &str) -> Self {
        self.memo = Some(memo.to_string());
        self
    }
}

/// Editable fields of a transaction (the edit dialog)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub memo: Option<String>,
    pub category: Option<String>,
}

/// How a category is classified for fixed vs. flexible analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Fixed,
    Flexible,
    /// One of the workflow pseudo-categories (still aggregated as flexible unless configured fixed)
    Review,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Flexible => "flexible",
            Self::Review => "review",
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ========== Report Models ==========

/// A spending category in the ranked category list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpending {
    pub name: String,
    pub amount: f64,
    /// Share of total spending, 0-100
    pub percentage: f64,
    pub kind: CategoryKind,
}

/// Category totals and the fixed/flexible split for one set of transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendingBreakdown {
    pub category_totals: BTreeMap<String, f64>,
    pub fixed_total: f64,
    pub flexible_total: f64,
}

impl SpendingBreakdown {
    pub fn total(&self) -> f64 {
        self.fixed_total + self.flexible_total
    }

    pub fn amount_for(&self, category: &str) -> f64 {
        self.category_totals.get(category).copied().unwrap_or(0.0)
    }
}

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// The month `n` months before this one
    pub fn minus_months(&self, n: u32) -> Self {
        self.first_day()
            .checked_sub_months(Months::new(n))
            .map(Self::of)
            .unwrap_or(*self)
    }

    /// Short display label, e.g. "Oct 2026"
    pub fn label(&self) -> String {
        self.first_day().format("%b %Y").to_string()
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid month: {} (use YYYY-MM)", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in month: {}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month number: {}", s))?;
        Self::new(year, month).ok_or_else(|| format!("Month out of range: {}", s))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Expense totals for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub month: YearMonth,
    pub label: String,
    pub categories: BTreeMap<String, f64>,
    pub fixed_total: f64,
    pub flexible_total: f64,
    pub total: f64,
    pub transaction_count: i64,
}

impl MonthlyBucket {
    pub fn empty(month: YearMonth) -> Self {
        Self {
            month,
            label: month.label(),
            categories: BTreeMap::new(),
            fixed_total: 0.0,
            flexible_total: 0.0,
            total: 0.0,
            transaction_count: 0,
        }
    }

    pub fn amount_for(&self, category: &str) -> f64 {
        self.categories.get(category).copied().unwrap_or(0.0)
    }
}

/// Month-over-month change of one category between the two most recent buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrend {
    pub name: String,
    pub current_month: f64,
    pub previous_month: f64,
    pub change: f64,
    /// `change / previous * 100`, or exactly 100 when the previous month was 0
    pub percent_change: f64,
}

/// Percent change of the bucket totals between the two most recent months
///
/// `None` when there is no previous month or its value was 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalsChange {
    pub total: Option<f64>,
    pub fixed: Option<f64>,
    pub flexible: Option<f64>,
}

/// Monthly comparison dashboard data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// Most recent month first
    pub months: Vec<MonthlyBucket>,
    pub trends: Vec<CategoryTrend>,
    pub change: TotalsChange,
}

impl MonthlyReport {
    /// The first `n` months (the dashboard's display window)
    pub fn recent(&self, n: usize) -> &[MonthlyBucket] {
        &self.months[..n.min(self.months.len())]
    }

    /// Categories with the largest increases, biggest first
    pub fn top_increases(&self, n: usize) -> Vec<&CategoryTrend> {
        self.trends
            .iter()
            .filter(|t| t.percent_change > 0.0)
            .take(n)
            .collect()
    }

    /// Categories with the largest decreases, biggest first
    pub fn top_decreases(&self, n: usize) -> Vec<&CategoryTrend> {
        self.trends
            .iter()
            .filter(|t| t.percent_change < 0.0)
            .take(n)
            .collect()
    }
}

/// A merchant that looks like a repeating charge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringCandidate {
    /// Lowercased, trimmed description shared by every member
    pub description: String,
    /// Category of the most recent member
    pub category: String,
    pub occurrences: usize,
    /// Mean absolute amount
    pub average_amount: f64,
    /// Every member is within the amount tolerance of the mean
    pub amount_consistent: bool,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Members, most recent first
    pub transactions: Vec<Transaction>,
}
