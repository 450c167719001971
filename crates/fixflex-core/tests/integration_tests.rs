//! Integration tests for fixflex-core
//!
//! These tests exercise the full import → filter → aggregate → reassign →
//! trends → recurring workflow.

use chrono::NaiveDate;
use fixflex_core::{
    DateRange, Error, NewTransaction, Session, TrackerConfig, YearMonth, FLAGGED_FOR_REVIEW,
    UNCATEGORIZED,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Three months of statement data:
/// - Netflix three times at the same price (recurring)
/// - Gym twice at different prices (not recurring)
/// - Rent (fixed) and assorted flexible spending
/// - A payroll credit and a row with a bad amount
fn statement_csv() -> &'static str {
    r#"Transaction Date,Description,Amount,Category,Type,Memo
08/05/2026,Netflix,-15.49,Entertainment,Sale,
09/05/2026,Netflix,-15.49,Entertainment,Sale,
10/05/2026,Netflix,-15.49,Entertainment,Sale,
09/10/2026,Gym,-40.00,Health & Fitness,Sale,
10/10/2026,Gym,-55.00,Health & Fitness,Sale,
09/01/2026,ACME Apartments,n/a,Home,Sale,broken
09/01/2026,ACME Apartments,(1350.00),Home,Sale,September rent
10/01/2026,ACME Apartments,(1350.00),Home,Sale,October rent
10/02/2026,Payroll,"2,500.00",Income,Payment,
10/03/2026,Corner Market,-80.00,,Sale,
10/12/2026,Bookshop,-24.00,Shopping,Sale,
"#
}

fn loaded_session() -> Session {
    let mut session = Session::default();
    let summary = session
        .import_csv("statement.csv", statement_csv().as_bytes(), today())
        .expect("Failed to import statement");
    assert_eq!(summary.imported, 10);
    assert_eq!(summary.skipped.len(), 1);
    session
}

// =============================================================================
// Import + Filter + Aggregate
// =============================================================================

#[test]
fn test_import_sets_last_month_view() {
    let session = loaded_session();

    assert_eq!(session.range(), DateRange::new(ymd(2026, 9, 18), today()));
    let described: Vec<&str> = session
        .filtered()
        .iter()
        .map(|t| t.description.as_str())
        .collect();
    assert_eq!(
        described,
        vec![
            "Netflix",
            "Gym",
            "ACME Apartments",
            "Payroll",
            "Corner Market",
            "Bookshop"
        ]
    );
}

#[test]
fn test_totals_are_consistent() {
    let session = loaded_session();
    let breakdown = session.breakdown();

    let by_category: f64 = breakdown.category_totals.values().sum();
    let expenses: f64 = session
        .filtered()
        .iter()
        .filter(|t| t.amount < 0.0)
        .map(|t| t.amount.abs())
        .sum();

    assert!((breakdown.fixed_total + breakdown.flexible_total - by_category).abs() < 1e-9);
    assert!((by_category - expenses).abs() < 1e-9);
    assert_eq!(breakdown.fixed_total, 1350.0);
    assert_eq!(breakdown.amount_for(UNCATEGORIZED), 80.0);
    assert_eq!(breakdown.amount_for("Income"), 0.0);
}

#[test]
fn test_filter_idempotent_across_ranges() {
    let mut session = loaded_session();
    let range = DateRange::new(ymd(2026, 9, 1), ymd(2026, 9, 30));

    session.set_date_range(range);
    let first: Vec<_> = session.filtered().iter().map(|t| t.id).collect();
    session.set_date_range(range);
    let second: Vec<_> = session.filtered().iter().map(|t| t.id).collect();

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

// =============================================================================
// Category Mutation
// =============================================================================

#[test]
fn test_reassignment_preserves_grand_total() {
    let mut session = loaded_session();
    let total_before = session.breakdown().total();
    let market = session
        .filtered()
        .iter()
        .position(|t| t.description == "Corner Market")
        .unwrap();

    session.reassign_category(market, "Groceries").unwrap();

    let breakdown = session.breakdown();
    assert!((breakdown.total() - total_before).abs() < 1e-9);
    assert_eq!(breakdown.amount_for("Groceries"), 80.0);
    assert_eq!(breakdown.amount_for(UNCATEGORIZED), 0.0);

    // The full set sees the write too
    let in_full = session
        .transactions()
        .find(|t| t.description == "Corner Market")
        .unwrap();
    assert_eq!(in_full.category(), "Groceries");
    assert_eq!(session.in_category("Groceries").len(), 1);
}

#[test]
fn test_reassign_to_fixed_moves_between_totals() {
    let mut session = loaded_session();
    let flexible_before = session.breakdown().flexible_total;
    let bookshop = session
        .filtered()
        .iter()
        .position(|t| t.description == "Bookshop")
        .unwrap();

    session.reassign_category(bookshop, "Education").unwrap();

    assert_eq!(session.breakdown().fixed_total, 1374.0);
    assert!((session.breakdown().flexible_total - (flexible_before - 24.0)).abs() < 1e-9);
}

#[test]
fn test_flag_keeps_total_spending() {
    let mut session = loaded_session();
    let total_before = session.breakdown().total();
    let count_before = session.len();

    let flagged = session.flag_transaction(0, today()).unwrap();

    assert_eq!(flagged.category(), FLAGGED_FOR_REVIEW);
    assert_eq!(session.len(), count_before);
    assert!((session.breakdown().total() - total_before).abs() < 1e-9);
}

#[test]
fn test_out_of_range_index() {
    let mut session = loaded_session();
    let len = session.filtered().len();
    assert!(matches!(
        session.move_to_review_later(len),
        Err(Error::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_add_category_rules() {
    let mut session = loaded_session();
    assert!(matches!(
        session.add_category("entertainment", false),
        Err(Error::DuplicateCategory(_))
    ));
    assert!(matches!(
        session.add_category("  ", false),
        Err(Error::EmptyCategoryName)
    ));
    assert_eq!(session.add_category("Pets", false).unwrap(), "Pets");
}

// =============================================================================
// Monthly Trends
// =============================================================================

#[test]
fn test_monthly_report() {
    let session = loaded_session();
    let report = session.monthly_report(today());

    assert_eq!(report.months.len(), 6);
    assert_eq!(report.months[0].month, YearMonth::new(2026, 10).unwrap());
    assert_eq!(report.months[1].month, YearMonth::new(2026, 9).unwrap());

    let october = &report.months[0];
    // netflix + gym + rent + market + bookshop
    assert!((october.total - (15.49 + 55.0 + 1350.0 + 80.0 + 24.0)).abs() < 1e-9);
    assert_eq!(october.fixed_total, 1350.0);

    // Uncategorized appears only in October
    let uncategorized = report
        .trends
        .iter()
        .find(|t| t.name == UNCATEGORIZED)
        .unwrap();
    assert_eq!(uncategorized.percent_change, 100.0);
}

#[test]
fn test_empty_session_has_zero_buckets() {
    let session = Session::default();
    let report = session.monthly_report(today());
    assert!(report.months.len() >= 6);
    assert!(report.months.iter().all(|m| m.total == 0.0));
    assert!(report.trends.iter().all(|t| t.change == 0.0));
}

#[test]
fn test_display_window_keeps_trailing_buckets() {
    let session = loaded_session();
    let report = session.monthly_report(today());

    let shown = report.recent(2);
    assert_eq!(shown.len(), 2);
    assert_eq!(shown[0].month, YearMonth::new(2026, 10).unwrap());
    assert_eq!(report.months.len(), 6);
    assert_eq!(report.recent(12).len(), 6);
}

#[test]
fn test_trend_window_never_below_six_months() {
    assert!(TrackerConfig::from_toml("trend_months = 1").is_err());

    let config = TrackerConfig::from_toml("trend_months = 12").unwrap();
    let session = Session::new(config);
    assert_eq!(session.monthly_report(today()).months.len(), 12);
}

// =============================================================================
// Recurring Detection
// =============================================================================

#[test]
fn test_recurring_detection() {
    let session = loaded_session();
    let candidates = session.recurring(today());

    let names: Vec<&str> = candidates.iter().map(|c| c.description.as_str()).collect();
    assert!(names.contains(&"netflix"));
    assert!(!names.contains(&"gym"));

    let netflix = candidates
        .iter()
        .find(|c| c.description == "netflix")
        .unwrap();
    assert_eq!(netflix.occurrences, 3);
    assert!((netflix.average_amount - 15.49).abs() < 1e-9);
    assert_eq!(netflix.category, "Entertainment");
    assert_eq!(netflix.last_date, ymd(2026, 10, 5));

    // Rent (two identical charges) sorts ahead of Netflix
    assert_eq!(candidates[0].description, "acme apartments");
}

#[test]
fn test_recurring_uses_configured_tolerance() {
    let config = TrackerConfig::from_toml("[recurring]\namount_tolerance = 0.2\n").unwrap();
    let mut session = Session::new(config);
    session.ingest(
        "gym.csv",
        vec![
            NewTransaction::new("9/10/2026", "Gym", -40.0),
            NewTransaction::new("10/10/2026", "Gym", -55.0),
        ],
        today(),
    );
    assert_eq!(session.recurring(today()).len(), 1);
}
