//! Summary, range and report handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use fixflex_core::{
    trends::MAX_TREND_MONTHS, CategorySpending, DateRange, MonthlyBucket, MonthlyReport,
    RecurringCandidate, Session,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};

/// Totals over the filtered view
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub range: DateRange,
    pub unbounded: bool,
    pub total: f64,
    pub fixed_total: f64,
    pub flexible_total: f64,
    pub category_totals: BTreeMap<String, f64>,
    /// Categories ranked by amount, with share of the total
    pub categories: Vec<CategorySpending>,
    pub transaction_count: usize,
}

impl SummaryResponse {
    pub fn from_session(session: &Session) -> Self {
        let breakdown = session.breakdown();
        let range = session.range();
        Self {
            range,
            unbounded: !range.is_bounded(),
            total: breakdown.total(),
            fixed_total: breakdown.fixed_total,
            flexible_total: breakdown.flexible_total,
            category_totals: breakdown.category_totals.clone(),
            categories: session.ranked_categories(),
            transaction_count: session.filtered().len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RangeResponse {
    pub range: DateRange,
    pub unbounded: bool,
    pub transaction_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SetRangeRequest {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    /// Display window; all buckets when omitted
    pub months: Option<u32>,
}

/// The full report plus the buckets inside the display window
#[derive(Debug, Serialize)]
pub struct MonthlyReportResponse {
    #[serde(flatten)]
    pub report: MonthlyReport,
    pub recent: Vec<MonthlyBucket>,
}

/// Parse an optional YYYY-MM-DD date, rejecting anything else
fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::bad_request(&format!(
                    "Invalid {} date format: '{}'. Use YYYY-MM-DD",
                    field, v
                ))
            }),
    }
}

/// GET /api/summary - Fixed and flexible totals for the active range
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    let session = state.session.read().await;
    Json(SummaryResponse::from_session(&session))
}

/// GET /api/range - The active date range
pub async fn get_range(State(state): State<Arc<AppState>>) -> Json<RangeResponse> {
    let session = state.session.read().await;
    let range = session.range();
    Json(RangeResponse {
        range,
        unbounded: !range.is_bounded(),
        transaction_count: session.filtered().len(),
    })
}

/// PUT /api/range - Change the date range and refilter
///
/// Omitting either bound shows every transaction.
pub async fn set_range(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetRangeRequest>,
) -> Result<Json<RangeResponse>, AppError> {
    let start = parse_date(req.start.as_deref(), "start")?;
    let end = parse_date(req.end.as_deref(), "end")?;
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(AppError::bad_request("Start date must not be after end date"));
        }
    }

    let mut session = state.session.write().await;
    let unbounded = session.set_date_range(DateRange { start, end });
    Ok(Json(RangeResponse {
        range: session.range(),
        unbounded,
        transaction_count: session.filtered().len(),
    }))
}

/// GET /api/reports/monthly - Monthly buckets and category trends
pub async fn report_monthly(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthlyQuery>,
) -> Result<Json<MonthlyReportResponse>, AppError> {
    if let Some(months) = params.months {
        if months == 0 || months > MAX_TREND_MONTHS {
            return Err(AppError::bad_request(&format!(
                "months must be between 1 and {}",
                MAX_TREND_MONTHS
            )));
        }
    }
    let today = state.today();
    let report = state.session.read().await.monthly_report(today);

    let recent = match params.months {
        Some(months) => report.recent(months as usize).to_vec(),
        None => report.months.clone(),
    };
    Ok(Json(MonthlyReportResponse { report, recent }))
}

/// GET /api/reports/recurring - Likely recurring charges
pub async fn report_recurring(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<RecurringCandidate>> {
    let today = state.today();
    let session = state.session.read().await;
    Json(session.recurring(today))
}
