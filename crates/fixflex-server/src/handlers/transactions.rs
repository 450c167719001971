//! Transaction handlers
//!
//! Indices in paths are positions in the date-filtered view, as returned by
//! `GET /api/transactions`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use fixflex_core::{Transaction, TransactionUpdate};
use serde::{Deserialize, Serialize};

use super::reports::SummaryResponse;
use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Only transactions in this category (drill-down)
    pub category: Option<String>,
}

/// A transaction with its position in the filtered view
#[derive(Debug, Serialize)]
pub struct IndexedTransaction {
    pub index: usize,
    #[serde(flatten)]
    pub transaction: Transaction,
}

/// The changed transaction plus the recomputed totals
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub index: usize,
    pub transaction: Transaction,
    pub summary: SummaryResponse,
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    pub category: String,
}

/// GET /api/transactions - The filtered view, optionally for one category
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTransactionsQuery>,
) -> Json<Vec<IndexedTransaction>> {
    let session = state.session.read().await;
    let rows: Vec<(usize, &Transaction)> = match params.category.as_deref() {
        Some(category) => session.in_category(category),
        None => session.filtered().into_iter().enumerate().collect(),
    };

    Json(
        rows.into_iter()
            .map(|(index, tx)| IndexedTransaction {
                index,
                transaction: tx.clone(),
            })
            .collect(),
    )
}

/// PATCH /api/transactions/:index - Edit description, amount, memo or category
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(update): Json<TransactionUpdate>,
) -> Result<Json<MutationResponse>, AppError> {
    let mut session = state.session.write().await;
    let transaction = session.update_transaction(index, update)?;
    Ok(Json(MutationResponse {
        index,
        transaction,
        summary: SummaryResponse::from_session(&session),
    }))
}

/// POST /api/transactions/:index/category - Move to another category
pub async fn reassign_category(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(req): Json<ReassignRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let mut session = state.session.write().await;
    let transaction = session.reassign_category(index, &req.category)?;
    Ok(Json(MutationResponse {
        index,
        transaction,
        summary: SummaryResponse::from_session(&session),
    }))
}

/// POST /api/transactions/:index/review-later - Move to "Review Later"
pub async fn review_later(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<MutationResponse>, AppError> {
    let mut session = state.session.write().await;
    let transaction = session.move_to_review_later(index)?;
    Ok(Json(MutationResponse {
        index,
        transaction,
        summary: SummaryResponse::from_session(&session),
    }))
}

/// POST /api/transactions/:index/flag - Move to "Flagged for Review"
pub async fn flag_transaction(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<MutationResponse>, AppError> {
    let today = state.today();
    let mut session = state.session.write().await;
    let transaction = session.flag_transaction(index, today)?;
    Ok(Json(MutationResponse {
        index,
        transaction,
        summary: SummaryResponse::from_session(&session),
    }))
}
