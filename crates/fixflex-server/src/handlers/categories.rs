//! Category handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use fixflex_core::CategoryInfo;
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct AddCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub is_fixed: bool,
}

/// GET /api/categories - Available categories with their kind
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<CategoryInfo>> {
    let session = state.session.read().await;
    Json(session.category_list())
}

/// POST /api/categories - Register a new category
pub async fn add_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddCategoryRequest>,
) -> Result<Json<CategoryInfo>, AppError> {
    let mut session = state.session.write().await;
    let name = session.add_category(&req.name, req.is_fixed)?;
    info!("Added category '{}' (fixed: {})", name, req.is_fixed);

    let kind = session.categories().kind_of(&name);
    Ok(Json(CategoryInfo { name, kind }))
}
