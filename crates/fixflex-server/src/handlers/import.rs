//! Statement import handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use fixflex_core::{import::parse_csv, DateRange, ImportSummary, ParseOutcome};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};

/// Response after one or more statements were loaded
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imports: Vec<ImportSummary>,
    pub total_transactions: usize,
    pub range: DateRange,
}

/// JSON import request (for clients that read the file themselves)
#[derive(Debug, Deserialize)]
pub struct ImportJsonRequest {
    pub filename: Option<String>,
    pub content: String,
}

fn parse_statement(name: &str, data: &[u8]) -> Result<ParseOutcome, AppError> {
    parse_csv(data).map_err(|e| {
        AppError::bad_request(&format!(
            "Error parsing {}. Please make sure your CSV file is properly formatted ({})",
            name, e
        ))
    })
}

/// Add parsed statements to the session in one write
async fn ingest_all(
    state: &AppState,
    parsed: Vec<(String, ParseOutcome)>,
) -> Json<ImportResponse> {
    let today = state.today();
    let mut session = state.session.write().await;

    let imports = parsed
        .into_iter()
        .map(|(source, outcome)| {
            let imported = session.ingest(&source, outcome.transactions, today);
            ImportSummary {
                source,
                imported,
                skipped: outcome.skipped,
                total_transactions: session.len(),
            }
        })
        .collect();

    Json(ImportResponse {
        imports,
        total_transactions: session.len(),
        range: session.range(),
    })
}

/// POST /api/import - Import statement CSV files
///
/// Expects a multipart form with one or more `file` fields (max 10MB total).
/// Every file is parsed before any is added, so a bad file imports nothing.
pub async fn import_csv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    let mut total_size: usize = 0;

    // Extract fields from multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload-{}.csv", files.len() + 1));
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;
        total_size += bytes.len();

        // Check file size limit
        if total_size > MAX_UPLOAD_SIZE {
            return Err(AppError::bad_request(&format!(
                "File too large. Maximum size is {} MB",
                MAX_UPLOAD_SIZE / 1024 / 1024
            )));
        }

        files.push((name, bytes.to_vec()));
    }

    if files.is_empty() {
        return Err(AppError::bad_request("Missing file field"));
    }

    let parsed = files
        .iter()
        .map(|(name, data)| Ok((name.clone(), parse_statement(name, data)?)))
        .collect::<Result<Vec<_>, AppError>>()?;

    info!("Importing {} uploaded statement(s)", parsed.len());
    Ok(ingest_all(&state, parsed).await)
}

/// POST /api/import/json - Import one statement sent as text
pub async fn import_json(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImportJsonRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    if req.content.len() > MAX_UPLOAD_SIZE {
        return Err(AppError::bad_request(&format!(
            "File too large. Maximum size is {} MB",
            MAX_UPLOAD_SIZE / 1024 / 1024
        )));
    }

    let name = req
        .filename
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| "statement.csv".to_string());
    let outcome = parse_statement(&name, req.content.as_bytes())?;

    Ok(ingest_all(&state, vec![(name, outcome)]).await)
}

/// POST /api/demo - Replace the session with the sample transactions
pub async fn load_demo(State(state): State<Arc<AppState>>) -> Json<ImportResponse> {
    let today = state.today();
    let mut session = state.session.write().await;
    let imported = session.load_demo(today);

    Json(ImportResponse {
        imports: vec![ImportSummary {
            source: fixflex_core::session::DEMO_SOURCE.to_string(),
            imported,
            skipped: Vec::new(),
            total_transactions: session.len(),
        }],
        total_transactions: session.len(),
        range: session.range(),
    })
}
