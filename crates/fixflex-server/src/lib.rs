//! Fixflex Web Server
//!
//! Axum-based JSON API over one in-memory tracker session.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Input validation (file size limits, date formats)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use fixflex_core::Session;

mod handlers;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
///
/// The session lock is held only for one synchronous core call per request.
pub struct AppState {
    pub session: RwLock<Session>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(session: Session, config: ServerConfig) -> Self {
        Self {
            session: RwLock::new(session),
            config,
        }
    }

    /// Today's date in local time
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Create the application router
pub fn create_router(session: Session, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState::new(session, config.clone()));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Import
        .route("/import", post(handlers::import_csv))
        .route("/import/json", post(handlers::import_json))
        .route("/demo", post(handlers::load_demo))
        // Date range
        .route(
            "/range",
            get(handlers::get_range).put(handlers::set_range),
        )
        // Transactions
        .route("/transactions", get(handlers::list_transactions))
        .route(
            "/transactions/:index",
            axum::routing::patch(handlers::update_transaction),
        )
        .route(
            "/transactions/:index/category",
            post(handlers::reassign_category),
        )
        .route(
            "/transactions/:index/review-later",
            post(handlers::review_later),
        )
        .route("/transactions/:index/flag", post(handlers::flag_transaction))
        // Categories
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::add_category),
        )
        // Reports
        .route("/summary", get(handlers::get_summary))
        .route("/reports/monthly", get(handlers::report_monthly))
        .route("/reports/recurring", get(handlers::report_recurring));

    // Build CORS layer
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin '{}'", o);
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    // Security headers
    // CSP: restrict scripts to same-origin, allow inline styles, allow blob: for images
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        // Multipart bodies up to the upload limit plus form overhead
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    session: Session,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !session.is_empty() {
        info!(
            "Preloaded {} transactions from {}",
            session.len(),
            session.sources().join(", ")
        );
    }

    let app = create_router(session, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn conflict(msg: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a core error to the status the client should see
    fn from_core(err: &fixflex_core::Error) -> Option<Self> {
        use fixflex_core::Error;

        let message = err.to_string();
        match err {
            Error::IndexOutOfRange { .. } => Some(Self::not_found(&message)),
            Error::DuplicateCategory(_) => Some(Self::conflict(&message)),
            Error::EmptyCategoryName
            | Error::InvalidData(_)
            | Error::Import(_)
            | Error::UnsupportedFormat(_)
            | Error::Csv(_) => Some(Self::bad_request(&message)),
            Error::Config(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        if let Some(mapped) = err
            .downcast_ref::<fixflex_core::Error>()
            .and_then(Self::from_core)
        {
            return mapped;
        }
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
