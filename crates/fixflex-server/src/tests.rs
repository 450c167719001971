//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const STATEMENT: &str = "Transaction Date,Description,Amount,Category,Type,Memo
03/01/2024,ACME Apartments,-1350.00,Home,Sale,March rent
03/03/2024,Power Co,-120.00,Bills & Utilities,Sale,
03/04/2024,Corner Market,-80.00,Food & Dining,Sale,Groceries
03/09/2024,Cinema,-30.00,Entertainment,Sale,
03/10/2024,Mystery Shop,-20.00,,Sale,
03/15/2024,Payroll,2500.00,Income,Payment,
";

fn setup_test_app() -> Router {
    create_router(Session::default(), None, ServerConfig::default())
}

async fn get_body_json(response: axum::response::Response) -> Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> axum::response::Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// App with the March 2024 statement loaded and the range set to that month
async fn seeded_app() -> Router {
    let app = setup_test_app();

    let response = send(
        &app,
        "POST",
        "/api/import/json",
        Some(json!({ "filename": "march.csv", "content": STATEMENT })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "PUT",
        "/api/range",
        Some(json!({ "start": "2024-03-01", "end": "2024-03-31" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    app
}

/// Index of the transaction with `description` in the filtered view
async fn index_of(app: &Router, description: &str) -> u64 {
    let response = send(app, "GET", "/api/transactions", None).await;
    let json = get_body_json(response).await;
    json.as_array()
        .unwrap()
        .iter()
        .find(|t| t["description"] == description)
        .map(|t| t["index"].as_u64().unwrap())
        .unwrap()
}

// ========== Health / Import ==========

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();
    let response = send(&app, "GET", "/api/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["transactions"], 0);
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();
    let response = send(&app, "GET", "/api/health", None).await;

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("content-security-policy").is_some());
}

#[tokio::test]
async fn test_cors_allowed_origin() {
    let config = ServerConfig {
        allowed_origins: vec!["http://localhost:5173".to_string()],
    };
    let app = create_router(Session::default(), None, config);

    let request = |origin: &str| {
        Request::builder()
            .uri("/api/health")
            .header("origin", origin)
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(request("http://localhost:5173")).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://localhost:5173"
    );

    let response = app.oneshot(request("http://evil.example")).await.unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_cors_default_is_same_origin() {
    let app = setup_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_import_json() {
    let app = setup_test_app();
    let response = send(
        &app,
        "POST",
        "/api/import/json",
        Some(json!({ "filename": "march.csv", "content": STATEMENT })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["total_transactions"], 6);
    assert_eq!(json["imports"][0]["source"], "march.csv");
    assert_eq!(json["imports"][0]["imported"], 6);
    // The first import sets a bounded default range
    assert!(json["range"]["start"].is_string());
    assert!(json["range"]["end"].is_string());
}

#[tokio::test]
async fn test_import_reports_skipped_rows() {
    let app = setup_test_app();
    let content = "Transaction Date,Description,Amount\n03/01/2024,Good,-10.00\n03/02/2024,Bad,abc\n";
    let response = send(
        &app,
        "POST",
        "/api/import/json",
        Some(json!({ "content": content })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["imports"][0]["source"], "statement.csv");
    assert_eq!(json["imports"][0]["imported"], 1);
    assert_eq!(json["imports"][0]["skipped"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_import_missing_columns() {
    let app = setup_test_app();
    let response = send(
        &app,
        "POST",
        "/api/import/json",
        Some(json!({ "content": "Date,Payee,Value\n03/01/2024,Shop,-5\n" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Error parsing"));
}

#[tokio::test]
async fn test_import_multipart() {
    let app = setup_test_app();
    let boundary = "fixflexboundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"march.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = boundary,
        csv = STATEMENT
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/import")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["imports"][0]["source"], "march.csv");
    assert_eq!(json["total_transactions"], 6);
}

#[tokio::test]
async fn test_import_multipart_without_file() {
    let app = setup_test_app();
    let boundary = "fixflexboundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = boundary
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/import")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_load_demo() {
    let app = setup_test_app();
    let response = send(&app, "POST", "/api/demo", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["total_transactions"], 12);
    assert_eq!(json["imports"][0]["source"], "demo-data.csv");

    // Loading again replaces rather than appends
    let response = send(&app, "POST", "/api/demo", None).await;
    let json = get_body_json(response).await;
    assert_eq!(json["total_transactions"], 12);
}

// ========== Range / Summary ==========

#[tokio::test]
async fn test_summary_splits_fixed_and_flexible() {
    let app = seeded_app().await;
    let response = send(&app, "GET", "/api/summary", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["fixed_total"], 1470.0);
    assert_eq!(json["flexible_total"], 130.0);
    assert_eq!(json["total"], 1600.0);
    assert_eq!(json["category_totals"]["Uncategorized"], 20.0);
    // Income is not spending
    assert!(json["category_totals"].get("Income").is_none());
    assert_eq!(json["transaction_count"], 6);

    let ranked = json["categories"].as_array().unwrap();
    assert_eq!(ranked[0]["name"], "Home");
    assert_eq!(ranked[0]["kind"], "fixed");
}

#[tokio::test]
async fn test_range_excludes_outside_dates() {
    let app = seeded_app().await;
    let response = send(
        &app,
        "PUT",
        "/api/range",
        Some(json!({ "start": "2024-03-05", "end": "2024-03-31" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["unbounded"], false);
    assert_eq!(json["transaction_count"], 3);

    let response = send(&app, "GET", "/api/summary", None).await;
    let json = get_body_json(response).await;
    assert_eq!(json["fixed_total"], 0.0);
    assert_eq!(json["flexible_total"], 50.0);
}

#[tokio::test]
async fn test_unbounded_range_shows_everything() {
    let app = seeded_app().await;
    let response = send(
        &app,
        "PUT",
        "/api/range",
        Some(json!({ "start": null, "end": "2024-03-02" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["unbounded"], true);
    assert_eq!(json["transaction_count"], 6);

    let response = send(&app, "GET", "/api/range", None).await;
    let json = get_body_json(response).await;
    assert!(json["range"]["start"].is_null());
    assert_eq!(json["range"]["end"], "2024-03-02");
}

#[tokio::test]
async fn test_range_invalid_date() {
    let app = seeded_app().await;
    let response = send(
        &app,
        "PUT",
        "/api/range",
        Some(json!({ "start": "03/01/2024", "end": "2024-03-31" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("YYYY-MM-DD"));
}

#[tokio::test]
async fn test_range_start_after_end() {
    let app = seeded_app().await;
    let response = send(
        &app,
        "PUT",
        "/api/range",
        Some(json!({ "start": "2024-04-01", "end": "2024-03-01" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Transactions ==========

#[tokio::test]
async fn test_list_transactions_by_category() {
    let app = seeded_app().await;
    let response = send(&app, "GET", "/api/transactions?category=Uncategorized", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["description"], "Mystery Shop");
    assert!(rows[0]["index"].is_u64());
}

#[tokio::test]
async fn test_reassign_category_moves_amount() {
    let app = seeded_app().await;
    let index = index_of(&app, "Mystery Shop").await;

    let response = send(
        &app,
        "POST",
        &format!("/api/transactions/{}/category", index),
        Some(json!({ "category": "Home" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["transaction"]["category"], "Home");
    assert_eq!(json["summary"]["fixed_total"], 1490.0);
    assert_eq!(json["summary"]["flexible_total"], 110.0);
    assert_eq!(json["summary"]["total"], 1600.0);
    assert!(json["summary"]["category_totals"].get("Uncategorized").is_none());
}

#[tokio::test]
async fn test_reassign_empty_category() {
    let app = seeded_app().await;
    let response = send(
        &app,
        "POST",
        "/api/transactions/0/category",
        Some(json!({ "category": "   " })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transaction_index_out_of_range() {
    let app = seeded_app().await;
    let response = send(&app, "POST", "/api/transactions/99/review-later", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_later() {
    let app = seeded_app().await;
    let index = index_of(&app, "Cinema").await;

    let response = send(
        &app,
        "POST",
        &format!("/api/transactions/{}/review-later", index),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["transaction"]["category"], "Review Later");
    assert_eq!(json["summary"]["category_totals"]["Review Later"], 30.0);
    assert_eq!(json["summary"]["flexible_total"], 130.0);
}

#[tokio::test]
async fn test_flag_transaction() {
    let app = seeded_app().await;
    let index = index_of(&app, "Corner Market").await;

    let response = send(&app, "POST", &format!("/api/transactions/{}/flag", index), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["transaction"]["category"], "Flagged for Review");
    let memo = json["transaction"]["memo"].as_str().unwrap();
    assert!(memo.starts_with("Groceries [FLAGGED: "));

    // Moved, not duplicated
    assert_eq!(json["summary"]["total"], 1600.0);
    assert_eq!(json["summary"]["transaction_count"], 6);
}

#[tokio::test]
async fn test_update_transaction() {
    let app = seeded_app().await;
    let index = index_of(&app, "Cinema").await;

    let response = send(
        &app,
        "PATCH",
        &format!("/api/transactions/{}", index),
        Some(json!({ "description": "Cinema (2 tickets)", "amount": -45.0 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["transaction"]["description"], "Cinema (2 tickets)");
    assert_eq!(json["transaction"]["category"], "Entertainment");
    assert_eq!(json["summary"]["flexible_total"], 145.0);
}

// ========== Categories ==========

#[tokio::test]
async fn test_list_categories() {
    let app = seeded_app().await;
    let response = send(&app, "GET", "/api/categories", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let categories = json.as_array().unwrap();
    let home = categories.iter().find(|c| c["name"] == "Home").unwrap();
    assert_eq!(home["kind"], "fixed");
    let food = categories
        .iter()
        .find(|c| c["name"] == "Food & Dining")
        .unwrap();
    assert_eq!(food["kind"], "flexible");
}

#[tokio::test]
async fn test_add_category() {
    let app = setup_test_app();
    let response = send(
        &app,
        "POST",
        "/api/categories",
        Some(json!({ "name": "  Childcare ", "is_fixed": true })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["name"], "Childcare");
    assert_eq!(json["kind"], "fixed");

    let response = send(
        &app,
        "POST",
        "/api/categories",
        Some(json!({ "name": "childcare" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(&app, "POST", "/api/categories", Some(json!({ "name": "" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Reports ==========

#[tokio::test]
async fn test_monthly_report() {
    let app = seeded_app().await;
    let response = send(&app, "GET", "/api/reports/monthly", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let months = json["months"].as_array().unwrap();
    // Trailing window plus the March 2024 month with spending
    assert!(months.len() > 6);
    assert_eq!(json["recent"].as_array().unwrap().len(), months.len());
    let march = months.iter().find(|m| m["month"] == "2024-03").unwrap();
    assert_eq!(march["fixed_total"], 1470.0);
    assert_eq!(march["transaction_count"], 5);
}

#[tokio::test]
async fn test_monthly_report_display_window() {
    let app = seeded_app().await;
    let response = send(&app, "GET", "/api/reports/monthly?months=2", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["recent"].as_array().unwrap().len(), 2);
    assert!(json["months"].as_array().unwrap().len() >= 6);
}

#[tokio::test]
async fn test_monthly_report_rejects_out_of_range_months() {
    let app = seeded_app().await;
    for months in ["0", "121", "4294967295"] {
        let uri = format!("/api/reports/monthly?months={}", months);
        let response = send(&app, "GET", &uri, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "months={}", months);
    }
}

#[tokio::test]
async fn test_recurring_report() {
    let app = setup_test_app();
    let response = send(&app, "GET", "/api/reports/recurring", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert!(json.as_array().unwrap().is_empty());
}
