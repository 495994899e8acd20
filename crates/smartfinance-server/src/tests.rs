//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use smartfinance_core::test_utils::{MockBehavior, MockOllamaServer};
use smartfinance_core::MockBackend;
use tower::ServiceExt;

fn setup_test_app() -> Router {
    setup_test_app_with_ai(None)
}

fn setup_test_app_with_ai(ai: Option<AIClient>) -> Router {
    let db = Database::in_memory().unwrap();
    create_router_with_options(db, None, ServerConfig::default(), Settings::default(), ai)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get_body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Register a user and return its bearer token
async fn register(app: &Router, username: &str) -> String {
    let body = serde_json::json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "password": "hunter22"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", None, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;
    json["token"].as_str().unwrap().to_string()
}

async fn add_transaction(
    app: &Router,
    token: &str,
    kind: &str,
    category: &str,
    amount: f64,
    date: &str,
) -> serde_json::Value {
    let body = serde_json::json!({
        "type": kind,
        "category": category,
        "amount": amount,
        "description": "test",
        "date": date
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/transactions", Some(token), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    get_body_json(response).await
}

// ========== Auth Tests ==========

#[tokio::test]
async fn test_auth_required() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/transactions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Authentication required");
}

#[tokio::test]
async fn test_unknown_token_rejected() {
    let app = setup_test_app();

    let response = app
        .oneshot(authed("GET", "/api/dashboard", "not-a-real-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_register_login_me_logout() {
    let app = setup_test_app();
    let first_token = register(&app, "alice").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            serde_json::json!({"username": "alice", "password": "hunter22"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let token = json["token"].as_str().unwrap().to_string();
    assert_ne!(token, first_token);
    assert_eq!(json["user"]["username"], "alice");
    assert!(json["user"].get("password_hash").is_none());

    let response = app.clone().oneshot(authed("GET", "/api/me", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["username"], "alice");

    let response = app
        .clone()
        .oneshot(authed("POST", "/api/auth/logout", &token))
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await["success"], true);

    let response = app.oneshot(authed("GET", "/api/me", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = setup_test_app();
    register(&app, "bob").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            serde_json::json!({"username": "bob", "password": "wrong"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = setup_test_app();
    register(&app, "carol").await;

    let body = serde_json::json!({
        "username": "carol",
        "email": "other@example.com",
        "password": "pw"
    });
    let response = app
        .oneshot(json_request("POST", "/api/auth/register", None, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Username already exists");
}

#[tokio::test]
async fn test_register_missing_fields() {
    let app = setup_test_app();

    let body = serde_json::json!({"username": " ", "email": "x@example.com", "password": "pw"});
    let response = app
        .oneshot(json_request("POST", "/api/auth/register", None, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Transaction Tests ==========

#[tokio::test]
async fn test_transaction_crud() {
    let app = setup_test_app();
    let token = register(&app, "dave").await;

    let created = add_transaction(&app, &token, "expense", "Food", 42.5, "2024-03-10").await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["transaction_type"], "expense");
    assert_eq!(created["amount"], 42.5);

    let response = app
        .clone()
        .oneshot(authed("GET", &format!("/api/transactions/{}", id), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let update = serde_json::json!({
        "type": "expense",
        "category": "Groceries",
        "amount": "50",
        "date": "2024-03-11"
    });
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/transactions/{}", id),
            Some(&token),
            update,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["category"], "Groceries");
    assert_eq!(json["amount"], 50.0);

    let response = app
        .clone()
        .oneshot(authed("DELETE", &format!("/api/transactions/{}", id), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed("GET", &format!("/api/transactions/{}", id), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_transactions_limit() {
    let app = setup_test_app();
    let token = register(&app, "erin").await;
    add_transaction(&app, &token, "expense", "Food", 1.0, "2024-01-01").await;
    add_transaction(&app, &token, "expense", "Food", 2.0, "2024-01-03").await;
    add_transaction(&app, &token, "income", "Salary", 3.0, "2024-01-02").await;

    let response = app
        .oneshot(authed("GET", "/api/transactions?limit=2", &token))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["date"], "2024-01-03");
    assert_eq!(rows[1]["date"], "2024-01-02");
}

#[tokio::test]
async fn test_transaction_validation() {
    let app = setup_test_app();
    let token = register(&app, "frank").await;

    let body = serde_json::json!({
        "type": "expense",
        "category": "Food",
        "amount": -5,
        "date": "2024-01-01"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/transactions", Some(&token), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = serde_json::json!({
        "type": "expense",
        "category": "Food",
        "amount": 5,
        "date": "01/02/2024"
    });
    let response = app
        .oneshot(json_request("POST", "/api/transactions", Some(&token), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_other_users_rows_are_not_found() {
    let app = setup_test_app();
    let owner = register(&app, "gina").await;
    let intruder = register(&app, "hank").await;
    let created = add_transaction(&app, &owner, "expense", "Food", 9.0, "2024-01-01").await;
    let uri = format!("/api/transactions/{}", created["id"]);

    let response = app.clone().oneshot(authed("GET", &uri, &intruder)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(get_body_json(response).await["error"], "Not found");

    let response = app.clone().oneshot(authed("DELETE", &uri, &intruder)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(authed("GET", &uri, &owner)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ========== Budget Tests ==========

#[tokio::test]
async fn test_budget_progress() {
    let app = setup_test_app();
    let token = register(&app, "ivy").await;
    let this_month = today().to_string();
    add_transaction(&app, &token, "expense", "Food", 85.0, &this_month).await;

    let body = serde_json::json!({"category": "Food", "amount": 100});
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/budgets", Some(&token), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;
    assert_eq!(json["period"], "monthly");
    assert_eq!(json["progress"]["spent"], 85.0);
    assert_eq!(json["progress"]["status"], "warning");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/budgets",
            Some(&token),
            serde_json::json!({"category": "Food", "amount": 300}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let id = json["id"].as_i64().unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/budgets/{}", id),
            Some(&token),
            serde_json::json!({"amount": 50}),
        ))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["progress"]["status"], "danger");

    let response = app.oneshot(authed("GET", "/api/budgets", &token)).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

// ========== Recurring Tests ==========

#[tokio::test]
async fn test_recurring_lifecycle() {
    let app = setup_test_app();
    let token = register(&app, "jack").await;

    let body = serde_json::json!({
        "type": "expense",
        "category": "Rent",
        "amount": 1200,
        "description": "Flat",
        "frequency": "monthly",
        "start_date": "2024-01-31"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/recurring", Some(&token), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let rule = get_body_json(response).await;
    let id = rule["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/recurring", &token))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json[0]["next_date"], "2024-02-29");

    let response = app
        .clone()
        .oneshot(authed("POST", &format!("/api/recurring/{}/generate", id), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;
    assert_eq!(json["date"], "2024-02-29");
    assert_eq!(json["description"], "Flat (Recurring)");

    // End date before the stored start date
    let update = serde_json::json!({
        "amount": 1300,
        "frequency": "monthly",
        "end_date": "2023-12-01"
    });
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/recurring/{}", id),
            Some(&token),
            update,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let update = serde_json::json!({"amount": 1300, "frequency": "monthly", "is_active": false});
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/recurring/{}", id),
            Some(&token),
            update,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["is_active"], false);

    let response = app
        .clone()
        .oneshot(authed("POST", &format!("/api/recurring/{}/generate", id), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(authed("DELETE", &format!("/api/recurring/{}", id), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The generated transaction survives its rule
    let response = app
        .oneshot(authed("GET", "/api/transactions", &token))
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_generate_due_catches_up() {
    let app = setup_test_app();
    let token = register(&app, "kate").await;

    let start = today() - chrono::Duration::days(21);
    let body = serde_json::json!({
        "type": "expense",
        "category": "Gym",
        "amount": 10,
        "frequency": "weekly",
        "start_date": start.to_string()
    });
    app.clone()
        .oneshot(json_request("POST", "/api/recurring", Some(&token), body))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(authed("POST", "/api/recurring/generate-due", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["count"], 3);

    // A second run has nothing left to do
    let response = app
        .oneshot(authed("POST", "/api/recurring/generate-due", &token))
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await["count"], 0);
}

// ========== Dashboard & Insight Tests ==========

#[tokio::test]
async fn test_get_dashboard() {
    let app = setup_test_app();
    let token = register(&app, "liam").await;
    add_transaction(&app, &token, "income", "Salary", 1000.0, "2024-02-01").await;
    add_transaction(&app, &token, "expense", "Food", 250.0, "2024-02-05").await;

    let response = app.oneshot(authed("GET", "/api/dashboard", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["total_income"], 1000.0);
    assert_eq!(json["total_expense"], 250.0);
    assert_eq!(json["balance"], 750.0);
    assert_eq!(json["recent_transactions"].as_array().unwrap().len(), 2);
    assert_eq!(json["expense_by_month"][0]["label"], "Month 2");
    assert!(json["ai_summary"].is_null());
}

#[tokio::test]
async fn test_insights_fallback_summary() {
    let app = setup_test_app();
    let token = register(&app, "mia").await;

    let response = app.oneshot(authed("GET", "/api/insights", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["summary"], smartfinance_core::AI_UNAVAILABLE_MESSAGE);
    assert_eq!(json["insights"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_insights_with_ai_summary() {
    let ai = AIClient::Mock(MockBackend::with_response("  You are doing fine.  "));
    let app = setup_test_app_with_ai(Some(ai));
    let token = register(&app, "noah").await;
    add_transaction(&app, &token, "income", "Salary", 500.0, "2024-02-01").await;

    let response = app.oneshot(authed("GET", "/api/insights", &token)).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["summary"], "You are doing fine.");
}

#[tokio::test]
async fn test_dashboard_ollama_failure_falls_back() {
    let server = MockOllamaServer::start_with(MockBehavior::Fail).await;
    let app = setup_test_app_with_ai(Some(AIClient::ollama(&server.url(), "test-model")));
    let token = register(&app, "nina").await;
    add_transaction(&app, &token, "expense", "Food", 20.0, "2024-02-01").await;

    let response = app.oneshot(authed("GET", "/api/dashboard", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["ai_summary"], smartfinance_core::AI_UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn test_dashboard_ollama_summary() {
    let server =
        MockOllamaServer::start_with(MockBehavior::Fixed("Food is your biggest cost.".into())).await;
    let app = setup_test_app_with_ai(Some(AIClient::ollama(&server.url(), "test-model")));
    let token = register(&app, "omar").await;
    add_transaction(&app, &token, "expense", "Food", 20.0, "2024-02-01").await;

    let response = app.oneshot(authed("GET", "/api/dashboard", &token)).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["ai_summary"], "Food is your biggest cost.");
}

// ========== Report Tests ==========

#[tokio::test]
async fn test_report_filters() {
    let app = setup_test_app();
    let token = register(&app, "olga").await;
    add_transaction(&app, &token, "income", "Salary", 900.0, "2024-04-01").await;
    add_transaction(&app, &token, "expense", "Food", 100.0, "2024-04-02").await;
    add_transaction(&app, &token, "expense", "Travel", 50.0, "2024-05-02").await;

    let response = app
        .clone()
        .oneshot(authed(
            "GET",
            "/api/reports?start_date=2024-04-01&end_date=2024-04-30&category=all&transaction_type=all",
            &token,
        ))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["transactions"].as_array().unwrap().len(), 2);
    assert_eq!(json["total_income"], 900.0);
    assert_eq!(json["total_expense"], 100.0);

    let response = app
        .oneshot(authed("GET", "/api/reports?start_date=April", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_csv() {
    let app = setup_test_app();
    let token = register(&app, "pete").await;
    add_transaction(&app, &token, "expense", "Food", 12.5, "2024-04-02").await;

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/reports/export?type=expense", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=transactions_report.csv"
    );
    let text = get_body_text(response).await;
    assert!(text.starts_with("Date,Category,Description,Type,Amount"));
    assert!(text.contains("2024-04-02,Food,test,Expense,12.50"));
    assert!(text.contains("Total Expenses,12.50"));

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/reports/export?format=json", &token))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["total_expense"], 12.5);

    let response = app
        .oneshot(authed("GET", "/api/reports/export?format=xml", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Import Tests ==========

#[tokio::test]
async fn test_import_preview_and_commit() {
    let app = setup_test_app();
    let token = register(&app, "quinn").await;
    let text = "15/01/2024 Swiggy order dinner 450.00\nOpening balance";

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/import/statement",
            Some(&token),
            serde_json::json!({"text": text}),
        ))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["lines"].as_array().unwrap().len(), 1);
    assert_eq!(json["lines"][0]["category"], "Food & Dining");
    assert!(json["imported"].as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/import/statement",
            Some(&token),
            serde_json::json!({"text": text, "commit": true}),
        ))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["imported"][0]["date"], "2024-01-15");

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/import/statement",
            Some(&token),
            serde_json::json!({"text": "   "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Misc ==========

#[test]
fn test_parse_origins() {
    assert_eq!(
        parse_origins("https://a.example, ,https://b.example"),
        vec!["https://a.example", "https://b.example"]
    );
    assert!(parse_origins("").is_empty());
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/login")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}
