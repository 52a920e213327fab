//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use finsight_core::db::Database;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        require_auth: false,
        allowed_origins: vec![],
        ..Default::default()
    };
    create_router(db, config)
}

fn setup_secured_app() -> Router {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        require_auth: true,
        allowed_origins: vec!["https://app.example.com".to_string()],
        api_keys: vec!["s3cret-key".to_string()],
    };
    create_router(db, config)
}

async fn get_body_json(response: axum::response::Response) -> Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

async fn create_income(app: &Router, user: Option<&str>, amount: f64, date: &str) -> Value {
    let response = send(
        app,
        "POST",
        "/api/income",
        user,
        Some(json!({
            "source": "Acme",
            "amount": amount,
            "category": "Salary",
            "date": date,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    get_body_json(response).await
}

async fn create_expense(
    app: &Router,
    user: Option<&str>,
    category: &str,
    amount: f64,
    date: &str,
) -> Value {
    let response = send(
        app,
        "POST",
        "/api/expense",
        user,
        Some(json!({
            "amount": amount,
            "payment_method": "card",
            "category": category,
            "date": date,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    get_body_json(response).await
}

// ========== Health & Auth Tests ==========

#[tokio::test]
async fn test_health_without_credentials() {
    let app = setup_secured_app();

    let response = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_auth_required_by_default() {
    let app = setup_secured_app();

    let response = send(&app, "GET", "/api/analytics", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Authentication required");
}

#[tokio::test]
async fn test_user_header_authenticates() {
    let app = setup_secured_app();

    let response = send(&app, "GET", "/api/balance", Some("alice"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_api_key_auth() {
    let app = setup_secured_app();

    let request = |key: &str| {
        Request::builder()
            .uri("/api/balance")
            .header("authorization", format!("Bearer {}", key))
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(request("s3cret-key")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(request("wrong-key!")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn test_validate_api_key() {
    let keys = vec!["abc123".to_string(), "longer-key".to_string()];
    assert!(validate_api_key("abc123", &keys));
    assert!(validate_api_key("longer-key", &keys));
    assert!(!validate_api_key("abc124", &keys));
    assert!(!validate_api_key("abc", &keys));
    assert!(!validate_api_key("anything", &[]));
}

#[test]
fn test_get_username_fallbacks() {
    let mut headers = HeaderMap::new();
    assert_eq!(get_username(&headers), LOCAL_DEV_USER);

    headers.insert("authorization", HeaderValue::from_static("Bearer k"));
    assert_eq!(get_username(&headers), API_KEY_USER);

    headers.insert(USER_HEADER, HeaderValue::from_static(" bob "));
    assert_eq!(get_username(&headers), "bob");
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = send(&app, "GET", "/api/health", None, None).await;
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("content-security-policy").is_some());
}

// ========== Analytics API Tests ==========

#[tokio::test]
async fn test_analytics_empty_user() {
    let app = setup_test_app();

    let response = send(&app, "GET", "/api/analytics?year=2024", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["kpis"]["totalIncome"], 0.0);
    assert_eq!(json["kpis"]["totalExpense"], 0.0);
    assert_eq!(json["kpis"]["savingsPercent"], 0.0);
    assert_eq!(json["expensesByCategory"].as_array().unwrap().len(), 0);
    assert_eq!(json["expensesByMonth"].as_array().unwrap().len(), 12);
    assert_eq!(json["incomeByMonth"][0]["month"], "2024-01");
    assert_eq!(json["incomeByMonth"][0]["monthName"], "January 2024");
    assert_eq!(json["monthlyBalances"].as_array().unwrap().len(), 12);

    let bands = json["expensesDistribution"].as_array().unwrap();
    assert_eq!(bands.len(), 3);
    assert_eq!(bands[0]["amountRange"], "0-100");
    assert_eq!(bands[0]["count"], 0);
}

#[tokio::test]
async fn test_analytics_report_contract() {
    let app = setup_test_app();

    create_income(&app, None, 100.0, "2024-01-10").await;
    create_income(&app, None, 200.0, "2024-02-10").await;
    create_expense(&app, None, "Food", 50.0, "2024-01-20").await;

    let response = send(&app, "GET", "/api/analytics?year=2024", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let kpis = &json["kpis"];
    assert_eq!(kpis["totalIncome"], 300.0);
    assert_eq!(kpis["totalExpense"], 50.0);
    assert_eq!(kpis["monthlyBalance"], 250.0);
    assert_eq!(kpis["savings"], 250.0);
    assert_eq!(kpis["savingsPercent"], 83.33);

    assert_eq!(json["monthlyBalances"][0], 50.0);
    assert_eq!(json["monthlyBalances"][1], 200.0);
    assert_eq!(json["monthlyBalances"][2], 0.0);

    assert_eq!(json["expensesPareto"][0]["category"], "Food");
    assert_eq!(json["expensesPareto"][0]["cumulativePercent"], 100.0);
    assert_eq!(json["pivotTable"][0]["month"], "2024-01");
    assert_eq!(json["pivotTable"][0]["total"], 50.0);
    assert_eq!(json["expensesDistribution"][0]["count"], 1);
}

#[tokio::test]
async fn test_analytics_range_with_date_only_end() {
    let app = setup_test_app();

    create_expense(&app, None, "Food", 10.0, "2024-03-31T18:45:00").await;
    create_expense(&app, None, "Food", 20.0, "2024-04-01").await;

    let response = send(
        &app,
        "GET",
        "/api/analytics?start_date=2024-03-01&end_date=2024-03-31",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["kpis"]["totalExpense"], 10.0);
}

#[tokio::test]
async fn test_analytics_rejects_bad_dates() {
    let app = setup_test_app();

    let response = send(&app, "GET", "/api/analytics?start_date=31-01-2024", None, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        "GET",
        "/api/analytics?start_date=2024-02-01&end_date=2024-01-01",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Monthly KPI & Balance Tests ==========

#[tokio::test]
async fn test_monthly_kpis() {
    let app = setup_test_app();

    create_income(&app, None, 1000.0, "2024-03-01").await;
    create_expense(&app, None, "Rent", 600.0, "2024-03-02").await;
    create_expense(&app, None, "Food", 150.0, "2024-03-20").await;

    let response = send(&app, "GET", "/api/kpi/monthly?year=2024&month=3", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["monthName"], "March 2024");
    assert_eq!(json["totalExpense"], 750.0);
    assert_eq!(json["savingsPercent"], 25.0);
    assert_eq!(json["expensesByCategory"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_monthly_kpis_rejects_month_13() {
    let app = setup_test_app();

    let response = send(&app, "GET", "/api/kpi/monthly?month=13", None, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("month"));
}

#[tokio::test]
async fn test_balance_echoes_filters() {
    let app = setup_test_app();

    create_income(&app, None, 500.0, "2024-01-05").await;
    create_expense(&app, None, "Food", 80.0, "2024-01-05").await;
    create_expense(&app, None, "Food", 20.0, "2024-01-06").await;

    let response = send(&app, "GET", "/api/balance?day=5&month=1&year=2024", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["total_income"], 500.0);
    assert_eq!(json["total_expense"], 80.0);
    assert_eq!(json["balance"], 420.0);
    assert_eq!(json["filters"]["day"], 5);
    assert_eq!(json["filters"]["year"], 2024);
    assert!(json["filters"]["start_date"].is_null());

    // Range wins over the calendar fields
    let response = send(
        &app,
        "GET",
        "/api/balance?day=5&start_date=2024-01-06&end_date=2024-01-06",
        None,
        None,
    )
    .await;
    let json = get_body_json(response).await;
    assert_eq!(json["total_expense"], 20.0);
    assert_eq!(json["balance"], -20.0);
}

#[tokio::test]
async fn test_balance_validates_calendar_fields() {
    let app = setup_test_app();

    for query in ["day=0", "day=32", "month=0", "year=1850"] {
        let response = send(&app, "GET", &format!("/api/balance?{}", query), None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "query {}", query);
    }
}

// ========== Income & Expense CRUD Tests ==========

#[tokio::test]
async fn test_income_crud_flow() {
    let app = setup_test_app();

    let created = create_income(&app, None, 1234.56, "2024-05-20").await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["month"], "2024-05");
    assert_eq!(created["amount"], 1234.56);

    let response = send(&app, "GET", &format!("/api/income/{}", id), None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "PUT",
        &format!("/api/income/{}", id),
        None,
        Some(json!({
            "source": "Globex",
            "amount": 99.5,
            "category": "Freelance",
            "observations": "moved",
            "date": "2024-07-01T09:00:00",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = get_body_json(response).await;
    assert_eq!(updated["month"], "2024-07");
    assert_eq!(updated["source"], "Globex");

    let response = send(&app, "GET", "/api/income", None, None).await;
    let listed = get_body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = send(&app, "DELETE", &format!("/api/income/{}", id), None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", &format!("/api/income/{}", id), None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_archived_expense_leaves_analytics() {
    let app = setup_test_app();

    create_expense(&app, None, "Food", 40.0, "2024-04-01").await;
    let travel = create_expense(&app, None, "Travel", 700.0, "2024-04-02").await;
    let id = travel["id"].as_i64().unwrap();

    let response = send(
        &app,
        "POST",
        &format!("/api/expense/{}/archive", id),
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/api/analytics?year=2024", None, None).await;
    let json = get_body_json(response).await;
    assert_eq!(json["kpis"]["totalExpense"], 40.0);
    assert_eq!(json["expensesByCategory"].as_array().unwrap().len(), 1);

    let response = send(&app, "GET", "/api/expense", None, None).await;
    let listed = get_body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Archived records can still be fetched by id
    let response = send(&app, "GET", &format!("/api/expense/{}", id), None, None).await;
    let json = get_body_json(response).await;
    assert_eq!(json["archived"], true);
}

#[tokio::test]
async fn test_unknown_records_return_404() {
    let app = setup_test_app();

    let response = send(&app, "GET", "/api/expense/999", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "DELETE", "/api/income/999", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "POST", "/api/expense/999/archive", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_bodies_return_400() {
    let app = setup_test_app();

    let response = send(
        &app,
        "POST",
        "/api/expense",
        None,
        Some(json!({
            "amount": -5.0,
            "payment_method": "card",
            "category": "Food",
            "date": "2024-01-01",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        "POST",
        "/api/income",
        None,
        Some(json!({
            "source": "Acme",
            "amount": 10.0,
            "category": "Salary",
            "date": "yesterday",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, "POST", "/api/income", None, Some(json!({"source": "Acme"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Amounts too large to store are rejected, not allowed to poison totals
    for amount in [1e28, 5e16] {
        let response = send(
            &app,
            "POST",
            "/api/expense",
            None,
            Some(json!({
                "amount": amount,
                "payment_method": "card",
                "category": "Food",
                "date": "2024-01-01",
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "amount {}", amount);
        let json = get_body_json(response).await;
        assert!(json["error"].is_string());
    }

    let response = send(&app, "GET", "/api/analytics?year=2024", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_query_params_return_json_400() {
    let app = setup_test_app();

    for uri in [
        "/api/analytics?year=abc",
        "/api/kpi/monthly?month=-1",
        "/api/balance?day=first",
        "/api/expense?limit=ten",
    ] {
        let response = send(&app, "GET", uri, None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {}", uri);

        let json = get_body_json(response).await;
        assert!(
            json["error"]
                .as_str()
                .unwrap()
                .starts_with("Invalid query parameters"),
            "uri {}",
            uri
        );
    }
}

#[tokio::test]
async fn test_users_are_isolated() {
    let app = setup_test_app();

    let created = create_expense(&app, Some("alice"), "Food", 30.0, "2024-02-02").await;
    let id = created["id"].as_i64().unwrap();

    let response = send(&app, "GET", "/api/analytics", Some("bob"), None).await;
    let json = get_body_json(response).await;
    assert_eq!(json["kpis"]["totalExpense"], 0.0);

    let response = send(&app, "GET", &format!("/api/expense/{}", id), Some("bob"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "GET", "/api/balance", Some("alice"), None).await;
    let json = get_body_json(response).await;
    assert_eq!(json["total_expense"], 30.0);
}
