use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use chrono::{DateTime, Utc};
use remit_account::{Account, AccountError, AccountRepository, AccountService, NewAccount, RetryPolicy};
use remit_activity::{ActivityService, NewActivity};
use remit_database::{SurrealAccountRepository, SurrealActivityRepository};
use remit_kernel::pagination::{Page, PageRequest};
use remit_server::{ApiState, DOCS_PATH, OPENAPI_PATH, Server};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// A fresh server over its own in-memory database.
async fn app() -> Router {
    Server::builder().build().await.expect("server should build over mem://").router()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

async fn register(app: &Router, number: &str, name: &str) -> Value {
    let (status, json) = send(
        app,
        Method::POST,
        "/api/accounts",
        Some(json!({ "accountNumber": number, "accountName": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    json["data"].clone()
}

async fn deposit(app: &Router, number: &str, amount: i64) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/transactions/deposit",
        Some(json!({ "accountNumber": number, "amount": amount })),
    )
    .await
}

fn assert_failure(json: &Value, code: &str) {
    assert_eq!(json["status"]["success"], false, "{json}");
    assert_eq!(json["status"]["code"], code, "{json}");
    assert!(json["data"].is_null());
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn registers_and_fetches_an_account() {
    let app = app().await;

    let created = register(&app, "1002-001", "Kim").await;
    assert_eq!(created["accountNumber"], "1002-001");
    assert_eq!(created["accountName"], "Kim");
    assert_eq!(created["balance"], 0);
    assert!(created["id"].as_i64().is_some());
    assert!(created["createdAt"].is_string());

    let (status, json) = send(&app, Method::GET, "/api/accounts/1002-001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"]["code"], "SUCCESS");
    assert_eq!(json["data"]["id"], created["id"]);
}

#[tokio::test]
async fn ids_increase_with_each_registration() {
    let app = app().await;

    let first = register(&app, "AAA-1", "First").await;
    let second = register(&app, "AAA-2", "Second").await;

    assert!(second["id"].as_i64() > first["id"].as_i64());
}

#[tokio::test]
async fn unknown_account_is_not_found() {
    let app = app().await;

    let (status, json) = send(&app, Method::GET, "/api/accounts/NOPE-1", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_failure(&json, "ACCOUNT_001");
    assert!(json["status"]["message"].is_null());
}

#[tokio::test]
async fn duplicate_number_is_rejected() {
    let app = app().await;
    register(&app, "DUP-1", "Kim").await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/accounts",
        Some(json!({ "accountNumber": "DUP-1", "accountName": "Lee" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_failure(&json, "ACCOUNT_002");
}

#[tokio::test]
async fn invalid_registration_lists_every_violation() {
    let app = app().await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/accounts",
        Some(json!({ "accountNumber": "", "accountName": " " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_failure(&json, "VALIDATION_ERROR");
    assert_eq!(json["message"], "Account number is required., Account name is required.");
    assert_eq!(json["status"]["message"], json["message"]);
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let app = app().await;

    let request = Request::post("/api/transactions/deposit")
        .header("content-type", "application/json")
        .body(Body::from("{\"accountNumber\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_failure(&json, "VALIDATION_ERROR");
}

#[tokio::test]
async fn deposit_and_withdraw_update_balance() {
    let app = app().await;
    register(&app, "BAL-1", "Kim").await;

    let (status, json) = deposit(&app, "BAL-1", 50_000).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["balance"], 50_000);

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/transactions/withdraw",
        Some(json!({ "accountNumber": "BAL-1", "amount": 20_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["balance"], 30_000);
}

#[tokio::test]
async fn zero_amount_is_rejected_before_the_domain() {
    let app = app().await;
    register(&app, "ZERO-1", "Kim").await;

    let (status, json) = deposit(&app, "ZERO-1", 0).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_failure(&json, "VALIDATION_ERROR");
    assert_eq!(json["message"], "Amount must be greater than 0.");
}

#[tokio::test]
async fn overdraft_is_rejected() {
    let app = app().await;
    register(&app, "LOW-1", "Kim").await;
    deposit(&app, "LOW-1", 1_000).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/transactions/withdraw",
        Some(json!({ "accountNumber": "LOW-1", "amount": 5_000 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_failure(&json, "ACCOUNT_004");
}

#[tokio::test]
async fn daily_withdraw_limit_is_enforced() {
    let app = app().await;
    register(&app, "LIM-1", "Kim").await;
    deposit(&app, "LIM-1", 2_000_000).await;

    let withdraw = |amount: i64| {
        let app = app.clone();
        async move {
            send(
                &app,
                Method::POST,
                "/api/transactions/withdraw",
                Some(json!({ "accountNumber": "LIM-1", "amount": amount })),
            )
            .await
        }
    };

    let (status, _) = withdraw(600_000).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = withdraw(500_000).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_failure(&json, "ACCOUNT_005");

    let (_, json) = send(&app, Method::GET, "/api/accounts/LIM-1", None).await;
    assert_eq!(json["data"]["balance"], 1_400_000);
}

#[tokio::test]
async fn transfer_charges_fee_to_sender() {
    let app = app().await;
    register(&app, "FROM-1", "Kim").await;
    register(&app, "TO-1", "Lee").await;
    deposit(&app, "FROM-1", 100_000).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/transactions/transfer",
        Some(json!({ "fromAccountNumber": "FROM-1", "toAccountNumber": "TO-1", "amount": 10_000 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["fee"], 100);
    assert_eq!(json["data"]["fromAccount"]["balance"], 89_900);
    assert_eq!(json["data"]["toAccount"]["balance"], 10_000);

    let (_, history) = send(&app, Method::GET, "/api/accounts/FROM-1/activities", None).await;
    let activities = history["data"].as_array().unwrap();
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0]["activityType"], "TRANSFER_OUT");
    assert_eq!(activities[0]["fee"], 100);
    assert_eq!(activities[0]["balanceAfter"], 89_900);
    assert_eq!(activities[0]["referenceAccountNumber"], "TO-1");
    assert_eq!(activities[1]["activityType"], "DEPOSIT");

    let (_, history) = send(&app, Method::GET, "/api/activities/TO-1", None).await;
    let incoming = &history["data"][0];
    assert_eq!(incoming["activityType"], "TRANSFER_IN");
    assert_eq!(incoming["fee"], 0);
    assert_eq!(incoming["referenceAccountNumber"], "FROM-1");
}

#[tokio::test]
async fn transfer_to_self_is_rejected() {
    let app = app().await;
    register(&app, "SELF-1", "Kim").await;
    deposit(&app, "SELF-1", 10_000).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/transactions/transfer",
        Some(json!({ "fromAccountNumber": "SELF-1", "toAccountNumber": "SELF-1", "amount": 1_000 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_failure(&json, "ACCOUNT_007");
}

#[tokio::test]
async fn transfer_to_missing_account_is_not_found() {
    let app = app().await;
    register(&app, "SOLO-1", "Kim").await;
    deposit(&app, "SOLO-1", 10_000).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/transactions/transfer",
        Some(json!({ "fromAccountNumber": "SOLO-1", "toAccountNumber": "GONE-1", "amount": 1_000 })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_failure(&json, "ACCOUNT_001");
}

#[tokio::test]
async fn deleted_account_disappears_but_keeps_its_number() {
    let app = app().await;
    register(&app, "DEL-1", "Kim").await;

    let (status, json) = send(&app, Method::DELETE, "/api/accounts/DEL-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"]["success"], true);
    assert!(json["data"].is_null());

    let (status, _) = send(&app, Method::GET, "/api/accounts/DEL-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/activities/DEL-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/accounts",
        Some(json!({ "accountNumber": "DEL-1", "accountName": "Again" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_failure(&json, "ACCOUNT_002");
}

#[tokio::test]
async fn lists_accounts_page_by_page() {
    let app = app().await;
    for number in ["PG-1", "PG-2", "PG-3"] {
        register(&app, number, "Kim").await;
    }

    let (status, json) = send(&app, Method::GET, "/api/accounts?page=0&size=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let page = &json["data"];
    assert_eq!(page["content"].as_array().map(Vec::len), Some(2));
    assert_eq!(page["content"][0]["accountNumber"], "PG-1");
    assert_eq!(page["totalElements"], 3);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["first"], true);

    let (_, json) = send(&app, Method::GET, "/api/accounts?page=1&size=2", None).await;
    assert_eq!(json["data"]["content"][0]["accountNumber"], "PG-3");
    assert_eq!(json["data"]["last"], true);
}

#[tokio::test]
async fn out_of_range_page_size_is_an_invalid_argument() {
    let app = app().await;

    let (status, json) = send(&app, Method::GET, "/api/accounts?size=0", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_failure(&json, "INVALID_ARGUMENT");
}

#[tokio::test]
async fn health_and_docs_are_served() {
    let app = app().await;

    let (status, json) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "up");

    let (status, json) = send(&app, Method::GET, OPENAPI_PATH, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["info"]["title"], "Remit API");
    assert!(json["paths"]["/api/transactions/transfer"]["post"].is_object());
    assert!(json["paths"]["/api/accounts/{accountNumber}"]["delete"].is_object());

    let response =
        app.oneshot(Request::get(DOCS_PATH).body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Reads through to the database but loses every ledger commit to another writer.
#[derive(Debug)]
struct LosingRepository(SurrealAccountRepository);

#[async_trait]
impl AccountRepository for LosingRepository {
    async fn find_by_number(&self, account_number: &str) -> Result<Option<Account>, AccountError> {
        self.0.find_by_number(account_number).await
    }

    async fn exists_by_number(&self, account_number: &str) -> Result<bool, AccountError> {
        self.0.exists_by_number(account_number).await
    }

    async fn insert(&self, account: &NewAccount, now: DateTime<Utc>) -> Result<Account, AccountError> {
        self.0.insert(account, now).await
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<Account>, AccountError> {
        self.0.find_page(request).await
    }

    async fn commit(&self, _: &[Account], _: &[NewActivity]) -> Result<Vec<Account>, AccountError> {
        Err(AccountError::Conflict { message: "stored version no longer matches".into(), context: None })
    }
}

#[tokio::test]
async fn exhausted_retries_answer_with_a_conflict() {
    let server = Server::builder().build().await.expect("server should build over mem://");
    let state = server.state();
    let accounts = AccountService::builder(
        Arc::new(LosingRepository(SurrealAccountRepository::new(state.database.clone()))),
        ActivityService::with_repository(Arc::new(SurrealActivityRepository::new(
            state.database.clone(),
        ))),
    )
    .retry(RetryPolicy::new(2, Duration::from_millis(1)))
    .build();
    let state = ApiState::builder()
        .config(state.config.clone())
        .db(state.database.clone())
        .register_slice(accounts.into_initialized())
        .build()
        .unwrap();
    let app = Server::from_state(state).router();
    register(&app, "1002-001", "Kim").await;

    let (status, json) = deposit(&app, "1002-001", 1_000).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_failure(&json, "OPTIMISTIC_LOCK_CONFLICT");
    let (_, json) = send(&app, Method::GET, "/api/accounts/1002-001", None).await;
    assert_eq!(json["data"]["balance"], 0);
}
