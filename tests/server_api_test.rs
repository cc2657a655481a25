//! HTTP API tests
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; the LLM
//! is a wiremock OpenAI endpoint and the database is in-memory SQLite.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sql_analyst::prelude::*;
use sql_analyst::prompt::CANNOT_ANSWER_SENTINEL;
use sql_analyst::providers::openai::{OpenAiClient, OpenAiConfig};
use sql_analyst::server::router;
use sql_analyst::sql::REJECTION_MESSAGE;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seeded_executor(rows: usize) -> SqlExecutor {
    let executor = SqlExecutor::in_memory().unwrap();
    executor.execute("CREATE TABLE X (id INTEGER PRIMARY KEY, label TEXT)");
    for i in 0..rows {
        let result = executor.execute(&format!("INSERT INTO X (label) VALUES ('row {i}')"));
        assert!(!result.is_error());
    }
    executor
}

async fn openai_replying(content: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })))
        .mount(&server)
        .await;
    server
}

fn service(llm: Option<&MockServer>, executor: SqlExecutor) -> Arc<AnalystService> {
    let candidates = llm
        .map(|server| {
            let client = OpenAiClient::new(
                OpenAiConfig::new("sk-test").with_base_url(server.uri()),
                reqwest::Client::new(),
            );
            ProviderCandidate::ready("openai", ProviderStrategy::sql(client))
        })
        .into_iter();
    let (manager, _) = ProviderManager::initialize(candidates);
    Arc::new(AnalystService::new(
        Arc::new(manager),
        Ok(SemanticModel::from_text("tables:\n  - name: X\n    columns: [id, label]\n")),
        Arc::new(executor),
        "openai",
    ))
}

async fn post(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn question_to_rows_end_to_end() {
    let llm = openai_replying("```sql\nSELECT COUNT(*) AS count FROM X;\n```").await;
    let app = router(service(Some(&llm), seeded_executor(5)));

    let (status, generated) = post(
        app.clone(),
        "/api/generate_sql",
        json!({"question": "How many rows are in table X?"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{generated}");
    assert_eq!(generated["generated_sql"], "SELECT COUNT(*) AS count FROM X;");
    assert_eq!(generated["user_question"], "How many rows are in table X?");
    assert_eq!(generated["warnings"], json!([]));
    assert_eq!(generated["request_id"].as_str().unwrap().len(), 36);

    let (status, executed) = post(
        app,
        "/api/execute_sql",
        json!({"sql_query": generated["generated_sql"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(executed, json!({"data": [{"count": 5}], "error": null}));
}

#[tokio::test]
async fn rejection_is_400_with_fixed_detail() {
    let llm = openai_replying(CANNOT_ANSWER_SENTINEL).await;
    let app = router(service(Some(&llm), seeded_executor(0)));
    let (status, body) = post(
        app,
        "/api/generate_sql",
        json!({"question": "What is the weather?", "user_name": "default_user"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": REJECTION_MESSAGE}));
}

#[tokio::test]
async fn unknown_provider_is_400_listing_available() {
    let llm = openai_replying("SELECT 1;").await;
    let app = router(service(Some(&llm), seeded_executor(0)));
    let (status, body) = post(
        app,
        "/api/generate_sql",
        json!({"question": "q", "provider": "unknown_provider"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("unknown_provider"), "{detail}");
    assert!(detail.contains(r#"Available providers: ["openai"]"#), "{detail}");
}

#[tokio::test]
async fn zero_providers_still_serves() {
    let app = router(service(None, seeded_executor(0)));
    let (status, body) = post(app.clone(), "/api/generate_sql", json!({"question": "q"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().ends_with("Available providers: []"));

    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn provider_failure_is_500() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;
    let app = router(service(Some(&server), seeded_executor(0)));
    let (status, body) = post(app, "/api/generate_sql", json!({"question": "q"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("upstream unavailable"));
}

#[tokio::test]
async fn invalid_body_is_400() {
    let app = router(service(None, seeded_executor(0)));
    let (status, body) = post(app.clone(), "/api/generate_sql", json!({"question": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().starts_with("Invalid input"));

    let (status, _) = post(app, "/api/generate_sql", json!({"provider": "openai"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn execution_error_is_reported_in_body_and_connection_recovers() {
    let app = router(service(None, seeded_executor(2)));
    let (status, body) = post(
        app.clone(),
        "/api/execute_sql",
        json!({"sql_query": "SELEKT 1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], Value::Null);
    assert!(body["error"].as_str().unwrap().contains("syntax error"), "{body}");
    assert!(body.get("detail").is_none());

    let (status, body) = post(
        app,
        "/api/execute_sql",
        json!({"sql_query": "SELECT label FROM X ORDER BY id"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"data": [{"label": "row 0"}, {"label": "row 1"}], "error": null})
    );
}

#[tokio::test]
async fn multi_statement_input_is_refused() {
    let app = router(service(None, seeded_executor(1)));
    let (status, body) = post(
        app.clone(),
        "/api/execute_sql",
        json!({"sql_query": "DELETE FROM X; DROP TABLE X"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"data": null, "error": sql_analyst::executor::MULTIPLE_STATEMENTS})
    );

    let (_, body) = post(
        app,
        "/api/execute_sql",
        json!({"sql_query": "SELECT COUNT(*) AS n FROM X"}),
    )
    .await;
    assert_eq!(body["data"], json!([{"n": 1}]));
}

#[tokio::test]
async fn malformed_execute_body_is_400() {
    let app = router(service(None, seeded_executor(0)));
    let (status, body) = post(app, "/api/execute_sql", json!({"sql": "SELECT 1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn mutation_reports_status_row() {
    let app = router(service(None, seeded_executor(3)));
    let (status, body) = post(
        app,
        "/api/execute_sql",
        json!({"sql_query": "DELETE FROM X WHERE id > 1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"data": [{"status": "success", "rows_affected": 2}], "error": null})
    );
}

#[tokio::test]
async fn providers_and_schema_endpoints() {
    let llm = openai_replying("SELECT 1;").await;
    let app = router(service(Some(&llm), seeded_executor(0)));

    let (status, body) = get(app.clone(), "/api/providers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default_provider"], "openai");
    assert_eq!(body["providers"][0]["id"], "openai");
    assert_eq!(body["providers"][0]["name"], "OpenAI");
    assert_eq!(body["providers"][0]["capability"], "sql");
    assert_eq!(body["providers"][0]["available"], true);

    let (status, body) = get(app, "/api/schema").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["schema"].as_str().unwrap().starts_with("CREATE TABLE X"));
}
