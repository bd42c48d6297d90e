/// HTTP API integration tests
///
/// Exercise the router end to end with in-memory requests: the structured
/// success/error shapes, the untrained-state contract, payload coercion and
/// the train -> predict flow.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use fraud_detection_service::{
    api::{build_router, AppState},
    config::ModelConfig,
    ml::ModelService,
    models::FEATURE_NAMES,
};
use http_body_util::BodyExt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn write_dataset(n_legit: usize, n_fraud: usize) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut cols: Vec<&str> = FEATURE_NAMES.to_vec();
    cols.push("TX_FRAUD");
    writeln!(file, "{}", cols.join(",")).unwrap();
    for i in 0..n_legit {
        let amount = 14.0 + (i % 30) as f64;
        writeln!(
            file,
            "{amount},0,0,1,5,21,{amount},{amount},{amount},2,12,44,0.01,0.02,0.02,0"
        )
        .unwrap();
    }
    for i in 0..n_fraud {
        let amount = 880.0 + (i % 30) as f64;
        writeln!(
            file,
            "{amount},1,1,9,44,135,{amount},{amount},{amount},8,41,155,0.88,0.8,0.75,1"
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

fn app_for(path: PathBuf) -> Router {
    let service = Arc::new(ModelService::new(
        path,
        ModelConfig {
            n_trees: 20,
            max_depth: 10,
            seed: 42,
            test_size: 0.2,
        },
    ));
    build_router(AppState::new(service))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_predict(app: &Router, body: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_landing_page() {
    let file = write_dataset(10, 5);
    let app = app_for(file.path().to_path_buf());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Fraud Detection Service"));
}

#[tokio::test]
async fn test_health_check() {
    let file = write_dataset(10, 5);
    let app = app_for(file.path().to_path_buf());

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_predict_before_train_returns_error_shape() {
    let file = write_dataset(10, 5);
    let app = app_for(file.path().to_path_buf());

    let (status, body) = post_predict(&app, r#"{"TX_AMOUNT": 10.0}"#).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("/train"));
}

#[tokio::test]
async fn test_train_success_response() {
    let file = write_dataset(160, 40);
    let app = app_for(file.path().to_path_buf());

    let (status, body) = get(&app, "/train").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(!body["message"].as_str().unwrap().is_empty());
    assert!(body["train_accuracy"].is_f64());
    assert!(body["test_accuracy"].is_f64());
    assert!(body["classification_report"]
        .as_str()
        .unwrap()
        .contains("precision"));

    let stats = &body["data_stats"];
    let total = stats["total_transactions"].as_u64().unwrap();
    let fraud = stats["fraud_transactions"].as_u64().unwrap();
    let legit = stats["legitimate_transactions"].as_u64().unwrap();
    assert_eq!(fraud + legit, total);
    assert!((stats["fraud_percentage"].as_f64().unwrap() - 20.0).abs() < 1e-9);

    let matrix = body["confusion_matrix"].as_array().unwrap();
    assert_eq!(matrix.len(), 2);
    let matrix_total: u64 = matrix
        .iter()
        .flat_map(|row| row.as_array().unwrap().iter())
        .map(|cell| cell.as_u64().unwrap())
        .sum();
    assert_eq!(matrix_total, total);
}

#[tokio::test]
async fn test_train_with_missing_dataset() {
    let app = app_for(PathBuf::from("nowhere/train.csv"));

    let (status, body) = get(&app, "/train").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_train_then_predict_flow() {
    let file = write_dataset(160, 40);
    let app = app_for(file.path().to_path_buf());

    let (status, _) = get(&app, "/train").await;
    assert_eq!(status, StatusCode::OK);

    let payload = r#"{
        "TX_AMOUNT": 890.0,
        "TX_DURING_WEEKEND": 1,
        "TX_DURING_NIGHT": 1,
        "CUSTOMER_ID_NB_TX_1DAY_WINDOW": 9.0,
        "CUSTOMER_ID_NB_TX_7DAY_WINDOW": 44.0,
        "CUSTOMER_ID_NB_TX_30DAY_WINDOW": 135.0,
        "CUSTOMER_ID_AVG_AMOUNT_1DAY_WINDOW": 890.0,
        "CUSTOMER_ID_AVG_AMOUNT_7DAY_WINDOW": 890.0,
        "CUSTOMER_ID_AVG_AMOUNT_30DAY_WINDOW": 890.0,
        "TERMINAL_ID_NB_TX_1DAY_WINDOW": 8.0,
        "TERMINAL_ID_NB_TX_7DAY_WINDOW": 41.0,
        "TERMINAL_ID_NB_TX_30DAY_WINDOW": 155.0,
        "TERMINAL_ID_RISK_1DAY_WINDOW": 0.88,
        "TERMINAL_ID_RISK_7DAY_WINDOW": 0.8,
        "TERMINAL_ID_RISK_30DAY_WINDOW": 0.75
    }"#;
    let (status, body) = post_predict(&app, payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let prediction = body["prediction"].as_u64().unwrap();
    assert!(prediction <= 1);

    let fraud_probability = body["fraud_probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&fraud_probability));

    let confidence = body["confidence"].as_f64().unwrap();
    assert!(confidence >= 0.5);

    assert_eq!(body["is_fraud"].as_bool().unwrap(), prediction == 1);

    let importance = body["feature_importance"].as_object().unwrap();
    assert_eq!(importance.len(), FEATURE_NAMES.len());
    for name in FEATURE_NAMES {
        assert!(importance.contains_key(name));
    }
    let sum: f64 = importance.values().map(|v| v.as_f64().unwrap()).sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_predict_with_partial_payload_defaults_to_zero() {
    let file = write_dataset(160, 40);
    let app = app_for(file.path().to_path_buf());
    get(&app, "/train").await;

    let (status, body) = post_predict(&app, r#"{"TX_AMOUNT": 15.0}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body["prediction"].as_u64().unwrap() <= 1);
}

#[tokio::test]
async fn test_predict_with_non_numeric_amount() {
    let file = write_dataset(160, 40);
    let app = app_for(file.path().to_path_buf());
    get(&app, "/train").await;

    let (status, body) = post_predict(&app, r#"{"TX_AMOUNT": "not-a-number"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_predict_with_invalid_json_body() {
    let file = write_dataset(10, 5);
    let app = app_for(file.path().to_path_buf());

    let (status, body) = post_predict(&app, "{{{ not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_model_info_endpoint() {
    let file = write_dataset(160, 40);
    let app = app_for(file.path().to_path_buf());

    let (status, body) = get(&app, "/model").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trained"], false);
    assert_eq!(body["n_features"], 15);
    assert_eq!(body["n_trees"], 20);

    get(&app, "/train").await;

    let (_, body) = get(&app, "/model").await;
    assert_eq!(body["trained"], true);
    assert!(body["trained_at"].is_string());
    assert!(body["test_accuracy"].is_f64());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let file = write_dataset(160, 40);
    let app = app_for(file.path().to_path_buf());
    let _ = fraud_detection_service::metrics::init_metrics();

    get(&app, "/train").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("fraud_detection_service_training_runs_total"));
}
