use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics::{
    gather_metrics, PREDICTIONS_TOTAL, PREDICTION_DURATION_SECONDS, TRAINING_DURATION_SECONDS,
    TRAINING_RUNS_TOTAL,
};
use crate::ml::ModelInfo;
use crate::models::TransactionRecord;
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

/// Landing page
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Train the scaler/classifier pair from the configured dataset
pub async fn train(State(state): State<AppState>) -> Result<Json<TrainResponse>> {
    let started = Instant::now();
    let result = state.model.train().await;
    TRAINING_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());

    let report = match result {
        Ok(report) => {
            TRAINING_RUNS_TOTAL.with_label_values(&["success"]).inc();
            report
        }
        Err(e) => {
            TRAINING_RUNS_TOTAL.with_label_values(&["error"]).inc();
            return Err(e);
        }
    };

    let matrix = report.confusion_matrix;
    Ok(Json(TrainResponse {
        status: "success".to_string(),
        message: "Models trained successfully".to_string(),
        train_accuracy: report.train_accuracy,
        test_accuracy: report.test_accuracy,
        classification_report: report.classification_report,
        data_stats: DataStats {
            total_transactions: report.test_size as u64,
            fraud_transactions: matrix[1][0] + matrix[1][1],
            legitimate_transactions: matrix[0][0] + matrix[0][1],
            fraud_percentage: report.stats.fraud_percentage,
            avg_transaction_amount: report.stats.avg_transaction_amount,
            weekend_transactions_pct: report.stats.weekend_transactions_pct,
            night_transactions_pct: report.stats.night_transactions_pct,
        },
        confusion_matrix: matrix,
    }))
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub status: String,
    pub message: String,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub classification_report: String,
    pub data_stats: DataStats,
    pub confusion_matrix: [[u64; 2]; 2],
}

#[derive(Debug, Serialize)]
pub struct DataStats {
    pub total_transactions: u64,
    pub fraud_transactions: u64,
    pub legitimate_transactions: u64,
    pub fraud_percentage: f64,
    pub avg_transaction_amount: f64,
    pub weekend_transactions_pct: f64,
    pub night_transactions_pct: f64,
}

/// Score a single transaction.
///
/// The body is parsed by hand so every malformed payload lands in the
/// structured error shape instead of a framework rejection.
pub async fn predict(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<PredictResponse>> {
    let started = Instant::now();
    let result = predict_inner(&state, &body).await;
    PREDICTION_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());

    match result {
        Ok(response) => {
            PREDICTIONS_TOTAL.with_label_values(&["success"]).inc();
            Ok(Json(response))
        }
        Err(e) => {
            PREDICTIONS_TOTAL.with_label_values(&["error"]).inc();
            Err(e)
        }
    }
}

async fn predict_inner(state: &AppState, body: &str) -> Result<PredictResponse> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AppError::Validation(format!("invalid JSON body: {e}")))?;
    let record = TransactionRecord::from_json(&value)?;

    let outcome = state.model.predict(&record.to_feature_vector()).await?;

    Ok(PredictResponse {
        status: "success".to_string(),
        prediction: outcome.label as u8,
        fraud_probability: outcome.fraud_probability,
        is_fraud: outcome.label == 1,
        confidence: outcome.confidence,
        feature_importance: outcome.feature_importance,
    })
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub status: String,
    pub prediction: u8,
    pub fraud_probability: f64,
    pub is_fraud: bool,
    pub confidence: f64,
    pub feature_importance: HashMap<String, f64>,
}

/// Current model metadata
pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.model.info().await)
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    (StatusCode::OK, gather_metrics())
}
