use axum::{extract::State, Json};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::normalize::normalize;
use crate::engine::CvReport;
use crate::errors::AppError;
use crate::salary::predictor::SalaryPrediction;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub report: CvReport,
    pub salary_prediction: SalaryPrediction,
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let length = text.chars().count();
    if length > state.config.max_text_chars {
        return Err(AppError::Validation(format!(
            "text is {length} characters; the limit is {}",
            state.config.max_text_chars
        )));
    }

    let reference_year = state
        .config
        .reference_year
        .unwrap_or_else(|| chrono::Utc::now().year());

    // Report and salary features are computed from the same normalized text.
    let text = normalize(text);
    let report = state.analyzer.analyze(&text, reference_year);
    let salary_prediction = state.predictor.predict_salary(&text, reference_year);

    info!(
        total_score = report.total_score,
        salary_group = %salary_prediction.salary_group,
        "CV analyzed"
    );

    Ok(Json(AnalyzeResponse {
        report,
        salary_prediction,
    }))
}
