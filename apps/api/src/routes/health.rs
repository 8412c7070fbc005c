use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version, and whether a salary model is loaded.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cv-evaluation",
        "model_loaded": state.predictor.is_model_loaded(),
        "skill_keywords": state.analyzer.tables().skill_keyword_count()
    }))
}
