use std::sync::Arc;

use crate::config::Config;
use crate::engine::CvAnalyzer;
use crate::salary::predictor::SalaryPredictor;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<CvAnalyzer>,
    /// Runs degraded (every prediction `unknown`) when no model artifacts were found.
    pub predictor: Arc<SalaryPredictor>,
    pub config: Config,
}
