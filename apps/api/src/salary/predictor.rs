//! Salary prediction: feature row → classifier → label → human-readable range.
//!
//! Never fails. Without artifacts the predictor runs degraded and answers `unknown`;
//! any inference error becomes an `error` prediction with the message in `salary_range`.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::keywords::KeywordTables;
use crate::engine::round_to;
use crate::salary::classifier::{load_artifacts, ClassifierArtifacts, ClassifierError};
use crate::salary::features::{FeatureRow, SalaryFeatureBuilder};

pub const MODEL_UNAVAILABLE: &str = "Model not available";
pub const UNKNOWN_RANGE: &str = "Unknown range";

const LABEL_RANGES: &[(&str, &str)] = &[
    ("low", "$40,000–$60,000"),
    ("mid", "$60,000–$100,000"),
    ("high", "$100,000–$200,000"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryPrediction {
    /// `low`, `mid`, `high`, or `unknown` / `error`.
    pub salary_group: String,
    pub salary_range: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_count: Option<u32>,
}

impl SalaryPrediction {
    fn unavailable() -> Self {
        Self::bare("unknown", MODEL_UNAVAILABLE.to_string())
    }

    fn failed(err: &ClassifierError) -> Self {
        Self::bare("error", format!("Error: {err}"))
    }

    fn bare(group: &str, range: String) -> Self {
        Self {
            salary_group: group.to_string(),
            salary_range: range,
            confidence: 0.0,
            experience_years: None,
            job_type: None,
            location: None,
            key_skills: None,
            skill_count: None,
        }
    }
}

/// Heuristic confidence in `[0.4, 0.95]`; not a model probability.
pub fn confidence(experience_years: f64, skill_count: u32) -> f64 {
    (experience_years / 8.0 + f64::from(skill_count) / 15.0).clamp(0.4, 0.95)
}

pub fn salary_range(label: &str) -> &'static str {
    LABEL_RANGES
        .iter()
        .find(|(l, _)| *l == label)
        .map_or(UNKNOWN_RANGE, |(_, range)| range)
}

pub struct SalaryPredictor {
    features: SalaryFeatureBuilder,
    classifier: Option<ClassifierArtifacts>,
}

impl SalaryPredictor {
    pub fn new(tables: Arc<KeywordTables>, classifier: Option<ClassifierArtifacts>) -> Self {
        if classifier.is_none() {
            warn!("Salary predictor running without a model; predictions will be 'unknown'");
        }
        Self {
            features: SalaryFeatureBuilder::new(tables),
            classifier,
        }
    }

    /// Loads artifacts from `model_dir`; missing files leave the predictor degraded.
    pub fn from_dir(tables: Arc<KeywordTables>, model_dir: &Path) -> Result<Self, ClassifierError> {
        let classifier = load_artifacts(model_dir)?;
        Ok(Self::new(tables, classifier))
    }

    pub fn is_model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn predict_salary(&self, text: &str, reference_year: i32) -> SalaryPrediction {
        let Some(classifier) = &self.classifier else {
            return SalaryPrediction::unavailable();
        };

        let row = self.features.build(text, reference_year);
        debug!(?row, "Salary feature row");

        match classify(classifier, &row) {
            Ok(label) => SalaryPrediction {
                salary_range: salary_range(&label).to_string(),
                salary_group: label,
                confidence: round_to(confidence(row.experience_num, row.skill_count), 2),
                experience_years: Some(round_to(row.experience_num, 1)),
                job_type: Some(row.job_type),
                location: Some(row.location),
                key_skills: Some(row.key_skills),
                skill_count: Some(row.skill_count),
            },
            Err(err) => {
                warn!("Salary prediction failed: {err}");
                SalaryPrediction::failed(&err)
            }
        }
    }
}

fn classify(classifier: &ClassifierArtifacts, row: &FeatureRow) -> Result<String, ClassifierError> {
    let class_index = classifier.model.predict(row)?;
    Ok(classifier.encoder.inverse_transform(class_index)?.to_string())
}
