//! CV analysis engine: normalization, duration/skill/education extraction and scoring.
//!
//! Every extractor is a pure function of the input text, the keyword tables and the
//! reference year. `CvAnalyzer` is built once at startup and shared read-only. It works on
//! the text it is given; callers normalize first so that the report and the salary
//! features see the same input.

pub mod duration;
pub mod education;
pub mod handlers;
pub mod keywords;
pub mod normalize;
pub mod scoring;
pub mod skills;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::duration::DurationExtractor;
use crate::engine::education::{EducationRecord, EducationScorer};
use crate::engine::keywords::KeywordTables;
use crate::engine::scoring::{ScoreAggregator, ScoreBreakdown};
use crate::engine::skills::SkillMatcher;

/// Everything the engine reports for one CV, apart from the salary prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvReport {
    pub scores: ScoreBreakdown,
    pub total_score: u32,
    /// Distinct matched skill keywords.
    pub skills_found: Vec<String>,
    /// Shared-path estimate, rounded to one decimal.
    pub experience_years: f64,
    pub education_info: EducationRecord,
}

pub struct CvAnalyzer {
    tables: Arc<KeywordTables>,
    aggregator: ScoreAggregator,
    skills: SkillMatcher,
    education: EducationScorer,
    duration: DurationExtractor,
}

impl CvAnalyzer {
    pub fn new(tables: Arc<KeywordTables>) -> Self {
        Self {
            aggregator: ScoreAggregator::new(Arc::clone(&tables)),
            skills: SkillMatcher,
            education: EducationScorer::new(&tables),
            duration: DurationExtractor::shared(),
            tables,
        }
    }

    pub fn tables(&self) -> &Arc<KeywordTables> {
        &self.tables
    }

    pub fn analyze(&self, text: &str, reference_year: i32) -> CvReport {
        let scores = self.aggregator.aggregate(text, reference_year);
        let skills_found = self
            .skills
            .match_categories(text, &self.tables.skill_categories)
            .matched;
        let years = self.duration.estimate(text, reference_year);

        CvReport {
            total_score: scores.total_score(),
            scores,
            skills_found,
            experience_years: round_to(years, 1),
            education_info: self.education.score(text),
        }
    }
}

/// Rounds to `decimals` places, halves to even (`0.25` -> `0.2`, `0.625` -> `0.62`).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
