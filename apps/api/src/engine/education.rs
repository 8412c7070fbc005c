//! Education scoring: highest attained level plus field relevance.
//!
//! The numeric score and the reported label use different rules. The score takes the
//! maximum points over every level keyword found, while the label is the first level in
//! table order that appears in the text. With a table ordered by descending points the
//! two agree; a reordered table can make them disagree, and that is preserved.

use serde::{Deserialize, Serialize};

use crate::engine::keywords::{EducationLevel, KeywordTables};
use crate::engine::normalize::title_case;

/// Label reported when no level or field keyword is found.
pub const UNSPECIFIED: &str = "Unspecified";

pub const FIELD_RELEVANCE_POINTS: u32 = 5;
pub const MAX_EDUCATION_SCORE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub level: String,
    pub field: String,
    /// 0 or 5.
    pub relevance_score: u32,
}

#[derive(Debug, Clone)]
pub struct EducationScorer {
    levels: Vec<EducationLevel>,
    relevant_fields: Vec<String>,
}

impl EducationScorer {
    pub fn new(tables: &KeywordTables) -> Self {
        Self {
            levels: tables.education_levels.clone(),
            relevant_fields: tables.relevant_fields.clone(),
        }
    }

    /// Reported education level and field.
    pub fn score(&self, text: &str) -> EducationRecord {
        let text = text.to_lowercase();

        let level = self
            .levels
            .iter()
            .find(|l| text.contains(l.keyword.as_str()))
            .map_or_else(|| UNSPECIFIED.to_string(), |l| title_case(&l.keyword));

        let (field, relevance_score) = match self.first_relevant_field(&text) {
            Some(field) => (title_case(field), FIELD_RELEVANCE_POINTS),
            None => (UNSPECIFIED.to_string(), 0),
        };

        EducationRecord {
            level,
            field,
            relevance_score,
        }
    }

    /// Numeric education axis: `min(max level points + field relevance, 20)`.
    pub fn points(&self, text: &str) -> u32 {
        let text = text.to_lowercase();

        let max_level = self
            .levels
            .iter()
            .filter(|l| text.contains(l.keyword.as_str()))
            .map(|l| l.points)
            .max()
            .unwrap_or(0);

        let relevance = if self.first_relevant_field(&text).is_some() {
            FIELD_RELEVANCE_POINTS
        } else {
            0
        };

        (max_level + relevance).min(MAX_EDUCATION_SCORE)
    }

    fn first_relevant_field<'a>(&'a self, text: &str) -> Option<&'a str> {
        self.relevant_fields
            .iter()
            .map(String::as_str)
            .find(|field| text.contains(field))
    }
}
