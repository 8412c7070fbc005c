//! Score aggregation: skills, experience and education axes for one CV.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::duration::DurationExtractor;
use crate::engine::education::EducationScorer;
use crate::engine::keywords::KeywordTables;
use crate::engine::skills::SkillMatcher;

pub const MAX_SKILLS_SCORE: u32 = 50;

/// Per-axis scores. The total is an unbounded sum; see [`ScoreBreakdown::total_score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// `0..=50`
    pub skills: u32,
    /// One of 5, 10, 15, 20, 25, 30.
    pub experience: u32,
    /// `0..=20`
    pub education: u32,
}

impl ScoreBreakdown {
    pub fn total_score(&self) -> u32 {
        self.skills + self.experience + self.education
    }
}

/// Maps total years of experience to the experience axis. Never returns 0.
pub fn experience_points(years: f64) -> u32 {
    match years {
        y if y >= 10.0 => 30,
        y if y >= 5.0 => 25,
        y if y >= 3.0 => 20,
        y if y >= 1.0 => 15,
        y if y >= 0.5 => 10,
        _ => 5,
    }
}

pub struct ScoreAggregator {
    tables: Arc<KeywordTables>,
    skills: SkillMatcher,
    duration: DurationExtractor,
    education: EducationScorer,
}

impl ScoreAggregator {
    pub fn new(tables: Arc<KeywordTables>) -> Self {
        let education = EducationScorer::new(&tables);
        Self {
            tables,
            skills: SkillMatcher,
            duration: DurationExtractor::for_scoring(),
            education,
        }
    }

    pub fn aggregate(&self, text: &str, reference_year: i32) -> ScoreBreakdown {
        let raw_matches = self
            .skills
            .match_categories(text, &self.tables.skill_categories)
            .raw_count;
        let skills = u32::try_from(raw_matches)
            .unwrap_or(u32::MAX)
            .min(MAX_SKILLS_SCORE);

        let years = self.duration.estimate(text, reference_year);

        ScoreBreakdown {
            skills,
            experience: experience_points(years),
            education: self.education.points(text),
        }
    }
}
