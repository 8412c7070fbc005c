//! Salary feature extraction: turns CV text into the fixed-shape row the classifier expects.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::engine::duration::DurationExtractor;
use crate::engine::keywords::{KeywordTables, LocationKeyword};
use crate::engine::normalize::title_case;
use crate::engine::skills::SkillMatcher;

pub const DEFAULT_JOB_TYPE: &str = "Software Development";
pub const DEFAULT_LOCATION: &str = "Istanbul";
pub const DEFAULT_JOB_TITLE: &str = "Software Engineer";
pub const MAX_KEY_SKILLS: usize = 10;

/// Job-title alternatives, tried in order; the first capture wins.
static JOB_TITLES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(data\s+scientist|data\s+analyst|data\s+engineer|data\s+visualization\s+specialist)",
        r"(software\s+engineer|developer|programmer|web\s+developer|mobile\s+developer)",
        r"(senior\s+\w+|\w+\s+manager|lead\s+\w+|principal\s+\w+)",
        r"(cto|ceo|director|head\s+of)",
        r"(product\s+manager|project\s+manager|technical\s+lead)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// One classifier input row. Field names are the column names the model was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub experience_num: f64,
    pub job_type: String,
    /// Up to ten matched skills joined by `", "`.
    pub key_skills: String,
    pub location: String,
    pub job_desig: String,
    pub skill_count: u32,
}

pub struct SalaryFeatureBuilder {
    tables: Arc<KeywordTables>,
    /// Location keywords sorted longest first so specific phrases beat bare city names.
    locations: Vec<LocationKeyword>,
    skills: SkillMatcher,
    duration: DurationExtractor,
}

impl SalaryFeatureBuilder {
    pub fn new(tables: Arc<KeywordTables>) -> Self {
        let mut locations = tables.locations.clone();
        // Stable sort: equal lengths keep table order.
        locations.sort_by(|a, b| b.keyword.chars().count().cmp(&a.keyword.chars().count()));
        Self {
            tables,
            locations,
            skills: SkillMatcher,
            duration: DurationExtractor::shared(),
        }
    }

    pub fn build(&self, text: &str, reference_year: i32) -> FeatureRow {
        let key_skills = self.key_skills(text);
        let skill_count = count_skills(&key_skills);

        FeatureRow {
            experience_num: self.duration.estimate(text, reference_year),
            job_type: self.job_type(text),
            key_skills,
            location: self.location(text),
            job_desig: job_title(text),
            skill_count,
        }
    }

    /// Category of the first job-type keyword, in table order, present in the text.
    pub fn job_type(&self, text: &str) -> String {
        let text = text.to_lowercase();
        self.tables
            .job_types
            .iter()
            .find(|j| text.contains(j.keyword.as_str()))
            .map_or_else(|| DEFAULT_JOB_TYPE.to_string(), |j| j.category.clone())
    }

    pub fn location(&self, text: &str) -> String {
        let text = text.to_lowercase();
        self.locations
            .iter()
            .find(|l| text.contains(l.keyword.as_str()))
            .map_or_else(|| DEFAULT_LOCATION.to_string(), |l| l.city.clone())
    }

    pub fn key_skills(&self, text: &str) -> String {
        let matches = self.skills.match_keywords(text, &self.tables.salary_skills);
        matches
            .matched
            .iter()
            .take(MAX_KEY_SKILLS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Title-cased job title from the first matching pattern, or the default title.
pub fn job_title(text: &str) -> String {
    let text = text.to_lowercase();
    JOB_TITLES
        .iter()
        .find_map(|re| re.captures(&text))
        .map_or_else(|| DEFAULT_JOB_TITLE.to_string(), |caps| title_case(&caps[1]))
}

/// Number of comma-separated entries in a `key_skills` string; 0 when empty.
pub fn count_skills(key_skills: &str) -> u32 {
    if key_skills.is_empty() {
        0
    } else {
        key_skills.split(", ").count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REF_YEAR: i32 = 2024;

    fn builder() -> SalaryFeatureBuilder {
        SalaryFeatureBuilder::new(Arc::new(KeywordTables::bundled().unwrap()))
    }

    #[test]
    fn test_job_type_first_keyword_in_table_order_wins() {
        let b = builder();
        // "machine learning" precedes "developer" in the table.
        assert_eq!(b.job_type("Developer working on machine learning"), "Analytics");
        assert_eq!(b.job_type("DevOps and cloud tooling"), "DevOps");
        assert_eq!(b.job_type("Hired as product owner"), "Product Management");
    }

    #[test]
    fn test_job_type_default() {
        assert_eq!(builder().job_type("barista"), DEFAULT_JOB_TYPE);
    }

    #[test]
    fn test_location_prefers_longer_phrase() {
        let b = builder();
        assert_eq!(b.location("Based in New York, NY"), "New York");
        assert_eq!(b.location("Ankara, Türkiye"), "Ankara");
        assert_eq!(b.location("Remote"), DEFAULT_LOCATION);
    }

    #[test]
    fn test_location_substring_matching_is_naive() {
        // "van" sits inside "advanced"; longer city names are tried first.
        assert_eq!(builder().location("advanced degree, London"), "London");
        assert_eq!(builder().location("advanced degree"), "Van");
    }

    #[test]
    fn test_job_title_patterns_in_order() {
        assert_eq!(job_title("Worked as a Data Scientist"), "Data Scientist");
        assert_eq!(job_title("Senior Software Engineer"), "Software Engineer");
        assert_eq!(job_title("Senior consultant"), "Senior Consultant");
        assert_eq!(job_title("Head of platform"), "Head Of");
        assert_eq!(job_title("barista"), DEFAULT_JOB_TITLE);
    }

    #[test]
    fn test_key_skills_limited_to_ten() {
        let text = "python java sql mysql docker kubernetes aws git github react angular vue";
        let skills = builder().key_skills(text);
        assert_eq!(count_skills(&skills), 10);
        assert!(skills.starts_with("python, java"));
    }

    #[test]
    fn test_count_skills_empty() {
        assert_eq!(count_skills(""), 0);
        assert_eq!(count_skills("python"), 1);
        assert_eq!(count_skills("python, sql"), 2);
    }

    #[test]
    fn test_build_row() {
        let text = "Data Analyst in Izmir. 3 years of experience with Python and Tableau.";
        let row = builder().build(text, REF_YEAR);
        assert_eq!(row.job_type, "Analytics");
        assert_eq!(row.location, "Izmir");
        assert_eq!(row.job_desig, "Data Analyst");
        assert!((row.experience_num - 3.0).abs() < 1e-9);
        assert!(row.key_skills.contains("python"));
        assert!(row.key_skills.contains("tableau"));
        assert_eq!(row.skill_count, count_skills(&row.key_skills));
    }

    #[test]
    fn test_build_empty_text_defaults() {
        let row = builder().build("", REF_YEAR);
        assert_eq!(
            row,
            FeatureRow {
                experience_num: 0.0,
                job_type: DEFAULT_JOB_TYPE.to_string(),
                key_skills: String::new(),
                location: DEFAULT_LOCATION.to_string(),
                job_desig: DEFAULT_JOB_TITLE.to_string(),
                skill_count: 0,
            }
        );
    }
}
