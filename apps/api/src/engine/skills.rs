//! Skill matching: naive case-insensitive substring search over keyword tables.
//!
//! There is no tokenisation or word-boundary check, so `java` also matches inside
//! `javascript` and the single-letter `r` matches almost any text. Results are only as
//! precise as the keyword tables.

use std::collections::HashSet;

use serde::Serialize;

use crate::engine::keywords::SkillCategory;

/// Outcome of matching one text against a set of keyword lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkillMatches {
    /// Distinct matched keywords, in the order they were first encountered.
    pub matched: Vec<String>,
    /// Every (category, keyword) hit; a keyword listed in two categories counts twice.
    pub raw_count: usize,
}

impl SkillMatches {
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SkillMatcher;

impl SkillMatcher {
    /// Scans every category and every keyword of `categories` against `text`.
    pub fn match_categories(&self, text: &str, categories: &[SkillCategory]) -> SkillMatches {
        self.match_lists(text, categories.iter().map(|c| c.keywords.as_slice()))
    }

    /// Scans a single flat keyword list against `text`.
    pub fn match_keywords(&self, text: &str, keywords: &[String]) -> SkillMatches {
        self.match_lists(text, std::iter::once(keywords))
    }

    fn match_lists<'a>(
        &self,
        text: &str,
        lists: impl Iterator<Item = &'a [String]>,
    ) -> SkillMatches {
        let text = text.to_lowercase();
        let mut seen = HashSet::new();
        let mut result = SkillMatches::default();

        for keyword in lists.flatten() {
            if text.contains(keyword.as_str()) {
                result.raw_count += 1;
                if seen.insert(keyword.as_str()) {
                    result.matched.push(keyword.clone());
                }
            }
        }

        result
    }
}
