//! Keyword tables: versioned TOML data driving every substring matcher in the engine.
//!
//! The bundled table ships with the binary; `KEYWORDS_PATH` can point at a replacement
//! file with the same shape. Tables are validated once at load and then shared read-only.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Keyword tables bundled with the binary.
pub const BUNDLED_KEYWORDS: &str = include_str!("../../config/keywords.toml");

/// Highest table version this build understands.
pub const SUPPORTED_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum KeywordError {
    #[error("failed to read keyword tables from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse keyword tables: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unsupported keyword table version {found}")]
    UnsupportedVersion { found: u32 },

    #[error("invalid keyword tables: {0}")]
    Invalid(String),
}

/// A named group of skill keywords, e.g. `programming` or `databases`.
#[derive(Debug, Clone, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EducationLevel {
    pub keyword: String,
    pub points: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobTypeKeyword {
    pub keyword: String,
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationKeyword {
    pub keyword: String,
    pub city: String,
}

/// All keyword tables, in definition order. Order is significant for the
/// first-match rules (education label, relevant field, job type).
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordTables {
    pub version: u32,
    pub skill_categories: Vec<SkillCategory>,
    pub salary_skills: Vec<String>,
    pub education_levels: Vec<EducationLevel>,
    pub relevant_fields: Vec<String>,
    pub job_types: Vec<JobTypeKeyword>,
    pub locations: Vec<LocationKeyword>,
}

impl KeywordTables {
    /// Parses the tables bundled into the binary.
    pub fn bundled() -> Result<Self, KeywordError> {
        Self::from_toml_str(BUNDLED_KEYWORDS)
    }

    /// Loads tables from `path`, or the bundled tables when no path is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, KeywordError> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| KeywordError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_toml_str(&raw)
            }
            None => Self::bundled(),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, KeywordError> {
        let tables: KeywordTables = toml::from_str(raw)?;
        tables.validate()?;
        Ok(tables)
    }

    fn validate(&self) -> Result<(), KeywordError> {
        if self.version == 0 || self.version > SUPPORTED_VERSION {
            return Err(KeywordError::UnsupportedVersion {
                found: self.version,
            });
        }
        if self.skill_categories.is_empty() {
            return Err(KeywordError::Invalid(
                "at least one skill category is required".to_string(),
            ));
        }
        if self.education_levels.is_empty() {
            return Err(KeywordError::Invalid(
                "at least one education level is required".to_string(),
            ));
        }

        let category_keywords = self
            .skill_categories
            .iter()
            .flat_map(|c| c.keywords.iter().map(move |k| (c.name.as_str(), k.as_str())));
        let flat_keywords = std::iter::empty::<(&str, &str)>()
            .chain(self.salary_skills.iter().map(|k| ("salary_skills", k.as_str())))
            .chain(
                self.education_levels
                    .iter()
                    .map(|l| ("education_levels", l.keyword.as_str())),
            )
            .chain(
                self.relevant_fields
                    .iter()
                    .map(|f| ("relevant_fields", f.as_str())),
            )
            .chain(self.job_types.iter().map(|j| ("job_types", j.keyword.as_str())))
            .chain(self.locations.iter().map(|l| ("locations", l.keyword.as_str())));

        for (table, keyword) in category_keywords.chain(flat_keywords) {
            if keyword.trim().is_empty() {
                return Err(KeywordError::Invalid(format!(
                    "empty keyword in table '{table}'"
                )));
            }
            if keyword.to_lowercase() != keyword {
                return Err(KeywordError::Invalid(format!(
                    "keyword '{keyword}' in table '{table}' must be lower-case"
                )));
            }
        }

        Ok(())
    }

    /// Total number of keywords across all skill categories (duplicates included).
    pub fn skill_keyword_count(&self) -> usize {
        self.skill_categories.iter().map(|c| c.keywords.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bundled_tables_parse_and_validate() {
        let tables = KeywordTables::bundled().unwrap();
        assert_eq!(tables.version, 1);
        let names: Vec<&str> = tables
            .skill_categories
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "programming",
                "databases",
                "data_science",
                "web_technologies",
                "cloud_platforms",
                "tools"
            ]
        );
        assert!(tables.skill_keyword_count() > 90);
        assert!(!tables.salary_skills.is_empty());
        assert!(!tables.relevant_fields.is_empty());
        assert!(!tables.job_types.is_empty());
        assert!(!tables.locations.is_empty());
    }

    #[test]
    fn test_flat_tables_after_category_headers_do_not_parse() {
        // Keys below an array-of-tables header belong to its last entry.
        let raw = r#"
            version = 1

            [[skill_categories]]
            name = "programming"
            keywords = ["python"]

            salary_skills = ["python"]
            relevant_fields = ["computer"]
            job_types = []
            locations = []
            education_levels = [{ keyword = "phd", points = 20 }]
        "#;
        let err = KeywordTables::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, KeywordError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn test_education_levels_keep_definition_order() {
        let tables = KeywordTables::bundled().unwrap();
        assert_eq!(tables.education_levels[0].keyword, "doktora");
        assert_eq!(tables.education_levels[0].points, 20);
        assert_eq!(tables.education_levels.last().unwrap().keyword, "high school");
    }

    #[test]
    fn test_uppercase_keyword_rejected() {
        let raw = r#"
            version = 1
            salary_skills = []
            relevant_fields = []
            job_types = []
            locations = []
            education_levels = [{ keyword = "phd", points = 20 }]

            [[skill_categories]]
            name = "programming"
            keywords = ["Python"]
        "#;
        let err = KeywordTables::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, KeywordError::Invalid(_)), "got {err:?}");
    }

    #[test]
    fn test_future_version_rejected() {
        let raw = BUNDLED_KEYWORDS.replacen("version = 1", "version = 2", 1);
        let err = KeywordTables::from_toml_str(&raw).unwrap_err();
        assert!(matches!(err, KeywordError::UnsupportedVersion { found: 2 }));
    }

    #[test]
    fn test_missing_table_is_parse_error() {
        let err = KeywordTables::from_toml_str("version = 1").unwrap_err();
        assert!(matches!(err, KeywordError::Parse(_)));
    }

    #[test]
    fn test_load_from_override_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let raw = BUNDLED_KEYWORDS.replace("\"rust\",", "\"rust\", \"zig\",");
        file.write_all(raw.as_bytes()).unwrap();

        let tables = KeywordTables::load(Some(file.path())).unwrap();
        assert!(tables.skill_categories[0]
            .keywords
            .contains(&"zig".to_string()));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = KeywordTables::load(Some(Path::new("/nonexistent/keywords.toml"))).unwrap_err();
        assert!(matches!(err, KeywordError::Io { .. }));
    }
}
