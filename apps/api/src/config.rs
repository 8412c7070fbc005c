use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_MAX_TEXT_CHARS: usize = 50_000;

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding the salary model and label encoder artifacts.
    pub model_dir: PathBuf,
    /// Keyword tables override; the bundled tables are used when unset.
    pub keywords_path: Option<PathBuf>,
    /// Pins the year used for "present" ranges. Defaults to the current UTC year per request.
    pub reference_year: Option<i32>,
    pub max_text_chars: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            model_dir: lookup("MODEL_DIR")
                .map_or_else(|| PathBuf::from("models"), PathBuf::from),
            keywords_path: lookup("KEYWORDS_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            reference_year: lookup("REFERENCE_YEAR")
                .map(|y| y.parse::<i32>())
                .transpose()
                .context("REFERENCE_YEAR must be a year such as 2024")?,
            max_text_chars: lookup("MAX_TEXT_CHARS")
                .map(|n| n.parse::<usize>())
                .transpose()
                .context("MAX_TEXT_CHARS must be a positive integer")?
                .unwrap_or(DEFAULT_MAX_TEXT_CHARS),
        })
    }
}
