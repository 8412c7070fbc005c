//! Duration extraction: estimates total years of experience from free-form CV text.
//!
//! Extraction runs an ordered list of strategies; the first one that yields a positive
//! estimate wins and later strategies are never consulted:
//!
//! 1. [`ExplicitMentions`]: sums every "N years / N months (/ N weeks)" mention.
//! 2. [`DateRangeInference`]: isolates the work-experience section, then sums the
//!    durations of every recognised date range plus every "YYYY - present" shorthand.
//!
//! Two profiles exist, differing in units and per-period cap:
//! - [`DurationExtractor::for_scoring`]: counts weeks, caps each inferred period at 10 years.
//! - [`DurationExtractor::shared`]: no weeks, caps each inferred period at 50 years.

use once_cell::sync::Lazy;
use regex::Regex;

/// Per-period cap used by the per-request scoring path.
pub const SCORING_PERIOD_CAP: i32 = 10;
/// Per-period cap used by the shared duration path (reported years, salary features).
pub const SHARED_PERIOD_CAP: i32 = 50;

/// A single extraction tier. Returns `None` when the tier found nothing usable.
pub trait DurationStrategy: Send + Sync {
    fn estimate(&self, text: &str, reference_year: i32) -> Option<f64>;
}

// ────────────────────────────────────────────────────────────────────────────
// Extractor
// ────────────────────────────────────────────────────────────────────────────

pub struct DurationExtractor {
    strategies: Vec<Box<dyn DurationStrategy>>,
}

impl DurationExtractor {
    pub fn new(strategies: Vec<Box<dyn DurationStrategy>>) -> Self {
        Self { strategies }
    }

    /// Profile used by the score aggregator.
    pub fn for_scoring() -> Self {
        Self::new(vec![
            Box::new(ExplicitMentions { include_weeks: true }),
            Box::new(DateRangeInference {
                period_cap: SCORING_PERIOD_CAP,
            }),
        ])
    }

    /// Profile used for the reported experience years and the salary feature row.
    pub fn shared() -> Self {
        Self::new(vec![
            Box::new(ExplicitMentions {
                include_weeks: false,
            }),
            Box::new(DateRangeInference {
                period_cap: SHARED_PERIOD_CAP,
            }),
        ])
    }

    /// Estimated years of experience; always `>= 0`.
    pub fn estimate(&self, text: &str, reference_year: i32) -> f64 {
        let text = text.to_lowercase();
        self.strategies
            .iter()
            .find_map(|s| s.estimate(&text, reference_year))
            .unwrap_or(0.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tier 1: explicit "N years / N months" mentions
// ────────────────────────────────────────────────────────────────────────────

struct DurationUnit {
    pattern: Regex,
    months: f64,
    is_week: bool,
}

static UNITS: Lazy<Vec<DurationUnit>> = Lazy::new(|| {
    [
        (r"(\d+)\s*yıl", 12.0, false),
        (r"(\d+)\s*year", 12.0, false),
        (r"(\d+)\s*ay", 1.0, false),
        (r"(\d+)\s*month", 1.0, false),
        (r"(\d+)\s*hafta", 0.25, true),
        (r"(\d+)\s*week", 0.25, true),
    ]
    .into_iter()
    .map(|(pattern, months, is_week)| DurationUnit {
        pattern: Regex::new(pattern).unwrap(),
        months,
        is_week,
    })
    .collect()
});

/// Sums every explicit duration mention. Each unit pattern scans the whole text
/// independently, so one phrase may be counted by more than one unit.
pub struct ExplicitMentions {
    pub include_weeks: bool,
}

impl DurationStrategy for ExplicitMentions {
    fn estimate(&self, text: &str, _reference_year: i32) -> Option<f64> {
        let total_months: f64 = UNITS
            .iter()
            .filter(|unit| self.include_weeks || !unit.is_week)
            .flat_map(|unit| {
                unit.pattern
                    .captures_iter(text)
                    .filter_map(|caps| caps[1].parse::<u32>().ok())
                    .map(move |value| f64::from(value) * unit.months)
            })
            .sum();

        (total_months > 0.0).then(|| total_months / 12.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tiers 2-4: section isolation + date-range inference
// ────────────────────────────────────────────────────────────────────────────

/// Work-section headers, tried in order; each pairs with the headers that end it.
static SECTION_HEADERS: Lazy<Vec<(Regex, &'static Regex)>> = Lazy::new(|| {
    [
        (r"(?i)work\s+experience", &*ENGLISH_SECTION_END),
        (r"(?i)employment", &*ENGLISH_SECTION_END),
        (r"(?i)professional\s+experience", &*ENGLISH_SECTION_END),
        (r"(?i)career", &*ENGLISH_SECTION_END),
        (r"(?i)iş\s+deneyimi", &*TURKISH_SECTION_END),
        (r"(?i)çalışma\s+geçmişi", &*TURKISH_SECTION_END),
    ]
    .into_iter()
    .map(|(header, end)| (Regex::new(header).unwrap(), end))
    .collect()
});
static ENGLISH_SECTION_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)education|skills").unwrap());
static TURKISH_SECTION_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)eğitim|yetenek").unwrap());

static EDUCATION_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)education").unwrap());
static EDUCATION_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)work|skills").unwrap());

/// Start/end pairs such as `January 2015 - March 2018`, `2020/2023` or `2019 - present`.
static DATE_RANGES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\w+\s+\d{4})\s*-\s*(\w+\s+\d{4})",
        r"(?i)(\w+\s+\d{4})\s*-\s*(current|present|şimdi|şu\s*an)",
        r"(?i)(\d{4})\s*-\s*(\d{4})",
        r"(?i)(\d{4})\s*/\s*(\d{4})",
        r"(?i)(\d{4})\s*to\s*(\d{4})",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// `YYYY - present` shorthands for the current position.
static CURRENT_JOB: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\d{4})\s*-\s*şimdi",
        r"(?i)(\d{4})\s*-\s*şu\s*an",
        r"(?i)(\d{4})\s*-\s*present",
        r"(?i)(\d{4})\s*-\s*current",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})").unwrap());

/// Infers experience from date ranges inside the work section. Each period must lie in
/// `(0, period_cap]` years to count; malformed fragments are skipped.
pub struct DateRangeInference {
    pub period_cap: i32,
}

impl DurationStrategy for DateRangeInference {
    fn estimate(&self, text: &str, reference_year: i32) -> Option<f64> {
        let work_text = strip_education(isolate_work_section(text));
        let accept = |years: i32| years > 0 && years <= self.period_cap;

        let mut total = 0_i32;

        for pattern in DATE_RANGES.iter() {
            for caps in pattern.captures_iter(&work_text) {
                let start = first_year(&caps[1]);
                let end = first_year(&caps[2]);
                let years = match (start, end) {
                    (Some(start), Some(end)) => end - start,
                    (Some(start), None) if is_present_marker(&caps[2]) => {
                        reference_year - start
                    }
                    _ => continue,
                };
                if accept(years) {
                    total += years;
                }
            }
        }

        for pattern in CURRENT_JOB.iter() {
            for caps in pattern.captures_iter(&work_text) {
                let Ok(start) = caps[1].parse::<i32>() else {
                    continue;
                };
                let years = reference_year - start;
                if accept(years) {
                    total += years;
                }
            }
        }

        (total > 0).then_some(f64::from(total))
    }
}

/// Returns the text from the first matching work-section header up to the next section
/// terminator (or end of text). With no header, the whole text is returned.
pub fn isolate_work_section(text: &str) -> &str {
    for (header, end) in SECTION_HEADERS.iter() {
        if let Some(m) = header.find(text) {
            let stop = end
                .find_at(text, m.end())
                .map_or(text.len(), |e| e.start());
            return &text[m.start()..stop];
        }
    }
    text
}

/// Removes every `education ...` span, each running up to the next `work`/`skills`
/// marker or the end of text.
pub fn strip_education(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(m) = EDUCATION_START.find_at(text, cursor) {
        out.push_str(&text[cursor..m.start()]);
        cursor = EDUCATION_END
            .find_at(text, m.end())
            .map_or(text.len(), |e| e.start());
    }
    out.push_str(&text[cursor..]);
    out
}

fn first_year(fragment: &str) -> Option<i32> {
    YEAR.captures(fragment)
        .and_then(|caps| caps[1].parse::<i32>().ok())
}

/// Does not recognise "şu an"; those ranges are picked up by the current-job shorthands.
fn is_present_marker(fragment: &str) -> bool {
    let fragment = fragment.to_lowercase();
    ["current", "present", "şimdi"]
        .iter()
        .any(|marker| fragment.contains(marker))
}
