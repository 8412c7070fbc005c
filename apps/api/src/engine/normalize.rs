//! Text normalization applied to extracted CV text before analysis.

use once_cell::sync::Lazy;
use regex::Regex;

/// Anything that is not a word character, whitespace, or one of `. , ; : ! ? - ( ) [ ] /`.
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.,;:!?\-()\[\]/]").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strips disallowed punctuation, collapses whitespace runs to a single space and trims.
///
/// Characters are removed before whitespace is collapsed, so `normalize(normalize(t)) == normalize(t)`.
pub fn normalize(text: &str) -> String {
    let stripped = DISALLOWED.replace_all(text, "");
    WHITESPACE_RUN
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// Title-cases `text`: a letter is upper-cased when the previous character is not a letter,
/// lower-cased otherwise. `"yüksek lisans"` becomes `"Yüksek Lisans"`, `"m.s."` becomes `"M.S."`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}
