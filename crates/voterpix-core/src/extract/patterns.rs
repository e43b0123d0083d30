//! Common regex patterns for identifier extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // A digit run split from trailing punctuation by layout, e.g. "12345.-"
    pub static ref DIGITS_WITH_TRAILING_PUNCT: Regex = Regex::new(
        r"([0-9]+)[.\-]+"
    ).unwrap();

    // Maximal ASCII digit runs; boundaries are checked by the caller
    pub static ref DIGIT_RUN: Regex = Regex::new(
        r"[0-9]+"
    ).unwrap();
}

/// Build the serial-number pattern for a set of marker spellings.
///
/// Captures the digit run following any of the markers.
pub fn serial_pattern(markers: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = markers
        .iter()
        .filter(|m| !m.is_empty())
        .map(|m| regex::escape(m))
        .collect();

    if alternatives.is_empty() {
        return None;
    }

    Regex::new(&format!(r"(?:{})\s*([0-9]+)", alternatives.join("|"))).ok()
}
