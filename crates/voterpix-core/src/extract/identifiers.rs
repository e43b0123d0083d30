//! Voter identifier extraction with serial-number and year filtering.

use std::collections::{BTreeSet, HashSet};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use super::patterns::{serial_pattern, DIGITS_WITH_TRAILING_PUNCT, DIGIT_RUN};
use crate::models::config::ExtractionConfig;

/// Identifiers found on one page, plus the values excluded as serial numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentifierScan {
    /// Unique identifiers in first-seen text order.
    pub identifiers: Vec<String>,
    /// Digit runs that followed a serial-number marker.
    pub serials: BTreeSet<String>,
}

/// Extracts numeric voter identifiers from the plain text of one page.
#[derive(Debug, Clone)]
pub struct IdentifierExtractor {
    min_digits: usize,
    max_digits: usize,
    year_range: (u32, u32),
    markers: Vec<String>,
    serial: Option<Regex>,
}

impl IdentifierExtractor {
    /// Create an extractor from configuration.
    pub fn new(config: &ExtractionConfig) -> Self {
        let markers: Vec<String> = config
            .serial_markers
            .iter()
            .filter(|m| !m.is_empty())
            .cloned()
            .collect();

        Self {
            min_digits: config.min_digits,
            max_digits: config.max_digits,
            year_range: config.year_range,
            serial: serial_pattern(&markers),
            markers,
        }
    }

    /// Extract identifiers from page text.
    ///
    /// Never fails; returns an empty list when nothing matches.
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.scan(text).identifiers
    }

    /// Extract identifiers and report the serial-number exclusions.
    pub fn scan(&self, text: &str) -> IdentifierScan {
        let cleaned = text.replace('\u{FFFD}', "");
        let cleaned = DIGITS_WITH_TRAILING_PUNCT.replace_all(&cleaned, "$1");

        let lines: Vec<&str> = cleaned.split('\n').collect();

        // Serial numbers are collected over the whole page first; a marker
        // on a later line still excludes earlier occurrences.
        let mut serials = BTreeSet::new();
        if let Some(serial) = &self.serial {
            for line in &lines {
                for caps in serial.captures_iter(line) {
                    serials.insert(caps[1].to_string());
                }
            }
        }
        if !serials.is_empty() {
            debug!("Serial numbers to exclude: {:?}", serials);
        }

        let mut seen = HashSet::new();
        let mut identifiers = Vec::new();

        for line in lines.iter().filter(|l| !self.is_serial_line(l)) {
            for candidate in self.candidates(line) {
                if serials.contains(candidate) {
                    trace!("Skipping serial number: {}", candidate);
                    continue;
                }
                if self.is_year_like(candidate) {
                    trace!("Skipping year-like number: {}", candidate);
                    continue;
                }
                if seen.insert(candidate) {
                    identifiers.push(candidate.to_string());
                }
            }
        }

        IdentifierScan { identifiers, serials }
    }

    fn is_serial_line(&self, line: &str) -> bool {
        self.markers.iter().any(|m| line.contains(m.as_str()))
    }

    /// Digit runs of accepted length bounded by ASCII word boundaries.
    fn candidates<'a>(&self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let (min, max) = (self.min_digits, self.max_digits);
        DIGIT_RUN.find_iter(line).filter_map(move |m| {
            let len = m.end() - m.start();
            if len < min || len > max {
                return None;
            }
            let before = line[..m.start()].chars().next_back();
            let after = line[m.end()..].chars().next();
            if before.is_some_and(is_word_char) || after.is_some_and(is_word_char) {
                return None;
            }
            Some(m.as_str())
        })
    }

    fn is_year_like(&self, candidate: &str) -> bool {
        if candidate.len() != 4 {
            return false;
        }
        candidate
            .parse::<u32>()
            .map(|year| year >= self.year_range.0 && year <= self.year_range.1)
            .unwrap_or(false)
    }
}

impl Default for IdentifierExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
