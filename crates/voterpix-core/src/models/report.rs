//! Processing reports for pages, documents and batches.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use crate::matching::Assignment;

/// What happened on a single page.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    /// Page number (1-indexed).
    pub number: u32,
    /// Identifiers found in the page text, in text order.
    pub identifiers: Vec<String>,
    /// Values excluded as row serial numbers.
    pub serials: Vec<String>,
    /// Number of images placed on the page.
    pub image_count: usize,
    /// Filename assignment per image, in reading order.
    pub assignments: Vec<Assignment>,
    /// Images written to disk.
    pub written: usize,
    /// Images skipped because they could not be decoded or written.
    pub skipped: usize,
}

impl PageReport {
    /// Number of images that received an identifier.
    pub fn matched(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_matched()).count()
    }
}

/// Result of processing one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// Source document.
    pub path: PathBuf,
    /// Directory the images were written to.
    pub output_dir: PathBuf,
    /// Total pages in the document.
    pub page_count: u32,
    /// Reports for processed pages.
    pub pages: Vec<PageReport>,
    /// When processing started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock processing time.
    pub processing_time_ms: u64,
}

impl DocumentReport {
    /// Images written across all pages.
    pub fn images_written(&self) -> usize {
        self.pages.iter().map(|p| p.written).sum()
    }

    /// Images skipped across all pages.
    pub fn images_skipped(&self) -> usize {
        self.pages.iter().map(|p| p.skipped).sum()
    }

    /// Images named after an identifier across all pages.
    pub fn images_matched(&self) -> usize {
        self.pages.iter().map(PageReport::matched).sum()
    }
}

/// Outcome of one document in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutcome {
    /// Source document.
    pub path: PathBuf,
    /// Report when the document completed.
    pub report: Option<DocumentReport>,
    /// Error message when the document was aborted.
    pub error: Option<String>,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a batch run, collected after all documents finished.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// One outcome per input document, in input order.
    pub outcomes: Vec<DocumentOutcome>,
    /// Wall-clock time of the whole batch.
    pub elapsed_ms: u64,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Images written across all documents.
    pub fn images_written(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.report.as_ref())
            .map(DocumentReport::images_written)
            .sum()
    }
}
