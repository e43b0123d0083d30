//! Core library for voter-roll PDF processing.
//!
//! This crate provides:
//! - PDF reading (per-page text and placed images)
//! - Identifier extraction from page text with noise filtering
//! - Reading-order sorting of page images
//! - Image-to-identifier matching and output naming
//! - A per-document pipeline and a bounded batch runner

pub mod error;
pub mod models;
pub mod pdf;
pub mod extract;
pub mod layout;
pub mod matching;
pub mod pipeline;
pub mod input;

pub use error::{VoterpixError, InputError, DocumentError, PageImageError, ConfigError, Result};
pub use models::config::VoterpixConfig;
pub use models::report::{DocumentReport, PageReport, BatchReport, DocumentOutcome};
pub use pdf::{DocumentReader, ImageEncoder, JpegEncoder, PdfExtractor, PageImage, BoundingBox};
pub use extract::{IdentifierExtractor, IdentifierScan};
pub use layout::{ImageLocator, Placed};
pub use matching::{Assignment, NameRegistry, PageNamer, Slot};
pub use pipeline::{inspect, BatchRunner, DocumentPipeline};
pub use input::validate_inputs;
