//! Identifier extraction from page text.

mod identifiers;
pub mod patterns;

pub use identifiers::{IdentifierExtractor, IdentifierScan};
