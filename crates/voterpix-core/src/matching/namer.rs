//! Positional pairing of ordered page images with page identifiers.

use serde::Serialize;

use crate::models::config::MatchingConfig;

/// How an image got its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Slot {
    /// Leading header/logo image on a dense page.
    Header,
    /// Paired with the identifier at the same adjusted position.
    Matched { identifier: String },
    /// No identifier left for this position.
    Fallback,
}

/// Output name for one image on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Position in reading order (0-indexed).
    pub position: usize,
    /// How the name was derived.
    pub slot: Slot,
    /// Output file name.
    pub filename: String,
}

impl Assignment {
    pub fn is_matched(&self) -> bool {
        matches!(self.slot, Slot::Matched { .. })
    }
}

/// Names the images of one page.
///
/// The first `header_skip_count` images of a page holding more than
/// `density_threshold` images are header/logo images and never consume an
/// identifier. Remaining images pair with identifiers by position; once the
/// identifiers run out, images get a synthetic `page<N>_img<i>` name.
#[derive(Debug, Clone)]
pub struct PageNamer {
    header_skip_count: usize,
    density_threshold: usize,
    extension: String,
}

impl PageNamer {
    /// Create a namer from configuration.
    pub fn new(config: &MatchingConfig) -> Self {
        Self {
            header_skip_count: config.header_skip_count,
            density_threshold: config.density_threshold,
            extension: "jpg".to_string(),
        }
    }

    /// Set the file extension of generated names.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Number of leading header images on a page with `image_count` images.
    pub fn header_count(&self, image_count: usize) -> usize {
        if image_count > self.density_threshold {
            self.header_skip_count.min(image_count)
        } else {
            0
        }
    }

    /// Assign a name to each of `image_count` images in reading order.
    pub fn assign(&self, page: u32, image_count: usize, identifiers: &[String]) -> Vec<Assignment> {
        let headers = self.header_count(image_count);

        (0..image_count)
            .map(|position| {
                let (slot, stem) = if position < headers {
                    (Slot::Header, format!("page{}_header{}", page, position))
                } else {
                    match identifiers.get(position - headers) {
                        Some(id) => (Slot::Matched { identifier: id.clone() }, id.clone()),
                        None => (Slot::Fallback, format!("page{}_img{}", page, position)),
                    }
                };
                Assignment {
                    position,
                    slot,
                    filename: format!("{}.{}", stem, self.extension),
                }
            })
            .collect()
    }
}

impl Default for PageNamer {
    fn default() -> Self {
        Self::new(&MatchingConfig::default())
    }
}
