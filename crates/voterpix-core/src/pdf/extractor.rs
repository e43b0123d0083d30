//! PDF page text and image extraction using lopdf and pdf-extract.

use std::path::Path;
use std::sync::OnceLock;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use super::placement::{Matrix, PlacementWalker};
use super::{DocumentReader, PageImage, Result};
use crate::error::DocumentError;

/// PDF reader backed by lopdf for structure and pdf-extract for text.
pub struct PdfExtractor {
    document: Document,
    raw_data: Vec<u8>,
    page_texts: OnceLock<std::result::Result<Vec<String>, String>>,
}

impl PdfExtractor {
    /// Open a PDF file.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| DocumentError::Open(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(&data)
    }

    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| DocumentError::Open(e.to_string()))?;

        // PDFs encrypted with an empty user password are common for
        // published rolls; text extraction needs the decrypted bytes.
        let raw_data = if document.is_encrypted() {
            document
                .decrypt("")
                .map_err(|_| DocumentError::Open("PDF is encrypted".to_string()))?;
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| DocumentError::Open(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(DocumentError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self {
            document,
            raw_data,
            page_texts: OnceLock::new(),
        })
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.document
            .get_pages()
            .get(&page)
            .copied()
            .ok_or(DocumentError::InvalidPage(page))
    }

    /// Per-page text for the whole document, extracted once.
    fn page_texts(&self) -> &std::result::Result<Vec<String>, String> {
        self.page_texts.get_or_init(|| {
            pdf_extract::extract_text_from_mem_by_pages(&self.raw_data).map_err(|e| e.to_string())
        })
    }

    /// Get resources dictionary for a page, handling inheritance
    fn page_resources(&self, node_id: ObjectId) -> Option<Dictionary> {
        let doc = &self.document;
        let Object::Dictionary(dict) = doc.get_object(node_id).ok()? else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                return Some(res_dict.clone());
            }
        }

        // Continue up the page tree
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.page_resources(*parent_id),
            _ => None,
        }
    }
}

impl DocumentReader for PdfExtractor {
    fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.page_id(page)?;

        match self.page_texts() {
            Ok(pages) => pages.get((page - 1) as usize).cloned().ok_or_else(|| {
                DocumentError::PageText {
                    page,
                    reason: format!("text extraction returned {} pages", pages.len()),
                }
            }),
            Err(reason) => Err(DocumentError::PageText {
                page,
                reason: reason.clone(),
            }),
        }
    }

    fn page_images(&self, page: u32) -> Result<Vec<PageImage>> {
        let page_id = self.page_id(page)?;
        let content = self
            .document
            .get_page_content(page_id)
            .map_err(|e| DocumentError::PageImages {
                page,
                reason: e.to_string(),
            })?;
        let resources = self.page_resources(page_id);

        let mut walker = PlacementWalker::new(&self.document);
        walker
            .walk(&content, resources.as_ref(), Matrix::IDENTITY, 0)
            .map_err(|e| DocumentError::PageImages {
                page,
                reason: e.to_string(),
            })?;

        let images = walker.into_images();
        debug!("Located {} images on page {}", images.len(), page);
        Ok(images)
    }
}
