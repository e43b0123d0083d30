//! Extract, order, match and persist the images of one document.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{DocumentError, PageImageError};
use crate::extract::IdentifierExtractor;
use crate::layout::ImageLocator;
use crate::matching::{NameRegistry, PageNamer};
use crate::models::config::VoterpixConfig;
use crate::models::report::{DocumentReport, PageReport};
use crate::pdf::{DocumentReader, ImageEncoder, JpegEncoder, PageImage, PdfExtractor};

/// Runs identifier extraction, image ordering and naming over the pages of
/// a document and writes the named images.
///
/// Pages are processed sequentially. A page whose text cannot be extracted
/// aborts the document; an image that cannot be decoded or written is
/// logged and skipped.
pub struct DocumentPipeline {
    extractor: IdentifierExtractor,
    locator: ImageLocator,
    namer: PageNamer,
    encoder: Arc<dyn ImageEncoder>,
    output_root: PathBuf,
    skip_leading_pages: u32,
}

impl DocumentPipeline {
    /// Create a pipeline writing JPEG files as configured.
    pub fn new(config: &VoterpixConfig) -> Self {
        let encoder = Arc::new(JpegEncoder::new(config.output.jpeg_quality));
        Self {
            extractor: IdentifierExtractor::new(&config.extraction),
            locator: ImageLocator::new(&config.layout),
            namer: PageNamer::new(&config.matching).with_extension(encoder.extension()),
            encoder,
            output_root: config.output.output_root.clone(),
            skip_leading_pages: config.output.skip_leading_pages,
        }
    }

    /// Use a different raster encoder.
    pub fn with_encoder(mut self, encoder: Arc<dyn ImageEncoder>) -> Self {
        self.namer = self.namer.with_extension(encoder.extension());
        self.encoder = encoder;
        self
    }

    /// Directory receiving the images of `source` when it is processed alone.
    pub fn output_dir(&self, source: &Path) -> PathBuf {
        self.output_root.join(document_stem(source))
    }

    /// Directories for a batch of documents, one per source and all distinct.
    ///
    /// Documents sharing a file stem get `<stem>`, `<stem>_2`, `<stem>_3`
    /// and so on, in input order. Stems are compared case-insensitively.
    pub fn output_dirs(&self, sources: &[PathBuf]) -> Vec<PathBuf> {
        let mut taken = HashSet::new();
        sources
            .iter()
            .map(|source| {
                let stem = document_stem(source);
                let mut name = stem.clone();
                let mut k = 2;
                while !taken.insert(name.to_lowercase()) {
                    name = format!("{}_{}", stem, k);
                    k += 1;
                }
                if name != stem {
                    warn!(
                        "Another input is also named {}; writing {} to {}",
                        stem,
                        source.display(),
                        name
                    );
                }
                self.output_root.join(name)
            })
            .collect()
    }

    /// Open a PDF file and write its images into `output_dir`.
    pub fn process_file(&self, path: &Path, output_dir: PathBuf) -> Result<DocumentReport, DocumentError> {
        let reader = PdfExtractor::open(path)?;
        self.run_into(&reader, path, output_dir)
    }

    /// Process every page of `reader` and write the named images.
    pub fn run<R: DocumentReader>(&self, reader: &R, source: &Path) -> Result<DocumentReport, DocumentError> {
        self.run_into(reader, source, self.output_dir(source))
    }

    /// Like [`run`](Self::run), writing into a given directory.
    pub fn run_into<R: DocumentReader>(
        &self,
        reader: &R,
        source: &Path,
        output_dir: PathBuf,
    ) -> Result<DocumentReport, DocumentError> {
        fs::create_dir_all(&output_dir).map_err(|source| DocumentError::OutputDir {
            path: output_dir.clone(),
            source,
        })?;
        self.walk(reader, source, output_dir, true)
    }

    /// Work out identifiers and names for every page without writing.
    pub fn plan<R: DocumentReader>(&self, reader: &R, source: &Path) -> Result<DocumentReport, DocumentError> {
        let output_dir = self.output_dir(source);
        self.walk(reader, source, output_dir, false)
    }

    fn walk<R: DocumentReader>(
        &self,
        reader: &R,
        source: &Path,
        output_dir: PathBuf,
        write: bool,
    ) -> Result<DocumentReport, DocumentError> {
        let start = Instant::now();
        let started_at = Utc::now();

        let page_count = reader.page_count();
        if page_count == 0 {
            return Err(DocumentError::NoPages);
        }
        info!("Processing {} page(s) of {}", page_count, source.display());

        let mut registry = NameRegistry::new();
        let mut pages = Vec::new();

        for page in self.skip_leading_pages.saturating_add(1)..=page_count {
            debug!("--- File {} Page {} ---", source.display(), page);
            let target = write.then_some(output_dir.as_path());
            pages.push(self.process_page(reader, page, &mut registry, target)?);
        }

        let report = DocumentReport {
            path: source.to_path_buf(),
            output_dir,
            page_count,
            pages,
            started_at,
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Completed {} in {:.2}s: {} written, {} skipped",
            source.display(),
            start.elapsed().as_secs_f64(),
            report.images_written(),
            report.images_skipped()
        );
        debug!("{} file name(s) reserved for {}", registry.reserved(), source.display());
        Ok(report)
    }

    fn process_page<R: DocumentReader>(
        &self,
        reader: &R,
        page: u32,
        registry: &mut NameRegistry,
        target: Option<&Path>,
    ) -> Result<PageReport, DocumentError> {
        let text = reader.page_text(page)?;
        let scan = self.extractor.scan(&text);
        info!(
            "Found {} candidate ID(s) on page {}: {:?}",
            scan.identifiers.len(),
            page,
            scan.identifiers
        );

        let images = self.locator.order(reader.page_images(page)?);
        info!("Found {} image(s) on page {}", images.len(), page);

        let mut assignments = self.namer.assign(page, images.len(), &scan.identifiers);
        let mut written = 0;
        let mut skipped = 0;

        for (image, assignment) in images.iter().zip(assignments.iter_mut()) {
            let filename = registry.claim(page, &assignment.filename);
            if filename != assignment.filename {
                warn!(
                    "Name {} already used in this document; page {} image saved as {}",
                    assignment.filename, page, filename
                );
                assignment.filename = filename;
            }

            let Some(dir) = target else {
                continue;
            };
            match self.persist(image, &dir.join(&assignment.filename)) {
                Ok(()) => {
                    debug!("Saved image {} of page {} as {}", image.index, page, assignment.filename);
                    written += 1;
                }
                Err(e) => {
                    warn!("Skipping image {} of page {}: {}", image.index, page, e);
                    skipped += 1;
                }
            }
        }

        Ok(PageReport {
            number: page,
            identifiers: scan.identifiers,
            serials: scan.serials.into_iter().collect(),
            image_count: images.len(),
            assignments,
            written,
            skipped,
        })
    }

    fn persist(&self, image: &PageImage, path: &Path) -> Result<(), PageImageError> {
        let raster = image.source.decode()?;
        let data = self.encoder.encode(&raster)?;
        fs::write(path, data).map_err(|source| PageImageError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn document_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::Slot;
    use crate::pdf::{BoundingBox, ImageSource};
    use pretty_assertions::assert_eq;

    struct FakePage {
        text: Option<String>,
        images: Vec<PageImage>,
    }

    struct FakeReader {
        pages: Vec<FakePage>,
    }

    impl DocumentReader for FakeReader {
        fn page_count(&self) -> u32 {
            self.pages.len() as u32
        }

        fn page_text(&self, page: u32) -> crate::pdf::Result<String> {
            let p = self.pages.get(page as usize - 1).ok_or(DocumentError::InvalidPage(page))?;
            p.text.clone().ok_or(DocumentError::PageText {
                page,
                reason: "broken font".to_string(),
            })
        }

        fn page_images(&self, page: u32) -> crate::pdf::Result<Vec<PageImage>> {
            let p = self.pages.get(page as usize - 1).ok_or(DocumentError::InvalidPage(page))?;
            Ok(p.images.clone())
        }
    }

    fn gray(index: usize, x: f32, y: f32) -> PageImage {
        PageImage {
            index,
            name: format!("Im{}", index),
            bbox: BoundingBox::new(x, y, 40.0, 50.0),
            source: ImageSource {
                width: 2,
                height: 2,
                filter: None,
                color_space: "DeviceGray".to_string(),
                bits_per_component: 8,
                data: vec![0, 64, 128, 255],
            },
        }
    }

    fn broken(index: usize, x: f32, y: f32) -> PageImage {
        let mut image = gray(index, x, y);
        image.source.data.clear();
        image
    }

    fn page(text: &str, images: Vec<PageImage>) -> FakePage {
        FakePage {
            text: Some(text.to_string()),
            images,
        }
    }

    fn pipeline(root: &Path) -> DocumentPipeline {
        let mut config = VoterpixConfig::default();
        config.output.output_root = root.to_path_buf();
        DocumentPipeline::new(&config)
    }

    #[test]
    fn test_output_dir_uses_document_stem() {
        let pipeline = pipeline(Path::new("out"));
        assert_eq!(
            pipeline.output_dir(Path::new("/data/rolls/ward 5.pdf")),
            PathBuf::from("out/ward 5")
        );
    }

    #[test]
    fn test_run_names_images_in_reading_order() {
        let dir = tempfile::tempdir().unwrap();
        let reader = FakeReader {
            pages: vec![
                page("cover 99999999", vec![gray(0, 10.0, 10.0)]),
                page(
                    "क.सं. 1\nमतदाता 11110001\nक.सं. 2\nमतदाता 11110002",
                    // Extracted bottom row first
                    vec![gray(0, 50.0, 300.0), gray(1, 250.0, 702.0), gray(2, 50.0, 700.0)],
                ),
            ],
        };

        let report = pipeline(dir.path()).run(&reader, Path::new("roll.pdf")).unwrap();
        let out = dir.path().join("roll");

        assert_eq!(report.pages.len(), 1);
        let page = &report.pages[0];
        assert_eq!(page.number, 2);
        assert_eq!(page.identifiers, vec!["11110001", "11110002"]);
        assert_eq!(page.serials, vec!["1", "2"]);
        assert_eq!(page.written, 3);
        assert_eq!(page.matched(), 2);

        assert!(out.join("11110001.jpg").exists());
        assert!(out.join("11110002.jpg").exists());
        assert!(out.join("page2_img2.jpg").exists());
        assert!(!out.join("99999999.jpg").exists());
        assert_eq!(report.images_written(), 3);
    }

    #[test]
    fn test_text_failure_aborts_document() {
        let dir = tempfile::tempdir().unwrap();
        let reader = FakeReader {
            pages: vec![
                page("", vec![]),
                page("12345678", vec![gray(0, 0.0, 0.0)]),
                FakePage {
                    text: None,
                    images: vec![gray(0, 0.0, 0.0)],
                },
            ],
        };

        let err = pipeline(dir.path()).run(&reader, Path::new("roll.pdf")).unwrap_err();
        assert!(matches!(err, DocumentError::PageText { page: 3, .. }));
    }

    #[test]
    fn test_undecodable_image_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let reader = FakeReader {
            pages: vec![
                page("", vec![]),
                page("20000001 20000002", vec![gray(0, 10.0, 500.0), broken(1, 200.0, 500.0)]),
            ],
        };

        let report = pipeline(dir.path()).run(&reader, Path::new("roll.pdf")).unwrap();
        assert_eq!(report.images_written(), 1);
        assert_eq!(report.images_skipped(), 1);
        assert!(dir.path().join("roll/20000001.jpg").exists());
        assert!(!dir.path().join("roll/20000002.jpg").exists());
    }

    #[test]
    fn test_cross_page_collision_renamed() {
        let dir = tempfile::tempdir().unwrap();
        let reader = FakeReader {
            pages: vec![
                page("", vec![]),
                page("30000001", vec![gray(0, 0.0, 0.0)]),
                page("30000001", vec![gray(0, 0.0, 0.0)]),
            ],
        };

        let report = pipeline(dir.path()).run(&reader, Path::new("roll.pdf")).unwrap();
        assert_eq!(report.pages[1].assignments[0].filename, "30000001_page3.jpg");
        assert!(dir.path().join("roll/30000001.jpg").exists());
        assert!(dir.path().join("roll/30000001_page3.jpg").exists());
    }

    #[test]
    fn test_page_without_images() {
        let dir = tempfile::tempdir().unwrap();
        let reader = FakeReader {
            pages: vec![page("", vec![]), page("40000001", vec![])],
        };

        let report = pipeline(dir.path()).run(&reader, Path::new("roll.pdf")).unwrap();
        assert_eq!(report.pages[0].image_count, 0);
        assert!(report.pages[0].assignments.is_empty());
        assert_eq!(report.images_written(), 0);
    }

    #[test]
    fn test_plan_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let reader = FakeReader {
            pages: vec![page("", vec![]), page("50000001", vec![gray(0, 0.0, 0.0), gray(1, 100.0, 0.0)])],
        };

        let report = pipeline(dir.path()).plan(&reader, Path::new("roll.pdf")).unwrap();
        let slots: Vec<&Slot> = report.pages[0].assignments.iter().map(|a| &a.slot).collect();
        assert_eq!(
            slots,
            vec![&Slot::Matched { identifier: "50000001".to_string() }, &Slot::Fallback]
        );
        assert_eq!(report.images_written(), 0);
        assert!(!dir.path().join("roll").exists());
    }

    #[test]
    fn test_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let reader = FakeReader { pages: vec![] };
        let err = pipeline(dir.path()).run(&reader, Path::new("roll.pdf")).unwrap_err();
        assert!(matches!(err, DocumentError::NoPages));
    }

    #[test]
    fn test_output_dirs_split_shared_stems() {
        let pipeline = pipeline(Path::new("out"));
        let dirs = pipeline.output_dirs(&[
            PathBuf::from("/ward1/roll.pdf"),
            PathBuf::from("/ward2/roll.pdf"),
            PathBuf::from("/ward3/Roll.PDF"),
            PathBuf::from("/ward4/roll_2.pdf"),
            PathBuf::from("/ward5/other.pdf"),
        ]);
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("out/roll"),
                PathBuf::from("out/roll_2"),
                PathBuf::from("out/Roll_3"),
                PathBuf::from("out/roll_2_2"),
                PathBuf::from("out/other"),
            ]
        );
    }

    #[test]
    fn test_same_stem_documents_keep_their_images() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());
        let sources = vec![PathBuf::from("/ward1/roll.pdf"), PathBuf::from("/ward2/roll.pdf")];
        let dirs = pipeline.output_dirs(&sources);

        for (source, out) in sources.iter().zip(dirs) {
            let reader = FakeReader {
                pages: vec![page("", vec![]), page("30000001", vec![gray(0, 0.0, 0.0)])],
            };
            pipeline.run_into(&reader, source, out).unwrap();
        }

        assert!(dir.path().join("roll/30000001.jpg").exists());
        assert!(dir.path().join("roll_2/30000001.jpg").exists());
    }

    #[test]
    fn test_skipping_every_page() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = VoterpixConfig::default();
        config.output.output_root = dir.path().to_path_buf();
        config.output.skip_leading_pages = u32::MAX;
        let reader = FakeReader {
            pages: vec![page("", vec![]), page("30000001", vec![gray(0, 0.0, 0.0)])],
        };

        let report = DocumentPipeline::new(&config).run(&reader, Path::new("roll.pdf")).unwrap();
        assert!(report.pages.is_empty());
        assert_eq!(report.page_count, 2);
    }
}
