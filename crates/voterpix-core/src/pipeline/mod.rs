//! Per-document pipeline and batch scheduling.

mod batch;
mod document;

pub use batch::{BatchRunner, OutcomeObserver};
pub use document::DocumentPipeline;

use std::path::Path;

use crate::error::Result;
use crate::input::validate_inputs;
use crate::models::config::VoterpixConfig;
use crate::models::report::DocumentReport;
use crate::pdf::PdfExtractor;

/// Check `config` and `path`, then plan the document without writing.
pub fn inspect(config: &VoterpixConfig, path: &Path) -> Result<DocumentReport> {
    config.validate()?;
    let files = validate_inputs(&[path.to_path_buf()])?;
    let source = &files[0];
    let reader = PdfExtractor::open(source)?;
    Ok(DocumentPipeline::new(config).plan(&reader, source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, DocumentError, InputError, VoterpixError};

    #[test]
    fn test_inspect_reports_each_failure_kind() {
        let dir = tempfile::tempdir().unwrap();
        let config = VoterpixConfig::default();

        let err = inspect(&config, &dir.path().join("missing.pdf")).unwrap_err();
        assert!(matches!(err, VoterpixError::Input(InputError::NotFound(_))));

        let garbage = dir.path().join("roll.pdf");
        std::fs::write(&garbage, b"not a pdf").unwrap();
        let err = inspect(&config, &garbage).unwrap_err();
        assert!(matches!(err, VoterpixError::Document(DocumentError::Open(_))));

        let mut bad = VoterpixConfig::default();
        bad.output.jpeg_quality = 0;
        let err = inspect(&bad, &garbage).unwrap_err();
        assert!(matches!(err, VoterpixError::Config(ConfigError::Invalid { .. })));
    }
}
