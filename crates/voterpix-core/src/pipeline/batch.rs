//! Bounded concurrent processing of many documents.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use super::DocumentPipeline;
use crate::models::config::VoterpixConfig;
use crate::models::report::{BatchReport, DocumentOutcome};

/// Callback invoked as each document finishes.
pub type OutcomeObserver = Arc<dyn Fn(&DocumentOutcome) + Send + Sync>;

/// Runs a [`DocumentPipeline`] over many documents, at most
/// `max_parallel` at a time.
///
/// A failing document never stops the others. Outcomes are reported in
/// input order once every document has finished.
pub struct BatchRunner {
    pipeline: Arc<DocumentPipeline>,
    max_parallel: usize,
    observer: Option<OutcomeObserver>,
}

impl BatchRunner {
    pub fn new(pipeline: DocumentPipeline, max_parallel: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            max_parallel: max_parallel.max(1),
            observer: None,
        }
    }

    /// Build a runner from configuration.
    pub fn from_config(config: &VoterpixConfig) -> Self {
        Self::new(DocumentPipeline::new(config), config.batch.effective_parallelism())
    }

    /// Call `observer` each time a document finishes.
    pub fn with_observer(mut self, observer: OutcomeObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Process all `files` and wait for every one to finish.
    pub async fn run(&self, files: Vec<PathBuf>) -> BatchReport {
        let start = Instant::now();
        info!(
            "Processing {} document(s) with up to {} worker(s)",
            files.len(),
            self.max_parallel
        );

        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let mut tasks = JoinSet::new();

        // Decided up front so documents sharing a stem never share a directory
        let output_dirs = self.pipeline.output_dirs(&files);

        for (slot, (path, output_dir)) in files.iter().cloned().zip(output_dirs).enumerate() {
            let semaphore = semaphore.clone();
            let pipeline = self.pipeline.clone();
            let observer = self.observer.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let task_path = path.clone();
                let result = tokio::task::spawn_blocking(move || pipeline.process_file(&task_path, output_dir)).await;

                let outcome = match result {
                    Ok(Ok(report)) => DocumentOutcome {
                        path,
                        report: Some(report),
                        error: None,
                    },
                    Ok(Err(e)) => {
                        error!("Failed to process {}: {}", path.display(), e);
                        DocumentOutcome {
                            path,
                            report: None,
                            error: Some(e.to_string()),
                        }
                    }
                    Err(e) => {
                        error!("Worker for {} did not finish: {}", path.display(), e);
                        DocumentOutcome {
                            path,
                            report: None,
                            error: Some(format!("worker did not finish: {}", e)),
                        }
                    }
                };

                if let Some(observer) = &observer {
                    observer(&outcome);
                }
                (slot, outcome)
            });
        }

        let mut outcomes: Vec<Option<DocumentOutcome>> = vec![None; files.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, outcome)) => outcomes[slot] = Some(outcome),
                Err(e) => error!("Batch task failed: {}", e),
            }
        }

        let outcomes = outcomes
            .into_iter()
            .zip(files)
            .map(|(outcome, path)| {
                outcome.unwrap_or_else(|| DocumentOutcome {
                    path,
                    report: None,
                    error: Some("document task aborted".to_string()),
                })
            })
            .collect();

        let report = BatchReport {
            outcomes,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "Batch finished in {:.2}s: {} succeeded, {} failed",
            start.elapsed().as_secs_f64(),
            report.succeeded().count(),
            report.failed().count()
        );
        report
    }
}
