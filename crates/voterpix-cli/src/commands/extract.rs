//! Extract command - write the named photos of a batch of PDF documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use voterpix_core::{validate_inputs, BatchReport, BatchRunner, DocumentOutcome, InputError, VoterpixConfig};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF file (repeat for several documents)
    #[arg(short, long = "input", value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Output directory [default: output]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// PDF toolkit license key
    #[arg(long, env = "VOTERPIX_LICENSE_KEY", hide_env_values = true)]
    license: Option<String>,

    /// Number of documents processed at once
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Leading header images skipped on dense pages
    #[arg(long)]
    header_skip: Option<usize>,

    /// Pages with more images than this are treated as dense
    #[arg(long)]
    density_threshold: Option<usize>,

    /// Maximum vertical distance between images on the same row
    #[arg(long)]
    row_tolerance: Option<f32>,

    /// Also write a summary CSV to the output directory
    #[arg(long)]
    summary: bool,

    /// Do not write a per-run log file
    #[arg(long)]
    no_log_file: bool,
}

impl ExtractArgs {
    /// Resolve and check every `-i` file. Fails before any work starts.
    pub fn validated_inputs(&self) -> Result<Vec<PathBuf>, InputError> {
        validate_inputs(&self.inputs)
    }

    pub fn wants_log_file(&self) -> bool {
        !self.no_log_file
    }

    /// Apply command-line overrides on top of file configuration.
    fn apply(&self, config: &mut VoterpixConfig) {
        if let Some(output) = &self.output {
            config.output.output_root = output.clone();
        }
        if let Some(jobs) = self.jobs {
            config.batch.max_parallel = Some(jobs);
        }
        if let Some(skip) = self.header_skip {
            config.matching.header_skip_count = skip;
        }
        if let Some(threshold) = self.density_threshold {
            config.matching.density_threshold = threshold;
        }
        if let Some(tolerance) = self.row_tolerance {
            config.layout.row_tolerance = tolerance;
        }
        if self.license.is_some() {
            config.license_key = self.license.clone();
        }
    }
}

pub async fn run(args: &ExtractArgs, files: Vec<PathBuf>, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let (mut config, source) = super::resolve_config(config_path)?;
    debug!("Configuration from {}", source);
    args.apply(&mut config);
    config.validate()?;

    if let Some(key) = &config.license_key {
        info!("License key recorded ({} characters)", key.chars().count());
    } else {
        debug!("No license key provided");
    }

    fs::create_dir_all(&config.output.output_root)?;

    println!(
        "{} Found {} document(s) to process",
        style("ℹ").blue(),
        files.len()
    );

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents")?
            .progress_chars("=>-"),
    );

    let observer_bar = progress.clone();
    let runner = BatchRunner::from_config(&config).with_observer(Arc::new(move |outcome: &DocumentOutcome| {
        if let Some(error) = &outcome.error {
            observer_bar.suspend(|| {
                println!("{} {}: {}", style("ERROR:").red(), outcome.path.display(), error)
            });
        }
        observer_bar.inc(1);
    }));

    let report = runner.run(files).await;
    progress.finish_with_message("Complete");

    if args.summary {
        let summary_path = config.output.output_root.join("summary.csv");
        write_summary(&summary_path, &report)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_summary(&report, start);
    Ok(())
}

fn print_summary(report: &BatchReport, start: Instant) {
    let failed: Vec<&DocumentOutcome> = report.failed().collect();

    println!();
    println!(
        "{} Processed {} document(s) in {:?}",
        style("✓").green(),
        report.outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed, {} image(s) written",
        style(report.succeeded().count()).green(),
        style(failed.len()).red(),
        report.images_written()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed documents:").red());
        for outcome in failed {
            println!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

fn write_summary(path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "output_dir",
        "pages",
        "images_written",
        "images_matched",
        "images_skipped",
        "processing_time_ms",
        "error",
    ])?;

    for outcome in &report.outcomes {
        let filename = outcome
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &outcome.report {
            Some(doc) => wtr.write_record([
                filename,
                "success",
                &doc.output_dir.display().to_string(),
                &doc.page_count.to_string(),
                &doc.images_written().to_string(),
                &doc.images_matched().to_string(),
                &doc.images_skipped().to_string(),
                &doc.processing_time_ms.to_string(),
                "",
            ])?,
            None => wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                outcome.error.as_deref().unwrap_or(""),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}
