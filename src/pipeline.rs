//! Conversion pipeline module
//!
//! Orchestrates one book conversion end to end, each stage gating the
//! next:
//!
//! 1. Attach to the reader window (fatal when absent), activate,
//!    maximize
//! 2. Capture all pages ([`crate::capture`])
//! 3. Resolve the consensus crop rectangle (fatal when unresolved)
//! 4. Crop every page in place
//! 5. Assemble the PDF ([`crate::pdf_writer`])
//! 6. Compress via Ghostscript (recovered on failure)
//! 7. Stamp metadata via ExifTool (best effort)
//! 8. Delete page images and intermediate PDFs
//!
//! Failure paths leave the output folder as-is; only a completed run
//! cleans up after itself.

use crate::capture::{CaptureError, CaptureSession};
use crate::compress::{GhostscriptCompressor, QualityPreset};
use crate::config::{ConverterConfig, DEFAULT_BOOK_NAME, TEMP_BOOK_NAME, TEMP_CMP_BOOK_NAME};
use crate::geometry::{CropRect, GeometryError, GeometryResolver};
use crate::metadata::{ExifToolStamper, MetadataFields};
use crate::pdf_writer::{BookPdfWriter, PageLayout, PdfWriterError, PdfWriterOptions};
use crate::util::page_image_path;
use crate::window::{WindowAutomation, WindowError};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Settle time after bringing the reader to the foreground.
const ACTIVATE_SETTLE: Duration = Duration::from_millis(500);

/// Settle time after maximizing, before geometry is trusted.
const MAXIMIZE_SETTLE: Duration = Duration::from_millis(1000);

/// Pipeline processing error
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Reader window not found: {0}")]
    WindowNotFound(String),

    #[error("Window automation failed: {0}")]
    Automation(String),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("PDF generation failed: {0}")]
    PdfGeneration(#[from] PdfWriterError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<WindowError> for PipelineError {
    fn from(error: WindowError) -> Self {
        match error {
            WindowError::NotFound(title) => PipelineError::WindowNotFound(title),
            other => PipelineError::Automation(other.to_string()),
        }
    }
}

/// Progress callback for pipeline steps
pub trait ProgressCallback: Send + Sync {
    /// Called when a new step starts
    fn on_step_start(&self, step: &str);
    /// Called to report progress within a step
    fn on_step_progress(&self, current: usize, total: usize);
    /// Called when a step completes
    fn on_step_complete(&self, step: &str, message: &str);
    /// Called for debug/verbose messages
    fn on_debug(&self, message: &str);
}

/// No-op progress callback (silent mode)
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_step_start(&self, _step: &str) {}
    fn on_step_progress(&self, _current: usize, _total: usize) {}
    fn on_step_complete(&self, _step: &str, _message: &str) {}
    fn on_debug(&self, _message: &str) {}
}

/// Per-run choices from the CLI.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Output base name; the final document is `<book_name>.pdf`.
    pub book_name: String,
    /// Split each page at the midline into two spread pages.
    pub spread: bool,
    /// Advance by clicking near the right window edge.
    pub turn_from_right: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            book_name: DEFAULT_BOOK_NAME.to_string(),
            spread: false,
            turn_from_right: false,
        }
    }
}

/// Result of one completed conversion
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Number of captured pages
    pub page_count: usize,
    /// Consensus crop rectangle applied to every page
    pub crop: CropRect,
    /// Final document path
    pub output_path: PathBuf,
    /// Final document size in bytes (0 when metadata stamping failed)
    pub output_size: u64,
    /// Processing time in seconds
    pub elapsed_seconds: f64,
}

/// Book conversion pipeline
pub struct ConversionPipeline {
    config: ConverterConfig,
}

impl ConversionPipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Get the pipeline configuration
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Final document path for a given book name
    pub fn output_path(&self, book_name: &str) -> PathBuf {
        PathBuf::from(format!("{}.pdf", book_name))
    }

    /// Convert one book (silent mode)
    pub fn run<W: WindowAutomation>(
        &self,
        driver: &mut W,
        options: &RunOptions,
    ) -> Result<PipelineResult, PipelineError> {
        self.run_with_progress(driver, options, &SilentProgress)
    }

    /// Convert one book with progress callback
    ///
    /// This is the main entry point for a conversion run.
    pub fn run_with_progress<W: WindowAutomation, P: ProgressCallback>(
        &self,
        driver: &mut W,
        options: &RunOptions,
        progress: &P,
    ) -> Result<PipelineResult, PipelineError> {
        let start_time = Instant::now();

        // Step 1: Attach to the reader window
        progress.on_step_start("Locating reader window...");
        driver.find_window(&self.config.window_title)?;
        driver.activate()?;
        std::thread::sleep(ACTIVATE_SETTLE);
        driver.maximize()?;
        std::thread::sleep(MAXIMIZE_SETTLE);
        progress.on_step_complete("Window", &self.config.window_title);

        // Step 2: Capture all pages
        progress.on_step_start("Capturing pages...");
        let page_limit = self.config.page_limit;
        let mut session =
            CaptureSession::new(driver, self.config.capture_options(options.turn_from_right));
        let page_count = session.run(|page| progress.on_step_progress(page, page_limit))?;
        progress.on_step_complete("Capture", &format!("{} pages", page_count));

        let pages: Vec<PathBuf> = (1..=page_count)
            .map(|i| page_image_path(&self.config.output_dir, i))
            .collect();

        // Step 3: Resolve the consensus crop rectangle
        progress.on_step_start("Resolving page geometry...");
        let consensus = GeometryResolver::resolve(&pages, &self.config.colors)?;
        for skip in &consensus.skipped {
            progress.on_debug(&format!(
                "Could not find crop offsets for {} (left {:?}, right {:?}, top {:?}, bottom {:?})",
                skip.path.display(),
                skip.scan.left,
                skip.scan.right,
                skip.scan.top,
                skip.scan.bottom,
            ));
        }
        let rect = consensus.rect;
        progress.on_step_complete(
            "Geometry",
            &format!(
                "{}x{} at ({}, {}), {} of {} pages",
                rect.width(),
                rect.height(),
                rect.left,
                rect.top,
                consensus.pages_used,
                page_count,
            ),
        );

        // Step 4: Crop every page in place
        progress.on_step_start("Cropping pages...");
        GeometryResolver::crop_pages(&pages, &rect)?;
        progress.on_step_complete("Crop", &format!("{} pages", pages.len()));

        // Step 5: Assemble the PDF
        progress.on_step_start("Assembling PDF...");
        let book_path = self.config.output_dir.join(TEMP_BOOK_NAME);
        let layout = if options.spread {
            PageLayout::Spread
        } else {
            PageLayout::Single
        };
        let writer_options = PdfWriterOptions::new(rect.width(), rect.height())
            .with_layout(layout)
            .with_title(options.book_name.as_str());
        BookPdfWriter::write_book(&pages, &book_path, &writer_options)?;
        progress.on_step_complete("Assemble", &book_path.display().to_string());

        // Step 6: Compress (recovered on failure)
        progress.on_step_start("Compressing PDF...");
        let compressed_path = self.config.output_dir.join(TEMP_CMP_BOOK_NAME);
        let stamp_input =
            match GhostscriptCompressor::compress(&book_path, &compressed_path, QualityPreset::Ebook)
            {
                Ok(()) => {
                    progress.on_step_complete("Compress", &compressed_path.display().to_string());
                    compressed_path.clone()
                }
                Err(e) => {
                    progress.on_debug(&format!(
                        "Compression failed, continuing with the uncompressed document: {}",
                        e
                    ));
                    book_path.clone()
                }
            };

        // Step 7: Stamp metadata (best effort)
        progress.on_step_start("Stamping metadata...");
        let output_path = self.output_path(&options.book_name);
        match ExifToolStamper::stamp(&stamp_input, &output_path, &MetadataFields::default()) {
            Ok(()) => progress.on_step_complete("Metadata", &output_path.display().to_string()),
            Err(e) => progress.on_debug(&format!("Metadata stamping failed: {}", e)),
        }

        // Step 8: Cleanup, success path only
        self.clean_up(&pages, &book_path, &compressed_path);

        let output_size = std::fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);

        Ok(PipelineResult {
            page_count,
            crop: rect,
            output_path,
            output_size,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    /// Remove page images and intermediate documents.
    fn clean_up(&self, pages: &[PathBuf], book_path: &Path, compressed_path: &Path) {
        for path in pages {
            if path.exists() {
                let _ = std::fs::remove_file(path);
            }
        }
        for path in [book_path, compressed_path] {
            if path.exists() {
                let _ = std::fs::remove_file(path);
            }
        }
    }
}
