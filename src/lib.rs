//! kindle2pdf - e-reader screen capture to PDF converter
//!
//! Drives an on-screen e-reader through a whole book and turns the
//! captured pages into a single cropped, compressed, metadata-stamped
//! PDF.
//!
//! # Features
//!
//! - **Border Detection** ([`border`]) - Locate page content inside the
//!   reader's frame with sampled scanline transitions
//! - **Geometry Resolution** ([`geometry`]) - One consensus crop
//!   rectangle for the whole book, applied uniformly
//! - **Page Capture** ([`capture`]) - Screenshot/page-turn loop with
//!   duplicate-frame end-of-book detection and a hard page cap
//! - **Window Automation** ([`window`]) - Find, focus, maximize, and
//!   capture the reader window; synthesize page-turn clicks
//! - **PDF Assembly** ([`pdf_writer`]) - Single-page or dual-page
//!   spread output via `printpdf`
//! - **Compression** ([`compress`]) - Ghostscript `/ebook` pass
//! - **Metadata** ([`metadata`]) - ExifTool stamping of the final file
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kindle2pdf::{
//!     ConversionPipeline, ConverterConfig, DesktopAutomation, RunOptions,
//! };
//!
//! let mut driver = DesktopAutomation::new().unwrap();
//! let pipeline = ConversionPipeline::new(ConverterConfig::default());
//! let result = pipeline.run(&mut driver, &RunOptions::default()).unwrap();
//! println!("captured {} pages", result.page_count);
//! ```
//!
//! # Architecture
//!
//! ```text
//! Reader Window -> CaptureSession -> page_NNNN.png
//!                                        |
//!                     GeometryResolver (consensus crop)
//!                                        |
//!                  BookPdfWriter -> Ghostscript -> ExifTool
//! ```
//!
//! # License
//!
//! AGPL-3.0

pub mod border;
pub mod capture;
pub mod cli;
pub mod compress;
pub mod config;
pub mod geometry;
pub mod metadata;
pub mod pdf_writer;
pub mod pipeline;
pub mod util;
pub mod window;

// Re-exports for convenience
pub use border::{BorderScanner, ContentBounds, EdgeScan, ScanColors};
pub use capture::{CaptureError, CaptureOptions, CaptureSession, CaptureState};
pub use cli::{create_capture_progress_bar, create_spinner, Cli, ExitCode};
pub use compress::{CompressError, GhostscriptCompressor, QualityPreset};
pub use config::{Config, ConfigError, ConverterConfig};
pub use geometry::{CropConsensus, CropRect, GeometryError, GeometryResolver};
pub use metadata::{ExifToolStamper, MetadataError, MetadataFields};
pub use pdf_writer::{BookPdfWriter, PageLayout, PdfWriterError, PdfWriterOptions};
pub use pipeline::{
    ConversionPipeline, PipelineError, PipelineResult, ProgressCallback, RunOptions,
    SilentProgress,
};
pub use util::{
    ensure_dir_writable, format_duration, format_file_size, load_image, page_image_path,
    pixels_to_mm,
};
pub use window::{DesktopAutomation, WindowAutomation, WindowError, WindowRect};
