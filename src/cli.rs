//! CLI interface module
//!
//! Provides command-line interface using clap derive macros.

use crate::config::DEFAULT_BOOK_NAME;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// Exit codes for the CLI
///
/// These codes follow standard Unix conventions and provide
/// specific error categories for scripting and automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArgs = 2,
    /// Reader window is not on screen
    WindowNotFound = 3,
    /// Output error (permission denied, disk full)
    OutputError = 4,
    /// Capture, geometry, or assembly error
    ProcessingError = 5,
    /// External tool (Ghostscript, ExifTool) error
    ExternalToolError = 6,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::InvalidArgs => "Invalid arguments",
            ExitCode::WindowNotFound => "Reader window not found",
            ExitCode::OutputError => "Output error (permission denied, disk full, etc.)",
            ExitCode::ProcessingError => "Processing error",
            ExitCode::ExternalToolError => "External tool error (Ghostscript, ExifTool)",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

/// Capture an on-screen e-reader book into a cropped, compressed PDF
#[derive(Parser, Debug)]
#[command(name = "kindle2pdf")]
#[command(version)]
#[command(about = "Capture an on-screen e-reader book into a cropped, compressed PDF")]
#[command(long_about = None)]
pub struct Cli {
    /// Output book name, without extension
    #[arg(short, long, default_value = DEFAULT_BOOK_NAME)]
    pub name: String,

    /// Dual-page spread capture: split each page at the midline and
    /// assume a black page background
    #[arg(short, long)]
    pub comic: bool,

    /// Advance by clicking near the window's right edge (forward
    /// navigation for right-to-left spreads)
    #[arg(short, long)]
    pub right: bool,

    /// Path to a TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Create a progress bar for page capture, bounded by the page cap
pub fn create_capture_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] Page {pos}/{len} - {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb
}

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb
}
