//! PDF compression module
//!
//! Wraps the external Ghostscript `pdfwrite` device. Compression is a
//! best-effort stage: the pipeline falls back to the uncompressed
//! document when the tool is missing or exits nonzero.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Ghostscript console binary on Windows.
const GS_BINARY_WINDOWS: &str = "gswin64c";

/// Ghostscript binary elsewhere.
const GS_BINARY_UNIX: &str = "gs";

/// PDF version emitted by the pdfwrite device.
const COMPATIBILITY_LEVEL: &str = "1.4";

/// Compression error types
#[derive(Debug, Error)]
pub enum CompressError {
    #[error("Input PDF not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Ghostscript could not be run: {0}")]
    ToolUnavailable(String),

    #[error("Ghostscript exited with an error: {0}")]
    ToolFailed(String),
}

pub type Result<T> = std::result::Result<T, CompressError>;

/// Ghostscript `-dPDFSETTINGS` quality presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QualityPreset {
    /// 72 dpi, smallest output.
    Screen,
    /// 150 dpi, sized for e-readers.
    #[default]
    Ebook,
    /// 300 dpi.
    Printer,
    /// 300 dpi, color-preserving.
    Prepress,
}

impl QualityPreset {
    fn as_arg(self) -> &'static str {
        match self {
            QualityPreset::Screen => "/screen",
            QualityPreset::Ebook => "/ebook",
            QualityPreset::Printer => "/printer",
            QualityPreset::Prepress => "/prepress",
        }
    }
}

/// Ghostscript-based PDF compressor.
pub struct GhostscriptCompressor;

impl GhostscriptCompressor {
    /// Platform binary name.
    pub fn binary() -> &'static str {
        if cfg!(windows) {
            GS_BINARY_WINDOWS
        } else {
            GS_BINARY_UNIX
        }
    }

    /// Argument vector for one compression run.
    pub fn command_args(input: &Path, output: &Path, preset: QualityPreset) -> Vec<String> {
        vec![
            "-sDEVICE=pdfwrite".to_string(),
            format!("-dCompatibilityLevel={}", COMPATIBILITY_LEVEL),
            format!("-dPDFSETTINGS={}", preset.as_arg()),
            "-dNOPAUSE".to_string(),
            "-dQUIET".to_string(),
            "-dBATCH".to_string(),
            format!("-sOutputFile={}", output.display()),
            input.display().to_string(),
        ]
    }

    /// Compress `input` into `output`. Attempted once, no retries.
    pub fn compress(input: &Path, output: &Path, preset: QualityPreset) -> Result<()> {
        if !input.exists() {
            return Err(CompressError::InputNotFound(input.to_path_buf()));
        }

        let result = Command::new(Self::binary())
            .args(Self::command_args(input, output, preset))
            .output()
            .map_err(|e| CompressError::ToolUnavailable(e.to_string()))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(CompressError::ToolFailed(stderr.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args_ebook_preset() {
        let args = GhostscriptCompressor::command_args(
            Path::new("output/temp_book.pdf"),
            Path::new("output/temp_cmp_book.pdf"),
            QualityPreset::Ebook,
        );

        assert_eq!(
            args,
            vec![
                "-sDEVICE=pdfwrite",
                "-dCompatibilityLevel=1.4",
                "-dPDFSETTINGS=/ebook",
                "-dNOPAUSE",
                "-dQUIET",
                "-dBATCH",
                "-sOutputFile=output/temp_cmp_book.pdf",
                "output/temp_book.pdf",
            ]
        );
    }

    #[test]
    fn test_preset_arguments() {
        assert_eq!(QualityPreset::Screen.as_arg(), "/screen");
        assert_eq!(QualityPreset::Ebook.as_arg(), "/ebook");
        assert_eq!(QualityPreset::Printer.as_arg(), "/printer");
        assert_eq!(QualityPreset::Prepress.as_arg(), "/prepress");
        assert_eq!(QualityPreset::default(), QualityPreset::Ebook);
    }

    #[test]
    fn test_binary_name_for_platform() {
        if cfg!(windows) {
            assert_eq!(GhostscriptCompressor::binary(), "gswin64c");
        } else {
            assert_eq!(GhostscriptCompressor::binary(), "gs");
        }
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let result = GhostscriptCompressor::compress(
            Path::new("/nonexistent/book.pdf"),
            Path::new("/tmp/out.pdf"),
            QualityPreset::Ebook,
        );
        assert!(matches!(result, Err(CompressError::InputNotFound(_))));
    }
}
