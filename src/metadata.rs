//! PDF metadata module
//!
//! Wraps the external ExifTool binary to stamp a fixed set of document
//! properties onto the final PDF. The stamped values identify the file
//! as a scanner-produced document; bit-exact output requires them to
//! stay byte-for-byte as they are.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Metadata error types
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Input PDF not found: {0}")]
    InputNotFound(PathBuf),

    #[error("ExifTool could not be run: {0}")]
    ToolUnavailable(String),

    #[error("ExifTool exited with an error: {0}")]
    ToolFailed(String),
}

pub type Result<T> = std::result::Result<T, MetadataError>;

/// The stamped field set. Defaults reproduce a ScanSnap-scanned
/// document with blank bibliographic fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFields {
    pub creator: String,
    pub creator_tool: String,
    pub producer: String,
    pub creation_date: String,
    pub mod_date: String,
    pub author: String,
    pub subject: String,
    pub title: String,
    pub keywords: String,
}

impl Default for MetadataFields {
    fn default() -> Self {
        Self {
            creator: "PFU ScanSnap Organizer 4.1.30 #S1500".to_string(),
            creator_tool: "PFU ScanSnap Organizer 4.1.30 #S1500".to_string(),
            producer: "Adobe PDF Scan Library 3.2".to_string(),
            creation_date: "D:20231016222044+09'00'".to_string(),
            mod_date: "D:20231016222044+09'00'".to_string(),
            author: String::new(),
            subject: String::new(),
            title: String::new(),
            keywords: String::new(),
        }
    }
}

/// ExifTool-based metadata stamper.
pub struct ExifToolStamper;

impl ExifToolStamper {
    /// Argument vector for one stamping run. ExifTool writes the
    /// stamped copy to `output` and leaves `input` untouched.
    pub fn command_args(fields: &MetadataFields, input: &Path, output: &Path) -> Vec<String> {
        vec![
            format!("-Creator={}", fields.creator),
            format!("-CreatorTool={}", fields.creator_tool),
            format!("-Producer={}", fields.producer),
            format!("-CreationDate={}", fields.creation_date),
            format!("-ModDate={}", fields.mod_date),
            format!("-Author={}", fields.author),
            format!("-Subject={}", fields.subject),
            format!("-Title={}", fields.title),
            format!("-Keywords={}", fields.keywords),
            "-o".to_string(),
            output.display().to_string(),
            input.display().to_string(),
        ]
    }

    /// Stamp `input` into `output`. Attempted once, no retries; the
    /// pipeline treats failure as best-effort.
    pub fn stamp(input: &Path, output: &Path, fields: &MetadataFields) -> Result<()> {
        if !input.exists() {
            return Err(MetadataError::InputNotFound(input.to_path_buf()));
        }

        let result = Command::new("exiftool")
            .args(Self::command_args(fields, input, output))
            .output()
            .map_err(|e| MetadataError::ToolUnavailable(e.to_string()))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(MetadataError::ToolFailed(stderr.to_string()));
        }

        Ok(())
    }
}
