//! Configuration file support for kindle2pdf
//!
//! Supports TOML configuration files with the following search order:
//! 1. `--config <path>` - explicitly specified path
//! 2. `./kindle2pdf.toml` - current directory
//! 3. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [colors]
//! border = [231, 231, 231]
//! background = [255, 255, 255]
//!
//! [capture]
//! window_title = "Kindle for PC"
//! page_limit = 500
//! click_delay_ms = 500
//!
//! [output]
//! directory = "output"
//! ```

use crate::border::ScanColors;
use crate::capture::{CaptureOptions, DEFAULT_PAGE_LIMIT, DEFAULT_RENDER_DELAY_MS};
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Title substring identifying the reader window.
pub const DEFAULT_WINDOW_TITLE: &str = "Kindle for PC";

/// Folder receiving page images and intermediate PDFs.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Uncompressed intermediate document name.
pub const TEMP_BOOK_NAME: &str = "temp_book.pdf";

/// Compressed intermediate document name.
pub const TEMP_CMP_BOOK_NAME: &str = "temp_cmp_book.pdf";

/// Default output base name.
pub const DEFAULT_BOOK_NAME: &str = "kindle_book";

/// Config file name searched in the working directory.
const CONFIG_FILE_NAME: &str = "kindle2pdf.toml";

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// File not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Scan color overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ColorsConfig {
    /// Frame color the reader draws around page content
    #[serde(default)]
    pub border: Option<[u8; 3]>,

    /// Blank margin color within the frame
    #[serde(default)]
    pub background: Option<[u8; 3]>,
}

/// Capture loop overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    /// Title substring of the reader window
    #[serde(default)]
    pub window_title: Option<String>,

    /// Safety cap on captured pages
    #[serde(default)]
    pub page_limit: Option<usize>,

    /// Pause after each page-turn click, in milliseconds
    #[serde(default)]
    pub click_delay_ms: Option<u64>,
}

/// Output location overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Folder receiving page images and intermediates
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Color settings
    #[serde(default)]
    pub colors: ColorsConfig,

    /// Capture settings
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from the default search path
    ///
    /// Reads `./kindle2pdf.toml` when present, otherwise defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Resolve file values over defaults into the immutable run
    /// configuration.
    pub fn resolve(&self) -> ConverterConfig {
        let defaults = ConverterConfig::default();

        let border = self.colors.border.map_or(defaults.colors.border, Rgb);
        let background = self
            .colors
            .background
            .map_or(defaults.colors.background, Rgb);

        ConverterConfig {
            colors: ScanColors { border, background },
            window_title: self
                .capture
                .window_title
                .clone()
                .unwrap_or(defaults.window_title),
            page_limit: self.capture.page_limit.unwrap_or(defaults.page_limit),
            render_delay: self
                .capture
                .click_delay_ms
                .map_or(defaults.render_delay, Duration::from_millis),
            output_dir: self
                .output
                .directory
                .clone()
                .unwrap_or(defaults.output_dir),
        }
    }
}

/// Immutable, fully-resolved run configuration passed into the pipeline
/// at construction.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Colors the border scanner keys on.
    pub colors: ScanColors,
    /// Title substring of the reader window.
    pub window_title: String,
    /// Safety cap on captured pages.
    pub page_limit: usize,
    /// Pause after each page-turn click.
    pub render_delay: Duration,
    /// Folder receiving page images and intermediates.
    pub output_dir: PathBuf,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            colors: ScanColors::default(),
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            render_delay: Duration::from_millis(DEFAULT_RENDER_DELAY_MS),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl ConverterConfig {
    /// Switch the background assumption to black for readers rendering
    /// comic/manga pages on a dark canvas.
    pub fn for_dark_pages(mut self) -> Self {
        self.colors.background = Rgb([0, 0, 0]);
        self
    }

    /// Capture options for one session.
    pub fn capture_options(&self, turn_from_right: bool) -> CaptureOptions {
        CaptureOptions {
            page_limit: self.page_limit,
            render_delay: self.render_delay,
            turn_from_right,
            output_dir: self.output_dir.clone(),
        }
    }
}
