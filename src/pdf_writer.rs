//! PDF assembly module
//!
//! Builds a single PDF from the cropped page set. One point per source
//! pixel, so page dimensions in the document equal the crop rectangle
//! in pixels.
//!
//! Two layouts:
//!
//! - **Single**: one PDF page per image, sized to the crop rectangle.
//! - **Spread**: each image is split at its horizontal midline into two
//!   half-width pages, right half first; right-to-left dual-page books
//!   read the physical right page before the left one.

use crate::util::pixels_to_mm;
use image::RgbImage;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Raster resolution at which one pixel equals one PDF point.
const POINT_DPI: u32 = 72;

/// PDF writing error types
#[derive(Debug, Error)]
pub enum PdfWriterError {
    #[error("No images provided")]
    NoImages,

    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("PDF generation error: {0}")]
    GenerationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PdfWriterError>;

/// Page layout modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageLayout {
    /// One PDF page per source image.
    #[default]
    Single,
    /// Two half-width pages per source image, right half first.
    Spread,
}

/// PDF generation options
#[derive(Debug, Clone)]
pub struct PdfWriterOptions {
    /// Source page width in pixels (the crop rectangle width).
    pub page_width: u32,
    /// Source page height in pixels.
    pub page_height: u32,
    /// Layout mode.
    pub layout: PageLayout,
    /// Document title.
    pub title: String,
}

impl PdfWriterOptions {
    pub fn new(page_width: u32, page_height: u32) -> Self {
        Self {
            page_width,
            page_height,
            layout: PageLayout::Single,
            title: "Document".to_string(),
        }
    }

    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Width of each emitted page in pixels.
    pub fn emitted_page_width(&self) -> u32 {
        match self.layout {
            PageLayout::Single => self.page_width,
            PageLayout::Spread => self.page_width / 2,
        }
    }
}

/// printpdf-based book assembler.
pub struct BookPdfWriter;

impl BookPdfWriter {
    /// Write the page set to a single PDF document.
    pub fn write_book(pages: &[PathBuf], output: &Path, options: &PdfWriterOptions) -> Result<()> {
        if pages.is_empty() {
            return Err(PdfWriterError::NoImages);
        }
        for path in pages {
            if !path.exists() {
                return Err(PdfWriterError::ImageNotFound(path.clone()));
            }
        }

        let width_mm = pixels_to_mm(options.emitted_page_width(), POINT_DPI);
        let height_mm = pixels_to_mm(options.page_height, POINT_DPI);

        let (doc, first_page, first_layer) = printpdf::PdfDocument::new(
            options.title.as_str(),
            printpdf::Mm(width_mm),
            printpdf::Mm(height_mm),
            "Layer 1",
        );

        let mut slot = Some((first_page, first_layer));
        let mut next_slot = |doc: &printpdf::PdfDocumentReference| {
            slot.take().unwrap_or_else(|| {
                doc.add_page(printpdf::Mm(width_mm), printpdf::Mm(height_mm), "Layer 1")
            })
        };

        for path in pages {
            let image = Self::load_page(path)?;
            match options.layout {
                PageLayout::Single => {
                    let (page, layer) = next_slot(&doc);
                    Self::place_image(&doc, page, layer, image)?;
                }
                PageLayout::Spread => {
                    let (right_half, left_half) = Self::split_spread(&image);
                    let (page, layer) = next_slot(&doc);
                    Self::place_image(&doc, page, layer, right_half)?;
                    let (page, layer) = next_slot(&doc);
                    Self::place_image(&doc, page, layer, left_half)?;
                }
            }
        }

        let file = File::create(output)?;
        let mut writer = BufWriter::new(file);
        doc.save(&mut writer)
            .map_err(|e| PdfWriterError::GenerationError(e.to_string()))?;

        Ok(())
    }

    fn load_page(path: &Path) -> Result<RgbImage> {
        let image = image::open(path).map_err(|e| PdfWriterError::GenerationError(e.to_string()))?;
        Ok(image.to_rgb8())
    }

    /// Split an image at its horizontal midline. Both halves are exactly
    /// `width / 2` (floor) wide; an odd trailing column is dropped.
    fn split_spread(image: &RgbImage) -> (RgbImage, RgbImage) {
        let half_width = image.width() / 2;
        let height = image.height();
        let right = image::imageops::crop_imm(image, half_width, 0, half_width, height).to_image();
        let left = image::imageops::crop_imm(image, 0, 0, half_width, height).to_image();
        (right, left)
    }

    /// Embed the raster at the page origin, one point per pixel, so it
    /// fills the page exactly.
    ///
    /// printpdf embeds through its own re-exported image crate, so the
    /// pixel buffer is rewrapped rather than passed through directly.
    fn place_image(
        doc: &printpdf::PdfDocumentReference,
        page: printpdf::PdfPageIndex,
        layer: printpdf::PdfLayerIndex,
        image: RgbImage,
    ) -> Result<()> {
        let (width, height) = image.dimensions();
        let buffer = printpdf::image_crate::RgbImage::from_raw(width, height, image.into_raw())
            .ok_or_else(|| {
                PdfWriterError::GenerationError("image buffer size mismatch".to_string())
            })?;
        let dynamic = printpdf::image_crate::DynamicImage::ImageRgb8(buffer);

        let pdf_image = printpdf::Image::from_dynamic_image(&dynamic);
        pdf_image.add_to_layer(
            doc.get_page(page).get_layer(layer),
            printpdf::ImageTransform {
                dpi: Some(72.0),
                ..Default::default()
            },
        );
        Ok(())
    }
}
