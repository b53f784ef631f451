//! Page geometry module
//!
//! Aggregates per-frame border detection into the single crop rectangle
//! shared by every page of a book, and applies it in place.

use crate::border::{BorderScanner, EdgeScan, ScanColors};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Geometry error types
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Could not resolve a crop rectangle: no page yielded all four borders")]
    Unresolved,

    #[error("Invalid page image {path}: {reason}")]
    InvalidImage { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GeometryError>;

/// The consensus content rectangle, inclusive pixel bounds in source
/// coordinates. Derived once from the whole page set and applied
/// uniformly; never recomputed per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRect {
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }
}

/// A page that contributed nothing to the consensus, with whatever
/// partial edges its scan produced.
#[derive(Debug, Clone)]
pub struct PageSkip {
    pub path: PathBuf,
    pub scan: EdgeScan,
}

/// Outcome of consensus resolution over a page set.
#[derive(Debug)]
pub struct CropConsensus {
    pub rect: CropRect,
    /// Pages with a complete detection result.
    pub pages_used: usize,
    /// Pages rejected for an incomplete result.
    pub skipped: Vec<PageSkip>,
}

/// Resolves and applies the book-wide crop rectangle.
pub struct GeometryResolver;

impl GeometryResolver {
    /// Run the border scanner over every page and take the widest
    /// observed content rectangle: min left, max right, min top, max
    /// bottom over the pages with a complete result. Pages with an
    /// incomplete result are skipped, not fatal; zero complete results
    /// is.
    pub fn resolve(pages: &[PathBuf], colors: &ScanColors) -> Result<CropConsensus> {
        let mut left: Option<u32> = None;
        let mut right: Option<u32> = None;
        let mut top: Option<u32> = None;
        let mut bottom: Option<u32> = None;
        let mut pages_used = 0usize;
        let mut skipped = Vec::new();

        for path in pages {
            let image = crate::util::load_image(path)
                .map_err(|reason| GeometryError::InvalidImage {
                    path: path.clone(),
                    reason,
                })?
                .to_rgb8();

            let scan = BorderScanner::scan(&image, colors);
            match scan.complete() {
                Some(bounds) => {
                    left = Some(left.map_or(bounds.left, |cur| cur.min(bounds.left)));
                    right = Some(right.map_or(bounds.right, |cur| cur.max(bounds.right)));
                    top = Some(top.map_or(bounds.top, |cur| cur.min(bounds.top)));
                    bottom = Some(bottom.map_or(bounds.bottom, |cur| cur.max(bounds.bottom)));
                    pages_used += 1;
                }
                None => skipped.push(PageSkip {
                    path: path.clone(),
                    scan,
                }),
            }
        }

        match (left, right, top, bottom) {
            (Some(left), Some(right), Some(top), Some(bottom)) => Ok(CropConsensus {
                rect: CropRect {
                    left,
                    top,
                    right,
                    bottom,
                },
                pages_used,
                skipped,
            }),
            _ => Err(GeometryError::Unresolved),
        }
    }

    /// Crop every page in place to the consensus rectangle, overwriting
    /// each file. All pages come out with the rectangle's dimensions.
    pub fn crop_pages(pages: &[PathBuf], rect: &CropRect) -> Result<()> {
        for path in pages {
            Self::crop_page(path, rect)?;
        }
        Ok(())
    }

    fn crop_page(path: &Path, rect: &CropRect) -> Result<()> {
        let image = crate::util::load_image(path).map_err(|reason| GeometryError::InvalidImage {
            path: path.to_path_buf(),
            reason,
        })?;

        let cropped = image.crop_imm(rect.left, rect.top, rect.width(), rect.height());
        cropped
            .save(path)
            .map_err(|e| GeometryError::InvalidImage {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    const BORDER: Rgb<u8> = Rgb([0xE7, 0xE7, 0xE7]);
    const WHITE: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);
    const INK: Rgb<u8> = Rgb([40, 40, 40]);

    fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                img.put_pixel(x, y, color);
            }
        }
    }

    /// 300x400 page with a 10px frame ring and a configurable background
    /// margin before the content block.
    fn framed_page(margin: u32) -> RgbImage {
        let (width, height) = (300u32, 400u32);
        let mut img = RgbImage::from_pixel(width, height, WHITE);
        fill_rect(&mut img, 0, 0, width - 1, 9, BORDER);
        fill_rect(&mut img, 0, height - 10, width - 1, height - 1, BORDER);
        fill_rect(&mut img, 0, 0, 9, height - 1, BORDER);
        fill_rect(&mut img, width - 10, 0, width - 1, height - 1, BORDER);
        let inset = 10 + margin;
        fill_rect(
            &mut img,
            inset,
            inset,
            width - 1 - inset,
            height - 1 - inset,
            INK,
        );
        img
    }

    fn write_pages(dir: &Path, images: &[RgbImage]) -> Vec<PathBuf> {
        images
            .iter()
            .enumerate()
            .map(|(i, img)| {
                let path = crate::util::page_image_path(dir, i + 1);
                img.save(&path).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_crop_rect_dimensions() {
        let rect = CropRect {
            left: 30,
            top: 1,
            right: 269,
            bottom: 397,
        };
        assert_eq!(rect.width(), 240);
        assert_eq!(rect.height(), 397);
    }

    #[test]
    fn test_consensus_takes_widest_extents() {
        let dir = tempdir().unwrap();
        // margin 20 => content at 30..=269; margin 30 => 40..=259
        let pages = write_pages(dir.path(), &[framed_page(20), framed_page(30)]);

        let consensus = GeometryResolver::resolve(&pages, &ScanColors::default()).unwrap();

        assert_eq!(consensus.pages_used, 2);
        assert!(consensus.skipped.is_empty());
        assert_eq!(
            consensus.rect,
            CropRect {
                left: 30,
                top: 1,
                right: 269,
                bottom: 397,
            }
        );
    }

    #[test]
    fn test_invalid_pages_are_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        let blank = RgbImage::from_pixel(300, 400, WHITE);
        let pages = write_pages(
            dir.path(),
            &[framed_page(20), blank.clone(), framed_page(30), blank],
        );

        let consensus = GeometryResolver::resolve(&pages, &ScanColors::default()).unwrap();

        assert_eq!(consensus.pages_used, 2);
        assert_eq!(consensus.skipped.len(), 2);
        assert_eq!(
            consensus.rect,
            CropRect {
                left: 30,
                top: 1,
                right: 269,
                bottom: 397,
            }
        );
    }

    #[test]
    fn test_consensus_independent_of_invalid_ordering() {
        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();
        let blank = RgbImage::from_pixel(300, 400, WHITE);

        let front = write_pages(
            dir_a.path(),
            &[blank.clone(), framed_page(20), framed_page(30)],
        );
        let back = write_pages(dir_b.path(), &[framed_page(20), framed_page(30), blank]);

        let a = GeometryResolver::resolve(&front, &ScanColors::default()).unwrap();
        let b = GeometryResolver::resolve(&back, &ScanColors::default()).unwrap();
        assert_eq!(a.rect, b.rect);
    }

    #[test]
    fn test_no_usable_page_is_fatal() {
        let dir = tempdir().unwrap();
        let blank = RgbImage::from_pixel(300, 400, WHITE);
        let pages = write_pages(dir.path(), &[blank.clone(), blank]);

        let result = GeometryResolver::resolve(&pages, &ScanColors::default());
        assert!(matches!(result, Err(GeometryError::Unresolved)));
    }

    #[test]
    fn test_missing_page_file_is_an_error() {
        let pages = vec![PathBuf::from("/nonexistent/page_0001.png")];
        let result = GeometryResolver::resolve(&pages, &ScanColors::default());
        assert!(matches!(result, Err(GeometryError::InvalidImage { .. })));
    }

    #[test]
    fn test_crop_pages_uniform_dimensions() {
        let dir = tempdir().unwrap();
        let pages = write_pages(dir.path(), &[framed_page(20), framed_page(30)]);
        let rect = CropRect {
            left: 30,
            top: 1,
            right: 269,
            bottom: 397,
        };

        GeometryResolver::crop_pages(&pages, &rect).unwrap();

        for path in &pages {
            let img = image::open(path).unwrap();
            assert_eq!((img.width(), img.height()), (rect.width(), rect.height()));
        }
    }

    #[test]
    fn test_crop_is_not_idempotent_in_dimensions() {
        let dir = tempdir().unwrap();
        let pages = write_pages(dir.path(), &[framed_page(20)]);
        let rect = CropRect {
            left: 30,
            top: 1,
            right: 269,
            bottom: 397,
        };

        GeometryResolver::crop_pages(&pages, &rect).unwrap();
        let first = image::open(&pages[0]).unwrap();
        GeometryResolver::crop_pages(&pages, &rect).unwrap();
        let second = image::open(&pages[0]).unwrap();

        // Cropping again shrinks; the offsets now cut into page content.
        assert!(second.width() < first.width());
    }
}
