//! Border detection module
//!
//! Locates the content region inside a captured reader frame by scanning
//! sampled rows and columns for transitions between the reader's frame
//! color and the blank page background.

use image::{Rgb, RgbImage};

/// Columns skipped at the right image edge. Some window managers draw a
/// dark frame there that would otherwise be taken for content.
const RIGHT_EDGE_EXCLUSION: u32 = 20;

/// The two colors the scanner keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanColors {
    /// Solid frame color the reader draws around page content.
    pub border: Rgb<u8>,
    /// Blank margin color within the frame, surrounding actual content.
    pub background: Rgb<u8>,
}

impl Default for ScanColors {
    fn default() -> Self {
        Self {
            border: Rgb([0xE7, 0xE7, 0xE7]),
            background: Rgb([0xFF, 0xFF, 0xFF]),
        }
    }
}

impl ScanColors {
    /// Colors for readers that render pages on a black background
    /// (comic/manga view).
    pub fn dark_pages() -> Self {
        Self {
            background: Rgb([0, 0, 0]),
            ..Default::default()
        }
    }
}

/// Edge coordinates found on a single frame. Each edge is independent;
/// a missing edge means that scan found no usable transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeScan {
    pub left: Option<u32>,
    pub right: Option<u32>,
    pub top: Option<u32>,
    pub bottom: Option<u32>,
}

impl EdgeScan {
    /// All four edges found.
    pub fn complete(&self) -> Option<ContentBounds> {
        Some(ContentBounds {
            left: self.left?,
            top: self.top?,
            right: self.right?,
            bottom: self.bottom?,
        })
    }
}

/// Content rectangle of one frame, inclusive pixel bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ContentBounds {
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }
}

/// Scanline border detector.
///
/// Pure functions over an in-memory frame; no state, no I/O. The scan
/// conventions (arming on the frame color, the fixed right-edge
/// exclusion, `y + 1` top and `y - 1` bottom offsets) are load-bearing
/// for the reader skin this targets and must not be normalized.
pub struct BorderScanner;

impl BorderScanner {
    /// Scan one frame, returning whatever edges were found.
    pub fn scan(image: &RgbImage, colors: &ScanColors) -> EdgeScan {
        let (left, right) = Self::scan_horizontal(image, colors);
        let (top, bottom) = Self::scan_vertical(image, colors);
        EdgeScan {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Scan one frame, succeeding only when all four edges were found.
    pub fn detect(image: &RgbImage, colors: &ScanColors) -> Option<ContentBounds> {
        Self::scan(image, colors).complete()
    }

    /// Left/right bounds from two sample rows at 1/3 and 2/3 of the
    /// image height. The widest span observed wins; a row that found
    /// nothing does not veto the other.
    pub fn scan_horizontal(image: &RgbImage, colors: &ScanColors) -> (Option<u32>, Option<u32>) {
        let mut left: Option<u32> = None;
        let mut right: Option<u32> = None;

        let y_block = image.height() / 3;
        for sample_y in [y_block, y_block * 2] {
            if let Some(l) = Self::find_left_border(image, colors, sample_y) {
                left = Some(left.map_or(l, |cur| cur.min(l)));
            }
            if let Some(r) = Self::find_right_border(image, colors, sample_y) {
                right = Some(right.map_or(r, |cur| cur.max(r)));
            }
        }
        (left, right)
    }

    /// Top/bottom bounds from two sample columns at 1/3 and 2/3 of the
    /// image width, combined the same way as the horizontal scan.
    pub fn scan_vertical(image: &RgbImage, colors: &ScanColors) -> (Option<u32>, Option<u32>) {
        let mut top: Option<u32> = None;
        let mut bottom: Option<u32> = None;

        let x_block = image.width() / 3;
        for sample_x in [x_block, x_block * 2] {
            if let Some(t) = Self::find_top_border(image, colors, sample_x) {
                top = Some(top.map_or(t, |cur| cur.min(t)));
            }
            if let Some(b) = Self::find_bottom_border(image, colors, sample_x) {
                bottom = Some(bottom.map_or(b, |cur| cur.max(b)));
            }
        }
        (top, bottom)
    }

    /// Left bound on one row: seeing the frame color arms detection;
    /// after that, the first column whose predecessor was exactly the
    /// background and which itself is not. The arming column never
    /// satisfies the transition check.
    fn find_left_border(image: &RgbImage, colors: &ScanColors, sample_y: u32) -> Option<u32> {
        let mut border_seen = false;
        let mut prev_pixel: Option<Rgb<u8>> = None;

        for x in 0..image.width() {
            let pixel = *image.get_pixel(x, sample_y);
            if !border_seen {
                if pixel == colors.border {
                    border_seen = true;
                }
            } else if prev_pixel == Some(colors.background) && pixel != colors.background {
                return Some(x);
            }
            prev_pixel = Some(pixel);
        }
        None
    }

    /// Right bound on one row: scan inward from `width - 20`, returning
    /// the first column whose outer neighbor was exactly the background
    /// and which itself is not. No arming on this side.
    fn find_right_border(image: &RgbImage, colors: &ScanColors, sample_y: u32) -> Option<u32> {
        let start = image.width().checked_sub(RIGHT_EDGE_EXCLUSION)?;
        let mut prev_pixel: Option<Rgb<u8>> = None;

        for x in (0..=start).rev() {
            let pixel = *image.get_pixel(x, sample_y);
            if prev_pixel == Some(colors.background) && pixel != colors.background {
                return Some(x);
            }
            prev_pixel = Some(pixel);
        }
        None
    }

    /// Top bound on one column: one row past the first row matching the
    /// frame color.
    fn find_top_border(image: &RgbImage, colors: &ScanColors, sample_x: u32) -> Option<u32> {
        for y in 0..image.height() {
            if *image.get_pixel(sample_x, y) == colors.border {
                return Some(y + 1);
            }
        }
        None
    }

    /// Bottom bound on one column: scanning upward, the first frame
    /// pixel arms detection; the bound is one row below the next frame
    /// pixel after that.
    fn find_bottom_border(image: &RgbImage, colors: &ScanColors, sample_x: u32) -> Option<u32> {
        let mut border_seen = false;

        for y in (0..image.height()).rev() {
            let pixel = *image.get_pixel(sample_x, y);
            if !border_seen {
                if pixel == colors.border {
                    border_seen = true;
                }
            } else if pixel == colors.border {
                return y.checked_sub(1);
            }
        }
        None
    }
}
