//! Page capture module
//!
//! Drives the reader window through the whole book: screenshot the
//! current page, persist it, click to the next page, and stop when the
//! reader stops advancing. Termination is an explicit state machine so
//! the loop can be exercised with scripted frames instead of a live
//! window.

use crate::util::page_image_path;
use crate::window::{WindowAutomation, WindowError, WindowRect};
use image::RgbImage;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Safety cap on captured pages; bounds runaway loops on a reader that
/// never stops advancing.
pub const DEFAULT_PAGE_LIMIT: usize = 500;

/// Settle time for the reader to re-render after a page-turn click.
pub const DEFAULT_RENDER_DELAY_MS: u64 = 500;

/// Page-turn click offset from the window's right edge (spread mode).
const RIGHT_CLICK_INSET: i32 = 20;

/// Page-turn click offset from the window's left edge.
const LEFT_CLICK_OFFSET: i32 = 110;

/// Capture error types
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Window(#[from] WindowError),

    #[error("Output folder error: {0}")]
    OutputDir(String),

    #[error("Failed to persist page {page}: {reason}")]
    Persist { page: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, CaptureError>;

/// Capture loop states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Capturing,
    Done,
}

/// Capture loop options
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Hard stop after this many persisted pages.
    pub page_limit: usize,
    /// Pause after each page-turn click.
    pub render_delay: Duration,
    /// Click near the right window edge instead of the left one
    /// (forward navigation for right-to-left spreads).
    pub turn_from_right: bool,
    /// Folder receiving `page_NNNN.png`.
    pub output_dir: PathBuf,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            render_delay: Duration::from_millis(DEFAULT_RENDER_DELAY_MS),
            turn_from_right: false,
            output_dir: PathBuf::from("output"),
        }
    }
}

/// Stateful capture loop over one reader window.
///
/// Owns the window driver for the session's duration; nothing else may
/// touch input devices or window state while it runs. Two byte-identical
/// consecutive frames are the sole end-of-book oracle besides the page
/// cap, so any rendering jitter in the reader (transition animations,
/// cursor overlays) breaks termination.
pub struct CaptureSession<'a, W: WindowAutomation> {
    driver: &'a mut W,
    options: CaptureOptions,
    state: CaptureState,
    prev_frame: Option<RgbImage>,
    pages_captured: usize,
}

impl<'a, W: WindowAutomation> CaptureSession<'a, W> {
    pub fn new(driver: &'a mut W, options: CaptureOptions) -> Self {
        Self {
            driver,
            options,
            state: CaptureState::Capturing,
            prev_frame: None,
            pages_captured: 0,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn pages_captured(&self) -> usize {
        self.pages_captured
    }

    /// Run the loop to completion. `on_page` is invoked with each page
    /// index as it is persisted. Returns the number of persisted pages.
    pub fn run(&mut self, mut on_page: impl FnMut(usize)) -> Result<usize> {
        crate::util::ensure_dir_writable(&self.options.output_dir)
            .map_err(CaptureError::OutputDir)?;

        while self.state == CaptureState::Capturing {
            if let Some(page) = self.step()? {
                on_page(page);
            }
        }
        Ok(self.pages_captured)
    }

    /// One loop iteration: screenshot, duplicate check, persist, turn.
    /// Returns the persisted page index, or `None` when the iteration
    /// ended the session instead.
    pub fn step(&mut self) -> Result<Option<usize>> {
        if self.state == CaptureState::Done {
            return Ok(None);
        }

        // Geometry is queried fresh each iteration rather than cached.
        let rect = self.driver.window_rect()?;
        let region = WindowRect {
            width: rect.width.saturating_sub(1),
            height: rect.height.saturating_sub(1),
            ..rect
        };
        let frame = self.driver.capture_region(&region)?;

        if self.is_last_page(&frame) {
            // The reader did not advance; the duplicate is not persisted.
            self.state = CaptureState::Done;
            return Ok(None);
        }

        let page = self.pages_captured + 1;
        self.persist(&frame, page)?;
        self.pages_captured = page;
        self.prev_frame = Some(frame);

        self.turn_page(&rect)?;

        if self.pages_captured >= self.options.page_limit {
            self.state = CaptureState::Done;
        }
        Ok(Some(page))
    }

    /// Byte-exact comparison against the previous frame.
    fn is_last_page(&self, frame: &RgbImage) -> bool {
        self.prev_frame
            .as_ref()
            .is_some_and(|prev| prev.as_raw() == frame.as_raw())
    }

    fn persist(&self, frame: &RgbImage, page: usize) -> Result<()> {
        let path = page_image_path(&self.options.output_dir, page);
        frame.save(&path).map_err(|e| CaptureError::Persist {
            page,
            reason: e.to_string(),
        })
    }

    /// Click the next-page zone and give the reader time to re-render.
    fn turn_page(&mut self, rect: &WindowRect) -> Result<()> {
        let x = if self.options.turn_from_right {
            rect.right() - RIGHT_CLICK_INSET
        } else {
            rect.left + LEFT_CLICK_OFFSET
        };
        let y = rect.v_center();

        self.driver.click(x, y)?;
        std::thread::sleep(self.options.render_delay);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    /// Scripted stand-in for the desktop driver: serves a fixed frame
    /// sequence (repeating the last frame once exhausted) or an endless
    /// stream of unique frames, and records clicks and capture regions.
    struct FakeDriver {
        frames: Vec<RgbImage>,
        endless_unique: bool,
        calls: usize,
        rect: WindowRect,
        clicks: Vec<(i32, i32)>,
        regions: Vec<WindowRect>,
    }

    impl FakeDriver {
        fn scripted(frames: Vec<RgbImage>) -> Self {
            Self {
                frames,
                endless_unique: false,
                calls: 0,
                rect: WindowRect {
                    left: 100,
                    top: 50,
                    width: 600,
                    height: 400,
                },
                clicks: Vec::new(),
                regions: Vec::new(),
            }
        }

        fn endless() -> Self {
            Self {
                endless_unique: true,
                ..Self::scripted(Vec::new())
            }
        }
    }

    impl WindowAutomation for FakeDriver {
        fn find_window(&mut self, _title: &str) -> crate::window::Result<()> {
            Ok(())
        }

        fn window_rect(&mut self) -> crate::window::Result<WindowRect> {
            Ok(self.rect)
        }

        fn activate(&mut self) -> crate::window::Result<()> {
            Ok(())
        }

        fn maximize(&mut self) -> crate::window::Result<()> {
            Ok(())
        }

        fn capture_region(&mut self, region: &WindowRect) -> crate::window::Result<RgbImage> {
            self.regions.push(*region);
            let call = self.calls;
            self.calls += 1;

            if self.endless_unique {
                return Ok(frame((call % 256) as u8, (call / 256) as u8));
            }
            let idx = call.min(self.frames.len() - 1);
            Ok(self.frames[idx].clone())
        }

        fn click(&mut self, x: i32, y: i32) -> crate::window::Result<()> {
            self.clicks.push((x, y));
            Ok(())
        }
    }

    fn frame(r: u8, g: u8) -> RgbImage {
        RgbImage::from_pixel(8, 8, Rgb([r, g, 0]))
    }

    fn options(dir: &std::path::Path) -> CaptureOptions {
        CaptureOptions {
            render_delay: Duration::ZERO,
            output_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_frame_stops_without_persisting() {
        let dir = tempdir().unwrap();
        let mut driver = FakeDriver::scripted(vec![frame(1, 0), frame(2, 0), frame(2, 0)]);
        let mut session = CaptureSession::new(&mut driver, options(dir.path()));

        let pages = session.run(|_| {}).unwrap();

        assert_eq!(pages, 2);
        assert_eq!(session.state(), CaptureState::Done);
        assert!(page_image_path(dir.path(), 1).exists());
        assert!(page_image_path(dir.path(), 2).exists());
        assert!(!page_image_path(dir.path(), 3).exists());
    }

    #[test]
    fn test_distinct_frames_persist_consecutively() {
        let dir = tempdir().unwrap();
        let mut driver = FakeDriver::scripted(vec![frame(1, 0), frame(2, 0), frame(3, 0)]);
        let mut session = CaptureSession::new(&mut driver, options(dir.path()));

        let mut seen = Vec::new();
        let pages = session.run(|p| seen.push(p)).unwrap();

        // The script repeats frame 3, so the fourth capture terminates.
        assert_eq!(pages, 3);
        assert_eq!(seen, vec![1, 2, 3]);
        for page in 1..=3 {
            assert!(page_image_path(dir.path(), page).exists());
        }
    }

    #[test]
    fn test_first_frame_is_never_a_duplicate() {
        let dir = tempdir().unwrap();
        let mut driver = FakeDriver::scripted(vec![frame(1, 0)]);
        let mut session = CaptureSession::new(&mut driver, options(dir.path()));

        let pages = session.run(|_| {}).unwrap();
        assert_eq!(pages, 1);
    }

    #[test]
    fn test_page_cap_bounds_a_never_ending_source() {
        let dir = tempdir().unwrap();
        let mut driver = FakeDriver::endless();
        let mut session = CaptureSession::new(
            &mut driver,
            CaptureOptions {
                page_limit: 5,
                ..options(dir.path())
            },
        );

        let pages = session.run(|_| {}).unwrap();

        assert_eq!(pages, 5);
        assert_eq!(session.state(), CaptureState::Done);
        // The turn click fires before the cap check, so every persisted
        // page clicked once.
        assert_eq!(driver.clicks.len(), 5);
    }

    #[test]
    fn test_step_after_done_is_a_no_op() {
        let dir = tempdir().unwrap();
        let mut driver = FakeDriver::scripted(vec![frame(1, 0), frame(1, 0)]);
        let mut session = CaptureSession::new(&mut driver, options(dir.path()));

        session.run(|_| {}).unwrap();
        assert_eq!(session.state(), CaptureState::Done);
        assert_eq!(session.step().unwrap(), None);
        assert_eq!(session.pages_captured(), 1);
    }

    #[test]
    fn test_turn_click_positions() {
        let dir = tempdir().unwrap();
        let script = vec![frame(1, 0), frame(1, 0)];

        let mut left_driver = FakeDriver::scripted(script.clone());
        CaptureSession::new(&mut left_driver, options(dir.path()))
            .run(|_| {})
            .unwrap();
        // left + 110, top + height/2
        assert_eq!(left_driver.clicks, vec![(210, 250)]);

        let mut right_driver = FakeDriver::scripted(script);
        CaptureSession::new(
            &mut right_driver,
            CaptureOptions {
                turn_from_right: true,
                ..options(dir.path())
            },
        )
        .run(|_| {})
        .unwrap();
        // (left + width) - 20
        assert_eq!(right_driver.clicks, vec![(680, 250)]);
    }

    #[test]
    fn test_capture_region_is_one_pixel_short() {
        let dir = tempdir().unwrap();
        let mut driver = FakeDriver::scripted(vec![frame(1, 0), frame(1, 0)]);
        CaptureSession::new(&mut driver, options(dir.path()))
            .run(|_| {})
            .unwrap();

        assert_eq!(driver.regions[0].width, 599);
        assert_eq!(driver.regions[0].height, 399);
    }
}
