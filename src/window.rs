//! Window automation module
//!
//! Boundary to the windowing system: finding the reader window,
//! querying its geometry, bringing it to the front, capturing it, and
//! synthesizing page-turn clicks. The rest of the crate depends only on
//! the [`WindowAutomation`] trait, so capture logic is testable without
//! a live desktop.

use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use image::{DynamicImage, RgbImage};
use thiserror::Error;

/// Window automation error types
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("Reader window not found: {0}")]
    NotFound(String),

    #[error("No window is attached to the driver")]
    NotAttached,

    #[error("Screen capture failed: {0}")]
    CaptureFailed(String),

    #[error("Input synthesis failed: {0}")]
    InputFailed(String),
}

pub type Result<T> = std::result::Result<T, WindowError>;

/// Window rectangle in absolute screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl WindowRect {
    /// Absolute x coordinate one past the window's right edge.
    pub fn right(&self) -> i32 {
        self.left + self.width as i32
    }

    /// Absolute y coordinate of the window's vertical middle.
    pub fn v_center(&self) -> i32 {
        self.top + (self.height / 2) as i32
    }
}

/// Operations the capture pipeline needs from the windowing system.
pub trait WindowAutomation {
    /// Attach to the first visible window whose title contains `title`.
    fn find_window(&mut self, title: &str) -> Result<()>;

    /// Rectangle of the attached window, queried fresh on every call.
    fn window_rect(&mut self) -> Result<WindowRect>;

    /// Bring the attached window to the foreground.
    fn activate(&mut self) -> Result<()>;

    /// Maximize the attached window.
    fn maximize(&mut self) -> Result<()>;

    /// Screenshot of the given region of the attached window.
    fn capture_region(&mut self, region: &WindowRect) -> Result<RgbImage>;

    /// Synthetic left click at an absolute screen coordinate.
    fn click(&mut self, x: i32, y: i32) -> Result<()>;
}

/// Production driver: `xcap` for window lookup and capture, `enigo` for
/// synthetic input.
pub struct DesktopAutomation {
    enigo: Enigo,
    window_id: Option<u32>,
}

impl DesktopAutomation {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| WindowError::InputFailed(e.to_string()))?;
        Ok(Self {
            enigo,
            window_id: None,
        })
    }

    /// Re-resolve the attached window by id so geometry reflects the
    /// window's current state rather than the state at attach time.
    fn attached_window(&self) -> Result<xcap::Window> {
        let id = self.window_id.ok_or(WindowError::NotAttached)?;
        let windows =
            xcap::Window::all().map_err(|e| WindowError::CaptureFailed(e.to_string()))?;
        windows
            .into_iter()
            .find(|w| w.id().ok() == Some(id))
            .ok_or(WindowError::NotAttached)
    }
}

impl WindowAutomation for DesktopAutomation {
    fn find_window(&mut self, title: &str) -> Result<()> {
        let windows =
            xcap::Window::all().map_err(|e| WindowError::CaptureFailed(e.to_string()))?;

        // Substring match over visible windows, first hit wins.
        let window = windows
            .into_iter()
            .find(|w| {
                w.is_minimized().map(|m| !m).unwrap_or(false)
                    && w.title().map(|t| t.contains(title)).unwrap_or(false)
            })
            .ok_or_else(|| WindowError::NotFound(title.to_string()))?;

        let id = window
            .id()
            .map_err(|e| WindowError::CaptureFailed(e.to_string()))?;
        self.window_id = Some(id);
        Ok(())
    }

    fn window_rect(&mut self) -> Result<WindowRect> {
        let window = self.attached_window()?;
        let map = |e: xcap::XCapError| WindowError::CaptureFailed(e.to_string());
        Ok(WindowRect {
            left: window.x().map_err(map)?,
            top: window.y().map_err(map)?,
            width: window.width().map_err(map)?,
            height: window.height().map_err(map)?,
        })
    }

    fn activate(&mut self) -> Result<()> {
        // Focus follows a click on the title-bar strip; clicking there
        // cannot hit reader content and turn a page.
        let rect = self.window_rect()?;
        let x = rect.left + (rect.width / 2) as i32;
        let y = rect.top + 10;
        self.click(x, y)
    }

    fn maximize(&mut self) -> Result<()> {
        // Meta+Up is the maximize shortcut on Windows and most Linux
        // desktops; the attached window must already be focused.
        self.enigo
            .key(Key::Meta, Direction::Press)
            .map_err(|e| WindowError::InputFailed(e.to_string()))?;
        self.enigo
            .key(Key::UpArrow, Direction::Click)
            .map_err(|e| WindowError::InputFailed(e.to_string()))?;
        self.enigo
            .key(Key::Meta, Direction::Release)
            .map_err(|e| WindowError::InputFailed(e.to_string()))?;
        Ok(())
    }

    fn capture_region(&mut self, region: &WindowRect) -> Result<RgbImage> {
        let window = self.attached_window()?;
        let capture = window
            .capture_image()
            .map_err(|e| WindowError::CaptureFailed(e.to_string()))?;

        let image = DynamicImage::ImageRgba8(capture);
        Ok(image.crop_imm(0, 0, region.width, region.height).to_rgb8())
    }

    fn click(&mut self, x: i32, y: i32) -> Result<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| WindowError::InputFailed(e.to_string()))?;
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| WindowError::InputFailed(e.to_string()))?;
        Ok(())
    }
}
