//! Common utilities for kindle2pdf
//!
//! Provides shared functionality across modules to reduce code duplication.

use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Build the path of a captured page image inside the output folder.
///
/// Page indices are 1-based and zero-padded to four digits
/// (`page_0001.png`), which keeps the set lexically ordered.
pub fn page_image_path(output_dir: &Path, page_index: usize) -> PathBuf {
    output_dir.join(format!("page_{:04}.png", page_index))
}

/// Load an image from path with consistent error handling
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage, String> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(format!("Image not found: {}", path.display()));
    }
    image::open(path).map_err(|e| format!("Failed to load image: {}", e))
}

/// Check if a directory exists and is writable
pub fn ensure_dir_writable<P: AsRef<Path>>(path: P) -> Result<(), String> {
    let path = path.as_ref();
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| format!("Failed to create directory: {}", e))?;
    }

    // Test writability
    let test_file = path.join(".write_test");
    std::fs::write(&test_file, b"test")
        .map_err(|_| format!("Directory not writable: {}", path.display()))?;
    let _ = std::fs::remove_file(test_file);

    Ok(())
}

/// Convert pixels to millimeters at given DPI
#[inline]
pub fn pixels_to_mm(pixels: u32, dpi: u32) -> f32 {
    (pixels as f32 / dpi as f32) * 25.4
}

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format duration in human-readable format
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}h {}m", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}m {}s", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_image_path_padding() {
        let dir = Path::new("output");
        assert_eq!(
            page_image_path(dir, 1),
            PathBuf::from("output/page_0001.png")
        );
        assert_eq!(
            page_image_path(dir, 42),
            PathBuf::from("output/page_0042.png")
        );
        assert_eq!(
            page_image_path(dir, 500),
            PathBuf::from("output/page_0500.png")
        );
    }

    #[test]
    fn test_pixels_to_mm() {
        // At 72 DPI, 72 pixels = 1 inch = 25.4 mm
        let mm = pixels_to_mm(72, 72);
        assert!((mm - 25.4).abs() < 0.01);

        // At 300 DPI, 300 pixels = 1 inch = 25.4 mm
        let mm = pixels_to_mm(300, 300);
        assert!((mm - 25.4).abs() < 0.01);
    }

    #[test]
    fn test_load_image_nonexistent() {
        let result = load_image("/nonexistent/image.png");
        assert!(result.is_err());
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(500), "500 B");
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(1048576), "1.00 MB");
        assert_eq!(format_file_size(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_duration() {
        use std::time::Duration;

        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.000s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1h 1m");
    }
}
