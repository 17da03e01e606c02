//! Best-effort sink for failed recognition samples.

use image::RgbImage;
use std::path::PathBuf;

/// Writes failed bubble crops to a debug directory for offline
/// inspection.
///
/// Writes are fire-and-forget: any failure is logged and swallowed so it
/// can never escalate into the OCR call's result.
#[derive(Debug, Clone)]
pub struct DebugSampleSink {
    dir: PathBuf,
}

impl DebugSampleSink {
    /// Creates a sink rooted at the given directory. The directory is
    /// created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Saves a sample as PNG, named by the caller-supplied identifier.
    ///
    /// Returns whether the write succeeded; callers ignore the value
    /// outside of tests.
    pub fn save(&self, sample_id: &str, image: &RgbImage) -> bool {
        // Identifiers come from callers; keep them from escaping the
        // debug directory.
        let file_name: String = sample_id
            .chars()
            .map(|c| if c == '/' || c == '\\' || c == '.' { '_' } else { c })
            .collect();
        let path = self.dir.join(format!("{file_name}.png"));

        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "failed to create debug directory");
            return false;
        }
        match image.save_with_format(&path, image::ImageFormat::Png) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "saved failed sample for inspection");
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to save debug sample");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_png_named_by_sample_id() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DebugSampleSink::new(dir.path());
        let image = RgbImage::from_pixel(4, 4, image::Rgb([1, 2, 3]));

        assert!(sink.save("page-001-bubble-03", &image));
        assert!(dir.path().join("page-001-bubble-03.png").exists());
    }

    #[test]
    fn sample_id_path_separators_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DebugSampleSink::new(dir.path());
        let image = RgbImage::from_pixel(2, 2, image::Rgb([0, 0, 0]));

        assert!(sink.save("../evil/id", &image));
        assert!(dir.path().join("___evil_id.png").exists());
    }

    #[test]
    fn unwritable_directory_reports_failure_without_panicking() {
        let sink = DebugSampleSink::new("/proc/no-such-debug-dir");
        let image = RgbImage::from_pixel(2, 2, image::Rgb([0, 0, 0]));
        assert!(!sink.save("sample", &image));
    }
}
