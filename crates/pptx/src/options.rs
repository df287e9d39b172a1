//! Parse configuration.

use ppt_core::types::{DEFAULT_SLIDE_HEIGHT_PX, DEFAULT_SLIDE_WIDTH_PX};
use ppt_core::units::DEFAULT_EMU_LEAK_THRESHOLD;
use ppt_core::{InlineMediaStore, MediaStore, SlideDimensions};
use std::fmt;
use std::sync::Arc;

/// Options for one [`PowerPointProcessor`](crate::PowerPointProcessor).
#[derive(Clone)]
pub struct ParseOptions {
    /// Emit non-placeholder shapes from the slide layout and master.
    pub include_layout_elements: bool,
    /// Emit the slide background as a component.
    pub include_background: bool,
    /// Where extracted media goes.
    pub media_store: Arc<dyn MediaStore>,
    /// Converted pixel values above this are logged as EMU leaks.
    pub emu_leak_threshold: i64,
    /// Slide size used when `presentation.xml` does not declare one.
    pub default_slide_size: SlideDimensions,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout_elements(mut self, include: bool) -> Self {
        self.include_layout_elements = include;
        self
    }

    pub fn with_background(mut self, include: bool) -> Self {
        self.include_background = include;
        self
    }

    pub fn with_media_store(mut self, store: Arc<dyn MediaStore>) -> Self {
        self.media_store = store;
        self
    }

    pub fn with_emu_leak_threshold(mut self, threshold: i64) -> Self {
        self.emu_leak_threshold = threshold;
        self
    }

    pub fn with_default_slide_size(mut self, size: SlideDimensions) -> Self {
        self.default_slide_size = size;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            include_layout_elements: false,
            include_background: false,
            media_store: Arc::new(InlineMediaStore),
            emu_leak_threshold: DEFAULT_EMU_LEAK_THRESHOLD,
            default_slide_size: SlideDimensions {
                width: DEFAULT_SLIDE_WIDTH_PX,
                height: DEFAULT_SLIDE_HEIGHT_PX,
            },
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("include_layout_elements", &self.include_layout_elements)
            .field("include_background", &self.include_background)
            .field("emu_leak_threshold", &self.emu_leak_threshold)
            .field("default_slide_size", &self.default_slide_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert!(!options.include_layout_elements);
        assert!(!options.include_background);
        assert_eq!(options.emu_leak_threshold, 50_000);
        assert_eq!(options.default_slide_size, SlideDimensions { width: 960, height: 720 });
    }

    #[test]
    fn test_builder() {
        let options = ParseOptions::new()
            .with_layout_elements(true)
            .with_background(true)
            .with_emu_leak_threshold(10_000)
            .with_default_slide_size(SlideDimensions { width: 1280, height: 720 });
        assert!(options.include_layout_elements && options.include_background);
        assert_eq!(options.emu_leak_threshold, 10_000);
        assert_eq!(options.default_slide_size.width, 1280);
        assert!(format!("{:?}", options).starts_with("ParseOptions"));
    }
}
