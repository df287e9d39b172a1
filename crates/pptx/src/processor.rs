//! One parse, end to end: container, format, normalization, components.

use crate::archive::Package;
use crate::detect::detect_format;
use crate::normalize::{normalize, NormalizedSlide};
use crate::options::ParseOptions;
use crate::parsers::{parse_element, ParseContext, ShapePositionMap};
use ppt_core::{ProcessedPresentation, ProcessedSlide, Result};

/// Turns `.pptx` files and clipboard fragments into component lists.
///
/// A processor holds only its options; every call builds its own theme and
/// position tables, so one instance may serve concurrent parses.
#[derive(Debug, Clone, Default)]
pub struct PowerPointProcessor {
    options: ParseOptions,
}

impl PowerPointProcessor {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse one buffer.
    ///
    /// Buffers that are not ZIP containers yield an empty `unknown` result.
    /// Malformed elements are logged and dropped; structural failures abort.
    pub fn process(&self, bytes: &[u8]) -> Result<ProcessedPresentation> {
        let Some(package) = Package::from_bytes(bytes)? else {
            return Ok(ProcessedPresentation::unknown());
        };
        let format = detect_format(package.paths())?;
        log::debug!("Detected {} container", format.as_str());

        let document = normalize(&package, format, &self.options)?;
        let mut presentation = ProcessedPresentation::new(format, document.dimensions);

        for (slide_index, slide) in document.slides.iter().enumerate() {
            let processed = self.process_slide(&package, slide_index, slide)?;
            presentation.add_slide(processed);
        }

        log::debug!(
            "Extracted {} components from {} slides",
            presentation.total_components,
            presentation.slides.len()
        );
        Ok(presentation)
    }

    fn process_slide(&self, package: &Package, slide_index: usize, slide: &NormalizedSlide) -> Result<ProcessedSlide> {
        let positions = ShapePositionMap::from_elements(&slide.elements);
        let ctx = ParseContext {
            package,
            theme: &slide.theme,
            options: &self.options,
            slide_index,
            positions: &positions,
        };

        let mut processed = ProcessedSlide::new(slide_index, slide.slide_number);
        for element in &slide.elements {
            match parse_element(element, &ctx) {
                Ok(Some(component)) => processed.add_component(component),
                Ok(None) => {}
                Err(e) if e.is_recoverable() => {
                    log::warn!(
                        "Skipping {:?} element {:?} on slide {}: {}",
                        element.kind,
                        element.name(),
                        slide_index,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(processed)
    }
}
