//! Container schema detection from the set of part paths.

use ppt_core::{Error, PresentationFormat, Result};

pub const PPTX_SLIDES_PREFIX: &str = "ppt/slides/";
pub const CLIPBOARD_DRAWINGS_PREFIX: &str = "clipboard/drawings/";

/// Classify a container by its part paths. Order-independent: any slide
/// part wins over any clipboard drawing.
pub fn detect_format<'a, I>(paths: I) -> Result<PresentationFormat>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut has_clipboard = false;
    let mut seen = 0usize;
    for path in paths {
        seen += 1;
        if path.starts_with(PPTX_SLIDES_PREFIX) {
            return Ok(PresentationFormat::Pptx);
        }
        if path.starts_with(CLIPBOARD_DRAWINGS_PREFIX) {
            has_clipboard = true;
        }
    }

    if has_clipboard {
        Ok(PresentationFormat::Clipboard)
    } else {
        Err(Error::UnsupportedFormat(format!(
            "no '{}' or '{}' parts among {} entries",
            PPTX_SLIDES_PREFIX, CLIPBOARD_DRAWINGS_PREFIX, seen
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_pptx() {
        let paths = ["[Content_Types].xml", "ppt/presentation.xml", "ppt/slides/slide1.xml"];
        assert_eq!(detect_format(paths).unwrap(), PresentationFormat::Pptx);
    }

    #[test]
    fn test_detects_clipboard() {
        let paths = ["[Content_Types].xml", "clipboard/theme/theme1.xml", "clipboard/drawings/drawing1.xml"];
        assert_eq!(detect_format(paths).unwrap(), PresentationFormat::Clipboard);
    }

    #[test]
    fn test_pptx_wins_regardless_of_order() {
        let forward = ["clipboard/drawings/drawing1.xml", "ppt/slides/slide1.xml"];
        let backward = ["ppt/slides/slide1.xml", "clipboard/drawings/drawing1.xml"];
        assert_eq!(detect_format(forward).unwrap(), PresentationFormat::Pptx);
        assert_eq!(detect_format(backward).unwrap(), PresentationFormat::Pptx);
    }

    #[test]
    fn test_unsupported() {
        let paths = ["word/document.xml", "[Content_Types].xml"];
        assert!(matches!(detect_format(paths), Err(Error::UnsupportedFormat(_))));
        assert!(matches!(detect_format(std::iter::empty()), Err(Error::UnsupportedFormat(_))));
    }
}
