//! Normalization of clipboard fragments.
//!
//! Each `clipboard/drawings/drawingN.xml` holds one `a:graphic` whose
//! `lc:lockedCanvas` plays the role of a slide's shape tree.

use super::{assign_z_order, GroupMapping, NormalizedDocument, NormalizedSlide, Provenance, TreeWalker};
use crate::archive::Package;
use crate::detect::CLIPBOARD_DRAWINGS_PREFIX;
use crate::options::ParseOptions;
use crate::theme::ThemeContext;
use crate::xml::XmlNode;
use ppt_core::units::emu_to_pixels;
use ppt_core::{Error, PresentationFormat, Result, SlideDimensions};

const CLIPBOARD_THEME_PREFIX: &str = "clipboard/theme/";

/// Canvas size when the locked canvas declares no extent.
pub const DEFAULT_CANVAS_SIZE: SlideDimensions = SlideDimensions { width: 960, height: 540 };

pub(super) fn normalize_clipboard(package: &Package, _options: &ParseOptions) -> Result<NormalizedDocument> {
    let drawings = package.parts_under(CLIPBOARD_DRAWINGS_PREFIX);
    log::debug!("Found {} clipboard drawings", drawings.len());

    let theme = package
        .parts_under(CLIPBOARD_THEME_PREFIX)
        .first()
        .and_then(|p| package.part(p))
        .map(ThemeContext::from_theme)
        .unwrap_or_default();

    let mut slides = Vec::with_capacity(drawings.len());
    for path in drawings {
        let root = package
            .part(path)
            .ok_or_else(|| Error::ContainerRead(format!("drawing part '{}' is missing", path)))?;
        let canvas = locked_canvas(root)
            .ok_or_else(|| Error::ContainerRead(format!("drawing part '{}' has no locked canvas", path)))?;

        let mut walker = TreeWalker::new(path, Provenance::default());
        walker.walk(canvas, GroupMapping::identity());
        let mut elements = walker.into_elements();
        assign_z_order(&mut elements);

        slides.push(NormalizedSlide {
            source_part: path.to_string(),
            slide_number: None,
            format: PresentationFormat::Clipboard,
            elements,
            dimensions: canvas_dimensions(canvas),
            layout_part: None,
            master_part: None,
            theme: theme.clone(),
        });
    }

    let dimensions = slides.first().map(|s| s.dimensions).unwrap_or(DEFAULT_CANVAS_SIZE);
    Ok(NormalizedDocument {
        format: PresentationFormat::Clipboard,
        slides,
        dimensions,
    })
}

/// `a:graphic/a:graphicData/lc:lockedCanvas`, whether the drawing root is
/// the graphic itself or wraps it.
fn locked_canvas(root: &XmlNode) -> Option<&XmlNode> {
    if root.is("graphic") {
        return root.find(&["graphicData", "lockedCanvas"]);
    }
    if root.is("lockedCanvas") {
        return Some(root);
    }
    root.descendant("graphic")
        .and_then(|g| g.find(&["graphicData", "lockedCanvas"]))
}

fn canvas_dimensions(canvas: &XmlNode) -> SlideDimensions {
    canvas
        .find(&["grpSpPr", "xfrm", "ext"])
        .and_then(|ext| Some((ext.attr_i64_lenient("cx")?, ext.attr_i64_lenient("cy")?)))
        .filter(|(cx, cy)| *cx > 0 && *cy > 0)
        .map(|(cx, cy)| SlideDimensions {
            width: emu_to_pixels(cx),
            height: emu_to_pixels(cy),
        })
        .unwrap_or(DEFAULT_CANVAS_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{clipboard_drawing, ZipBuilder};
    use crate::normalize::ElementKind;

    fn package(files: &[(&str, String)]) -> Package {
        let mut builder = ZipBuilder::new();
        for (path, content) in files {
            builder = builder.file(path, content);
        }
        Package::from_bytes(&builder.build()).unwrap().unwrap()
    }

    #[test]
    fn test_text_wrapper_is_flattened() {
        let pkg = package(&[(
            "clipboard/drawings/drawing1.xml",
            clipboard_drawing(
                r#"<a:sp><a:nvSpPr><a:cNvPr id="2" name="Title"/><a:cNvSpPr txBox="1"/></a:nvSpPr><a:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="914400" cy="457200"/></a:xfrm></a:spPr><a:txSp><a:txBody><a:bodyPr/><a:p><a:r><a:t>Hi</a:t></a:r></a:p></a:txBody><a:useSpRect/></a:txSp></a:sp>"#,
            ),
        )]);
        let doc = normalize_clipboard(&pkg, &ParseOptions::default()).unwrap();
        assert_eq!(doc.format, PresentationFormat::Clipboard);
        let element = &doc.slides[0].elements[0];
        assert_eq!(element.kind, ElementKind::Text);
        assert_eq!(element.namespace, "a");
        assert!(element.text_body().is_some());
        assert!(element.node.child("txSp").is_none());
    }

    #[test]
    fn test_each_drawing_is_a_slide() {
        let pkg = package(&[
            ("clipboard/drawings/drawing2.xml", clipboard_drawing("")),
            ("clipboard/drawings/drawing1.xml", clipboard_drawing("")),
        ]);
        let doc = normalize_clipboard(&pkg, &ParseOptions::default()).unwrap();
        assert_eq!(doc.slides.len(), 2);
        assert_eq!(doc.slides[0].source_part, "clipboard/drawings/drawing1.xml");
        assert_eq!(doc.slides[1].slide_number, None);
    }

    #[test]
    fn test_canvas_extent_sets_dimensions() {
        let xml = r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/lockedCanvas"><lc:lockedCanvas><a:nvGrpSpPr/><a:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="1905000" cy="952500"/></a:xfrm></a:grpSpPr></lc:lockedCanvas></a:graphicData></a:graphic>"#;
        let pkg = package(&[("clipboard/drawings/drawing1.xml", xml.to_string())]);
        let doc = normalize_clipboard(&pkg, &ParseOptions::default()).unwrap();
        assert_eq!(doc.dimensions, SlideDimensions { width: 200, height: 100 });

        let pkg = package(&[("clipboard/drawings/drawing1.xml", clipboard_drawing(""))]);
        let doc = normalize_clipboard(&pkg, &ParseOptions::default()).unwrap();
        assert_eq!(doc.dimensions, DEFAULT_CANVAS_SIZE);
    }

    #[test]
    fn test_drawing_without_canvas_is_fatal() {
        let pkg = package(&[("clipboard/drawings/drawing1.xml", "<a:graphic><a:graphicData/></a:graphic>".to_string())]);
        let err = normalize_clipboard(&pkg, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::ContainerRead(_)));
    }
}
