//! Structural normalization.
//!
//! pptx slides (`p:sld/p:cSld/p:spTree`) and clipboard drawings
//! (`a:graphic/a:graphicData/lc:lockedCanvas`) are walked into one ordered,
//! format-agnostic [`NormalizedElement`] list per slide. All format-variant
//! handling lives here: group flattening, `mc:AlternateContent`, the
//! clipboard text-body wrapper, canonical transform lookup and placeholder
//! inheritance. Component parsers only ever see normalized elements.

mod clipboard;
mod placeholder;
mod pptx;
mod transform;

pub use placeholder::PlaceholderRef;
pub use transform::{GroupMapping, Transform};

use crate::archive::Package;
use crate::options::ParseOptions;
use crate::theme::ThemeContext;
use crate::xml::XmlNode;
use ppt_core::{PresentationFormat, Result, SlideDimensions};

/// What a normalized element will become.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Text,
    Shape,
    Image,
    Table,
    Video,
    Connection,
}

/// Where an element came from, beyond the slide's own shape tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Provenance {
    pub is_background: bool,
    pub is_layout: bool,
    pub is_master: bool,
}

/// One drawing element in format-agnostic form.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedElement {
    pub kind: ElementKind,
    /// Namespace prefix of the source element (`p` for slides, `a` for clipboard).
    pub namespace: String,
    /// The element subtree, with the clipboard text wrapper removed.
    pub node: XmlNode,
    /// Position in the slide's final element list.
    pub z_index: usize,
    /// Slide-space transform in EMUs, after group mapping and placeholder
    /// inheritance.
    pub transform: Option<Transform>,
    pub placeholder: Option<PlaceholderRef>,
    /// List styles from nearest to farthest: the element's own `lstStyle`,
    /// then layout, master placeholder and master text styles.
    pub list_styles: Vec<XmlNode>,
    /// Part whose relationship table resolves this element's `r:` ids.
    pub source_part: String,
    pub provenance: Provenance,
}

impl NormalizedElement {
    /// The `nv*Pr` non-visual properties block.
    pub fn non_visual(&self) -> Option<&XmlNode> {
        self.node.children.iter().find(|c| {
            matches!(
                c.local_name(),
                "nvSpPr" | "nvPicPr" | "nvCxnSpPr" | "nvGraphicFramePr" | "nvGrpSpPr"
            )
        })
    }

    /// The `cNvPr` element holding id, name and description.
    pub fn c_nv_pr(&self) -> Option<&XmlNode> {
        self.non_visual().and_then(|nv| nv.child("cNvPr"))
    }

    pub fn shape_id(&self) -> Option<u32> {
        self.c_nv_pr().and_then(|c| c.attr_u32_lenient("id"))
    }

    pub fn name(&self) -> Option<&str> {
        self.c_nv_pr().and_then(|c| c.attr("name")).filter(|n| !n.is_empty())
    }

    /// The `nvPr` application properties block.
    pub fn nv_pr(&self) -> Option<&XmlNode> {
        self.non_visual().and_then(|nv| nv.child("nvPr"))
    }

    pub fn shape_properties(&self) -> Option<&XmlNode> {
        self.node.child("spPr")
    }

    /// The text body at its canonical location.
    pub fn text_body(&self) -> Option<&XmlNode> {
        self.node.child("txBody")
    }

    pub fn is_foreground(&self) -> bool {
        !(self.provenance.is_background || self.provenance.is_layout || self.provenance.is_master)
    }
}

/// One slide (or clipboard drawing) worth of normalized elements.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSlide {
    pub source_part: String,
    /// 1-based, pptx only.
    pub slide_number: Option<usize>,
    pub format: PresentationFormat,
    pub elements: Vec<NormalizedElement>,
    pub dimensions: SlideDimensions,
    pub layout_part: Option<String>,
    pub master_part: Option<String>,
    /// Theme and colour map in effect for this slide.
    pub theme: ThemeContext,
}

/// The normalized form of a whole container.
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    pub format: PresentationFormat,
    pub slides: Vec<NormalizedSlide>,
    pub dimensions: SlideDimensions,
}

/// Normalize a package of a detected format.
pub fn normalize(package: &Package, format: PresentationFormat, options: &ParseOptions) -> Result<NormalizedDocument> {
    match format {
        PresentationFormat::Pptx => pptx::normalize_pptx(package, options),
        PresentationFormat::Clipboard => clipboard::normalize_clipboard(package, options),
        PresentationFormat::Unknown => Ok(NormalizedDocument {
            format,
            slides: Vec::new(),
            dimensions: options.default_slide_size,
        }),
    }
}

/// Assign each element its final list position as z-index.
pub(crate) fn assign_z_order(elements: &mut [NormalizedElement]) {
    for (index, element) in elements.iter_mut().enumerate() {
        element.z_index = index;
    }
}

/// Walks a shape tree into normalized elements in document order.
pub(crate) struct TreeWalker<'a> {
    source_part: &'a str,
    provenance: Provenance,
    elements: Vec<NormalizedElement>,
}

impl<'a> TreeWalker<'a> {
    pub(crate) fn new(source_part: &'a str, provenance: Provenance) -> Self {
        Self {
            source_part,
            provenance,
            elements: Vec::new(),
        }
    }

    pub(crate) fn into_elements(self) -> Vec<NormalizedElement> {
        self.elements
    }

    /// Walk the children of a shape tree, locked canvas or group.
    pub(crate) fn walk(&mut self, container: &XmlNode, mapping: GroupMapping) {
        for child in &container.children {
            match child.local_name() {
                "sp" | "pic" | "cxnSp" | "graphicFrame" => match normalize_element(child, mapping) {
                    Ok(Some(mut element)) => {
                        element.source_part = self.source_part.to_string();
                        element.provenance = self.provenance;
                        self.elements.push(element);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        log::warn!(
                            "Skipping malformed <{}> in '{}': {}",
                            child.name,
                            self.source_part,
                            e
                        );
                    }
                },
                "grpSp" => match group_mapping(child) {
                    Ok(local) => self.walk(child, mapping.then(local)),
                    Err(e) => {
                        log::warn!("Skipping malformed group in '{}': {}", self.source_part, e);
                    }
                },
                "AlternateContent" => {
                    let branch = child
                        .children_named("Choice")
                        .chain(child.children_named("Fallback"))
                        .find(|branch| branch.children.iter().any(is_drawing_element));
                    if let Some(branch) = branch {
                        self.walk(branch, mapping);
                    }
                }
                _ => {}
            }
        }
    }
}

fn is_drawing_element(node: &XmlNode) -> bool {
    matches!(node.local_name(), "sp" | "pic" | "cxnSp" | "graphicFrame" | "grpSp")
}

fn group_mapping(group: &XmlNode) -> Result<GroupMapping> {
    match group.find(&["grpSpPr", "xfrm"]) {
        Some(xfrm) => GroupMapping::from_group_xfrm(xfrm),
        None => Ok(GroupMapping::identity()),
    }
}

/// Normalize one drawing element. `Ok(None)` for element types that have no
/// component (charts, diagrams, OLE frames).
pub(crate) fn normalize_element(source: &XmlNode, mapping: GroupMapping) -> Result<Option<NormalizedElement>> {
    let mut node = source.clone();
    flatten_text_wrapper(&mut node);

    let Some(kind) = classify(&node) else {
        log::debug!("No component type for <{}>", node.name);
        return Ok(None);
    };

    let transform = read_transform(&node)
        .map_err(|e| e.into_element_error(&node.name))?
        .map(|t| mapping.apply(t));
    let placeholder = PlaceholderRef::from_element(&node);
    let list_styles = node
        .find(&["txBody", "lstStyle"])
        .filter(|s| !s.children.is_empty())
        .cloned()
        .into_iter()
        .collect();

    Ok(Some(NormalizedElement {
        kind,
        namespace: node.prefix().unwrap_or_default().to_string(),
        node,
        z_index: 0,
        transform,
        placeholder,
        list_styles,
        source_part: String::new(),
        provenance: Provenance::default(),
    }))
}

/// Clipboard shapes hold their text body inside `a:txSp`; move it up so
/// it sits where pptx shapes keep it. Returns whether the node changed.
pub(crate) fn flatten_text_wrapper(node: &mut XmlNode) -> bool {
    if node.has_child("txBody") {
        return false;
    }
    let Some(position) = node.children.iter().position(|c| c.is("txSp")) else {
        return false;
    };
    let wrapper = node.children.remove(position);
    match wrapper.children.into_iter().find(|c| c.is("txBody")) {
        Some(body) => {
            node.children.insert(position, body);
            true
        }
        None => false,
    }
}

/// Read the transform from its canonical location for the element type.
fn read_transform(node: &XmlNode) -> Result<Option<Transform>> {
    let xfrm = match node.local_name() {
        "graphicFrame" => node.child("xfrm"),
        "grpSp" => node.find(&["grpSpPr", "xfrm"]),
        _ => node.find(&["spPr", "xfrm"]),
    };
    match xfrm {
        Some(xfrm) => Transform::from_xfrm(xfrm),
        None => Ok(None),
    }
}

fn classify(node: &XmlNode) -> Option<ElementKind> {
    match node.local_name() {
        "sp" => Some(classify_sp(node)),
        "pic" => Some(if is_video_picture(node) { ElementKind::Video } else { ElementKind::Image }),
        "cxnSp" => Some(ElementKind::Connection),
        "graphicFrame" => node
            .find(&["graphic", "graphicData", "tbl"])
            .map(|_| ElementKind::Table),
        _ => None,
    }
}

fn classify_sp(node: &XmlNode) -> ElementKind {
    let is_text_box = node
        .find(&["nvSpPr", "cNvSpPr"])
        .and_then(|c| c.attr_bool("txBox"))
        .unwrap_or(false);
    if is_text_box || PlaceholderRef::from_element(node).is_some() {
        return ElementKind::Text;
    }

    let has_text = node
        .child("txBody")
        .map(|body| {
            body.children_named("p")
                .any(|p| p.children.iter().any(|r| !r.text_content().trim().is_empty()))
        })
        .unwrap_or(false);
    if !has_text {
        return ElementKind::Shape;
    }

    let sp_pr = node.child("spPr");
    let geometry = sp_pr
        .and_then(|s| s.child("prstGeom"))
        .and_then(|g| g.attr("prst"))
        .unwrap_or("rect");
    let custom = sp_pr.is_some_and(|s| s.has_child("custGeom"));
    if geometry != "rect" || custom || has_visible_fill(node) || has_visible_line(node) {
        ElementKind::Shape
    } else {
        ElementKind::Text
    }
}

fn has_visible_fill(node: &XmlNode) -> bool {
    let sp_pr = node.child("spPr");
    if let Some(sp_pr) = sp_pr {
        if sp_pr.has_child("noFill") {
            return false;
        }
        if ["solidFill", "gradFill", "blipFill", "pattFill"].iter().any(|f| sp_pr.has_child(f)) {
            return true;
        }
    }
    style_ref_is_visible(node, "fillRef")
}

fn has_visible_line(node: &XmlNode) -> bool {
    if let Some(ln) = node.find(&["spPr", "ln"]) {
        if ln.has_child("noFill") {
            return false;
        }
        if ln.has_child("solidFill") || ln.has_child("gradFill") {
            return true;
        }
    }
    style_ref_is_visible(node, "lnRef")
}

fn style_ref_is_visible(node: &XmlNode, reference: &str) -> bool {
    node.find(&["style", reference])
        .and_then(|r| r.attr_i64_lenient("idx"))
        .is_some_and(|idx| idx > 0)
}

fn is_video_picture(node: &XmlNode) -> bool {
    let Some(nv_pr) = node.find(&["nvPicPr", "nvPr"]) else {
        return false;
    };
    if nv_pr.has_child("videoFile") || nv_pr.has_child("quickTimeFile") {
        return true;
    }
    nv_pr
        .child("extLst")
        .is_some_and(|ext| ext.children_named("ext").any(|e| e.has_child("media")))
        && !nv_pr.has_child("audioFile")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_xml;

    fn element(xml: &str) -> Option<NormalizedElement> {
        normalize_element(&parse_xml(xml.as_bytes()).unwrap(), GroupMapping::identity()).unwrap()
    }

    #[test]
    fn test_flatten_text_wrapper() {
        let mut node = parse_xml(
            br#"<a:sp><a:nvSpPr/><a:spPr/><a:txSp><a:txBody><a:p><a:r><a:t>Hi</a:t></a:r></a:p></a:txBody><a:useSpRect/></a:txSp></a:sp>"#,
        )
        .unwrap();
        assert!(flatten_text_wrapper(&mut node));
        assert!(node.child("txSp").is_none());
        assert_eq!(node.children[2].local_name(), "txBody");
        assert!(!flatten_text_wrapper(&mut node));
    }

    #[test]
    fn test_classify_text_box_and_shape() {
        let text = element(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="T"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:p><a:r><a:t>Hello</a:t></a:r></a:p></p:txBody></p:sp>"#,
        )
        .unwrap();
        assert_eq!(text.kind, ElementKind::Text);
        assert_eq!(text.shape_id(), Some(2));
        assert_eq!(text.name(), Some("T"));
        assert_eq!(text.namespace, "p");

        let shape = element(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="R"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:prstGeom prst="ellipse"/><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill></p:spPr><p:txBody><a:p><a:r><a:t>In shape</a:t></a:r></a:p></p:txBody></p:sp>"#,
        )
        .unwrap();
        assert_eq!(shape.kind, ElementKind::Shape);
    }

    #[test]
    fn test_classify_plain_rect_with_text_as_text() {
        let el = element(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="4" name="X"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:prstGeom prst="rect"/><a:noFill/></p:spPr><p:txBody><a:p><a:r><a:t>Loose text</a:t></a:r></a:p></p:txBody></p:sp>"#,
        )
        .unwrap();
        assert_eq!(el.kind, ElementKind::Text);
    }

    #[test]
    fn test_classify_pictures_frames_connectors() {
        let image = element(r#"<p:pic><p:nvPicPr><p:cNvPr id="5" name="P"/><p:nvPr/></p:nvPicPr></p:pic>"#).unwrap();
        assert_eq!(image.kind, ElementKind::Image);

        let video = element(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="6" name="V"/><p:nvPr><a:videoFile r:link="rId3"/></p:nvPr></p:nvPicPr></p:pic>"#,
        )
        .unwrap();
        assert_eq!(video.kind, ElementKind::Video);

        let table = element(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="7" name="Tbl"/></p:nvGraphicFramePr><p:xfrm><a:off x="0" y="0"/><a:ext cx="914400" cy="914400"/></p:xfrm><a:graphic><a:graphicData uri="table"><a:tbl/></a:graphicData></a:graphic></p:graphicFrame>"#,
        )
        .unwrap();
        assert_eq!(table.kind, ElementKind::Table);
        assert_eq!(table.transform.unwrap().width, 914_400);

        let chart = element(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="8" name="C"/></p:nvGraphicFramePr><a:graphic><a:graphicData uri="chart"><c:chart r:id="rId9"/></a:graphicData></a:graphic></p:graphicFrame>"#,
        );
        assert!(chart.is_none());

        let connector = element(r#"<p:cxnSp><p:nvCxnSpPr><p:cNvPr id="9" name="L"/></p:nvCxnSpPr></p:cxnSp>"#).unwrap();
        assert_eq!(connector.kind, ElementKind::Connection);
    }

    #[test]
    fn test_malformed_transform_is_element_error() {
        let node = parse_xml(
            br#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Bad"/></p:nvSpPr><p:spPr><a:xfrm><a:off x="oops" y="0"/><a:ext cx="1" cy="1"/></a:xfrm></p:spPr></p:sp>"#,
        )
        .unwrap();
        let err = normalize_element(&node, GroupMapping::identity()).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_walker_keeps_document_order_and_flattens_groups() {
        let tree = parse_xml(
            br#"<p:spTree>
  <p:nvGrpSpPr/><p:grpSpPr/>
  <p:sp><p:nvSpPr><p:cNvPr id="2" name="A"/></p:nvSpPr><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="100" cy="100"/></a:xfrm></p:spPr></p:sp>
  <p:grpSp>
    <p:nvGrpSpPr><p:cNvPr id="10" name="G"/></p:nvGrpSpPr>
    <p:grpSpPr><a:xfrm><a:off x="1000" y="2000"/><a:ext cx="200" cy="200"/><a:chOff x="0" y="0"/><a:chExt cx="100" cy="100"/></a:xfrm></p:grpSpPr>
    <p:sp><p:nvSpPr><p:cNvPr id="3" name="B"/></p:nvSpPr><p:spPr><a:xfrm><a:off x="10" y="20"/><a:ext cx="50" cy="50"/></a:xfrm></p:spPr></p:sp>
  </p:grpSp>
  <p:sp><p:nvSpPr><p:cNvPr id="4" name="Broken"/></p:nvSpPr><p:spPr><a:xfrm><a:off x="?" y="0"/><a:ext cx="1" cy="1"/></a:xfrm></p:spPr></p:sp>
  <p:sp><p:nvSpPr><p:cNvPr id="5" name="C"/></p:nvSpPr></p:sp>
</p:spTree>"#,
        )
        .unwrap();
        let mut walker = TreeWalker::new("ppt/slides/slide1.xml", Provenance::default());
        walker.walk(&tree, GroupMapping::identity());
        let mut elements = walker.into_elements();
        assign_z_order(&mut elements);

        let ids: Vec<Option<u32>> = elements.iter().map(NormalizedElement::shape_id).collect();
        assert_eq!(ids, vec![Some(2), Some(3), Some(5)]);
        let z: Vec<usize> = elements.iter().map(|e| e.z_index).collect();
        assert_eq!(z, vec![0, 1, 2]);

        let grouped = elements[1].transform.unwrap();
        assert_eq!((grouped.x, grouped.y, grouped.width, grouped.height), (1020, 2040, 100, 100));
        assert_eq!(elements[1].source_part, "ppt/slides/slide1.xml");
    }

    #[test]
    fn test_alternate_content_prefers_choice() {
        let tree = parse_xml(
            br#"<p:spTree><mc:AlternateContent>
  <mc:Choice Requires="p14"><p:sp><p:nvSpPr><p:cNvPr id="20" name="Choice"/></p:nvSpPr></p:sp></mc:Choice>
  <mc:Fallback><p:sp><p:nvSpPr><p:cNvPr id="21" name="Fallback"/></p:nvSpPr></p:sp></mc:Fallback>
</mc:AlternateContent></p:spTree>"#,
        )
        .unwrap();
        let mut walker = TreeWalker::new("x", Provenance::default());
        walker.walk(&tree, GroupMapping::identity());
        let elements = walker.into_elements();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].shape_id(), Some(20));
    }
}
