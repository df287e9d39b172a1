//! Normalization of full presentation archives.

use super::placeholder::resolve_inheritance;
use super::{assign_z_order, ElementKind, GroupMapping, NormalizedDocument, NormalizedElement, NormalizedSlide, Provenance, Transform, TreeWalker};
use crate::archive::Package;
use crate::detect::PPTX_SLIDES_PREFIX;
use crate::options::ParseOptions;
use crate::rels::{REL_SLIDE, REL_SLIDE_LAYOUT, REL_SLIDE_MASTER, REL_THEME};
use crate::theme::ThemeContext;
use crate::xml::XmlNode;
use ppt_core::units::emu_to_pixels;
use ppt_core::{Error, PresentationFormat, Result, SlideDimensions};

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const THEME_PREFIX: &str = "ppt/theme/";

/// Layout or master shape tree, walked once per distinct part.
struct TemplatePart {
    path: String,
    node: XmlNode,
    elements: Vec<NormalizedElement>,
}

impl TemplatePart {
    fn load(package: &Package, path: &str, provenance: Provenance) -> Option<Self> {
        let node = package.part(path)?.clone();
        let mut walker = TreeWalker::new(path, provenance);
        if let Some(tree) = node.find(&["cSld", "spTree"]) {
            walker.walk(tree, GroupMapping::identity());
        }
        Some(Self {
            path: path.to_string(),
            node,
            elements: walker.into_elements(),
        })
    }

    fn background(&self) -> Option<&XmlNode> {
        self.node.find(&["cSld", "bg"])
    }
}

pub(super) fn normalize_pptx(package: &Package, options: &ParseOptions) -> Result<NormalizedDocument> {
    let dimensions = slide_dimensions(package, options);
    let slide_paths = slide_order(package);
    log::debug!("Found {} slides", slide_paths.len());

    let mut slides = Vec::with_capacity(slide_paths.len());

    for (index, slide_path) in slide_paths.iter().enumerate() {
        let slide = normalize_slide(package, slide_path, index + 1, dimensions, options)?;
        slides.push(slide);
    }

    Ok(NormalizedDocument {
        format: PresentationFormat::Pptx,
        slides,
        dimensions,
    })
}

fn normalize_slide(
    package: &Package,
    slide_path: &str,
    slide_number: usize,
    dimensions: SlideDimensions,
    options: &ParseOptions,
) -> Result<NormalizedSlide> {
    let slide_node = package
        .part(slide_path)
        .ok_or_else(|| Error::ContainerRead(format!("slide part '{}' is missing", slide_path)))?;
    let tree = slide_node
        .find(&["cSld", "spTree"])
        .ok_or_else(|| Error::ContainerRead(format!("slide part '{}' has no shape tree", slide_path)))?;

    let layout_path = package
        .relationships(slide_path)
        .first_of_type(REL_SLIDE_LAYOUT)
        .map(|r| r.target.clone());
    let layout = layout_path.as_deref().and_then(|p| {
        TemplatePart::load(
            package,
            p,
            Provenance {
                is_layout: true,
                ..Provenance::default()
            },
        )
    });
    let master_path = layout_path
        .as_deref()
        .and_then(|p| package.relationships(p).first_of_type(REL_SLIDE_MASTER).map(|r| r.target.clone()));
    let master = master_path.as_deref().and_then(|p| {
        TemplatePart::load(
            package,
            p,
            Provenance {
                is_master: true,
                ..Provenance::default()
            },
        )
    });

    let theme = slide_theme(package, slide_node, layout.as_ref(), master.as_ref());

    let mut walker = TreeWalker::new(slide_path, Provenance::default());
    walker.walk(tree, GroupMapping::identity());
    let mut own = walker.into_elements();

    let layout_elements = layout.as_ref().map(|l| l.elements.as_slice()).unwrap_or_default();
    let master_elements = master.as_ref().map(|m| m.elements.as_slice()).unwrap_or_default();
    let master_text_styles = master.as_ref().and_then(|m| m.node.child("txStyles"));

    for element in own.iter_mut() {
        let Some(ph) = element.placeholder.clone() else {
            continue;
        };
        let inherited = resolve_inheritance(&ph, layout_elements, master_elements, master_text_styles);
        if element.transform.is_none() {
            element.transform = inherited.transform;
            if element.transform.is_none() {
                log::debug!("Placeholder {:?} on '{}' has no geometry anywhere in its chain", ph, slide_path);
            }
        }
        element.list_styles.extend(inherited.list_styles);
    }

    let mut elements = Vec::new();
    if options.include_background {
        let background = std::iter::once((slide_path, slide_node.find(&["cSld", "bg"])))
            .chain(layout.as_ref().map(|l| (l.path.as_str(), l.background())))
            .chain(master.as_ref().map(|m| (m.path.as_str(), m.background())))
            .find_map(|(part, bg)| bg.map(|bg| (part, bg)));
        if let Some((part, bg)) = background {
            if let Some(element) = background_element(bg, part, dimensions) {
                elements.push(element);
            }
        }
    }
    if options.include_layout_elements {
        if let Some(master) = &master {
            elements.extend(master.elements.iter().filter(|e| e.placeholder.is_none()).cloned());
        }
        if let Some(layout) = &layout {
            elements.extend(layout.elements.iter().filter(|e| e.placeholder.is_none()).cloned());
        }
    }
    elements.extend(own);
    assign_z_order(&mut elements);

    Ok(NormalizedSlide {
        source_part: slide_path.to_string(),
        slide_number: Some(slide_number),
        format: PresentationFormat::Pptx,
        elements,
        dimensions,
        layout_part: layout_path,
        master_part: master_path,
        theme,
    })
}

/// Slide part paths in presentation order: `sldIdLst` through the
/// presentation relationships, else by file number.
fn slide_order(package: &Package) -> Vec<String> {
    let rels = package.relationships(PRESENTATION_PART);
    let from_list: Vec<String> = package
        .part(PRESENTATION_PART)
        .and_then(|p| p.child("sldIdLst"))
        .map(|list| {
            list.children_named("sldId")
                .filter_map(|id| id.attr_ns("id"))
                .filter_map(|rid| rels.get(rid))
                .filter(|rel| rel.is_type(REL_SLIDE))
                .map(|rel| rel.target.clone())
                .collect()
        })
        .unwrap_or_default();

    if !from_list.is_empty() {
        return from_list;
    }
    package
        .parts_under(PPTX_SLIDES_PREFIX)
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn slide_dimensions(package: &Package, options: &ParseOptions) -> SlideDimensions {
    package
        .part(PRESENTATION_PART)
        .and_then(|p| p.child("sldSz"))
        .and_then(|sz| Some((sz.attr_i64_lenient("cx")?, sz.attr_i64_lenient("cy")?)))
        .filter(|(cx, cy)| *cx > 0 && *cy > 0)
        .map(|(cx, cy)| SlideDimensions {
            width: emu_to_pixels(cx),
            height: emu_to_pixels(cy),
        })
        .unwrap_or(options.default_slide_size)
}

/// Theme of the slide's own master (else the first theme part), mapped
/// through the master `clrMap` and then any layout or slide `clrMapOvr`.
fn slide_theme(
    package: &Package,
    slide: &XmlNode,
    layout: Option<&TemplatePart>,
    master: Option<&TemplatePart>,
) -> ThemeContext {
    let theme_path = master
        .and_then(|m| package.relationships(&m.path).first_of_type(REL_THEME).map(|r| r.target.clone()))
        .or_else(|| package.parts_under(THEME_PREFIX).first().map(|p| p.to_string()));

    let theme = theme_path
        .as_deref()
        .and_then(|p| package.part(p))
        .map(ThemeContext::from_theme)
        .unwrap_or_default();

    theme
        .with_color_map(master.and_then(|m| m.node.child("clrMap")))
        .with_color_map(layout.and_then(|l| color_map_override(&l.node)))
        .with_color_map(color_map_override(slide))
}

/// `p:clrMapOvr/a:overrideClrMapping`; `a:masterClrMapping` keeps the
/// inherited map.
fn color_map_override(part: &XmlNode) -> Option<&XmlNode> {
    part.child("clrMapOvr")?.child("overrideClrMapping")
}

/// Turn `p:bg` into a full-slide element: a picture for picture fills, a
/// rectangle otherwise.
fn background_element(bg: &XmlNode, part: &str, dimensions: SlideDimensions) -> Option<NormalizedElement> {
    let mut sp_pr = XmlNode::new("p:spPr");
    if let Some(bg_pr) = bg.child("bgPr") {
        sp_pr.children.extend(bg_pr.children.iter().filter(|c| !c.is("extLst")).cloned());
    } else if let Some(bg_ref) = bg.child("bgRef") {
        let mut fill = XmlNode::new("a:solidFill");
        fill.children.extend(bg_ref.children.iter().cloned());
        sp_pr.children.push(fill);
    } else {
        return None;
    }

    let blip_fill = sp_pr.children.iter().position(|c| c.is("blipFill"));
    let (kind, node) = match blip_fill {
        Some(position) => {
            let mut pic = XmlNode::new("p:pic");
            let fill = sp_pr.children.remove(position);
            let mut renamed = XmlNode::new("p:blipFill");
            renamed.attributes = fill.attributes;
            renamed.children = fill.children;
            pic.children.push(renamed);
            pic.children.push(sp_pr);
            (ElementKind::Image, pic)
        }
        None => {
            let mut geom = XmlNode::new("a:prstGeom");
            geom.attributes.push(("prst".to_string(), "rect".to_string()));
            sp_pr.children.insert(0, geom);
            let mut sp = XmlNode::new("p:sp");
            sp.children.push(sp_pr);
            (ElementKind::Shape, sp)
        }
    };

    Some(NormalizedElement {
        kind,
        namespace: "p".to_string(),
        node,
        z_index: 0,
        transform: Some(Transform {
            width: ppt_core::units::pixels_to_emu(dimensions.width),
            height: ppt_core::units::pixels_to_emu(dimensions.height),
            ..Transform::default()
        }),
        placeholder: None,
        list_styles: Vec::new(),
        source_part: part.to_string(),
        provenance: Provenance {
            is_background: true,
            ..Provenance::default()
        },
    })
}
