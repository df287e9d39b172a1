//! Domain types for representing extracted presentation content.

use crate::components::ComponentData;
use serde::{Deserialize, Serialize};

/// ZIP local-file-header signature every supported container starts with.
pub const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Default slide size in pixels (10in x 7.5in at 96 DPI).
pub const DEFAULT_SLIDE_WIDTH_PX: i64 = 960;
pub const DEFAULT_SLIDE_HEIGHT_PX: i64 = 720;

/// The result of parsing one buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedPresentation {
    /// Detected container schema.
    pub format: PresentationFormat,

    /// Slides in presentation order.
    pub slides: Vec<ProcessedSlide>,

    /// Number of components across all slides.
    pub total_components: usize,

    /// Pixel size of the first slide (all slides share one size in pptx).
    pub slide_dimensions: SlideDimensions,
}

impl ProcessedPresentation {
    /// Create an empty presentation of the given format.
    pub fn new(format: PresentationFormat, slide_dimensions: SlideDimensions) -> Self {
        Self {
            format,
            slides: Vec::new(),
            total_components: 0,
            slide_dimensions,
        }
    }

    /// The zero-component result for buffers that are not containers at all.
    pub fn unknown() -> Self {
        Self::new(PresentationFormat::Unknown, SlideDimensions::default())
    }

    /// Add a slide, keeping the component total current.
    pub fn add_slide(&mut self, slide: ProcessedSlide) {
        self.total_components += slide.components.len();
        self.slides.push(slide);
    }

    /// All components from all slides, flattened in slide order.
    pub fn all_components(&self) -> impl Iterator<Item = &PowerPointComponent> {
        self.slides.iter().flat_map(|s| s.components.iter())
    }
}

/// The container schema a buffer was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationFormat {
    /// Full presentation archive (`ppt/slides/...`).
    Pptx,
    /// Clipboard fragment (`clipboard/drawings/...`).
    Clipboard,
    /// Not a container; nothing was parsed.
    Unknown,
}

impl PresentationFormat {
    /// Whether the buffer starts with a ZIP local-file-header signature.
    pub fn has_container_magic(bytes: &[u8]) -> bool {
        bytes.len() >= ZIP_SIGNATURE.len() && bytes.starts_with(&ZIP_SIGNATURE)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pptx => "pptx",
            Self::Clipboard => "clipboard",
            Self::Unknown => "unknown",
        }
    }
}

/// Slide size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideDimensions {
    pub width: i64,
    pub height: i64,
}

impl Default for SlideDimensions {
    fn default() -> Self {
        Self {
            width: DEFAULT_SLIDE_WIDTH_PX,
            height: DEFAULT_SLIDE_HEIGHT_PX,
        }
    }
}

/// Components extracted from one slide (or one clipboard drawing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedSlide {
    /// Zero-based position in the output.
    pub slide_index: usize,

    /// 1-based slide number, pptx only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide_number: Option<usize>,

    /// Components in z-order.
    pub components: Vec<PowerPointComponent>,
}

impl ProcessedSlide {
    pub fn new(slide_index: usize, slide_number: Option<usize>) -> Self {
        Self {
            slide_index,
            slide_number,
            components: Vec::new(),
        }
    }

    pub fn add_component(&mut self, component: PowerPointComponent) {
        self.components.push(component);
    }
}

/// Pixel geometry shared by all components.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Geometry {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub rotation: f64,
}

/// One typed, positioned component. This is the durable output record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerPointComponent {
    pub id: String,

    /// Type tag plus type-specific payload.
    #[serde(flatten)]
    pub data: ComponentData,

    /// Plain-text rendition, when the component carries text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,

    /// Clockwise rotation in degrees, omitted when zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ComponentStyle>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ComponentMetadata>,

    pub slide_index: usize,
    pub z_index: usize,
}

impl PowerPointComponent {
    /// Create a component with the given payload and geometry.
    pub fn new(id: impl Into<String>, data: ComponentData, geometry: Geometry, slide_index: usize, z_index: usize) -> Self {
        Self {
            id: id.into(),
            data,
            content: None,
            x: geometry.x,
            y: geometry.y,
            width: geometry.width,
            height: geometry.height,
            rotation: (geometry.rotation != 0.0).then_some(geometry.rotation),
            style: None,
            metadata: None,
            slide_index,
            z_index,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_style(mut self, style: ComponentStyle) -> Self {
        self.style = (!style.is_empty()).then_some(style);
        self
    }

    pub fn with_metadata(mut self, metadata: ComponentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// The serialized `type` tag.
    pub fn type_name(&self) -> &'static str {
        self.data.type_name()
    }
}

/// Presentation style common to all component types. Every field is optional
/// and omitted from output when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl ComponentStyle {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Where a component came from and how it relates to its slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMetadata {
    /// `cNvPr` name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `cNvPr` id, the key connectors refer to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_index: Option<u32>,
    /// Namespace prefix of the source element (`p`, `a`, ...).
    pub namespace: String,
    /// Container part the element was read from.
    pub source_part: String,
    pub is_background: bool,
    pub is_layout_element: bool,
    pub is_master_element: bool,
}

impl ComponentMetadata {
    /// Whether the component belongs to the slide's own foreground content.
    pub fn is_foreground(&self) -> bool {
        !(self.is_background || self.is_layout_element || self.is_master_element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ShapeData, ComponentData};

    fn sample_component(z: usize) -> PowerPointComponent {
        PowerPointComponent::new(
            format!("shape-0-{}", z),
            ComponentData::Shape(ShapeData::new("rect")),
            Geometry { x: 10, y: 20, width: 100, height: 50, rotation: 0.0 },
            0,
            z,
        )
    }

    #[test]
    fn test_has_container_magic() {
        assert!(PresentationFormat::has_container_magic(&[0x50, 0x4B, 0x03, 0x04, 0x14]));
        assert!(!PresentationFormat::has_container_magic(&[0x50, 0x4B]));
        assert!(!PresentationFormat::has_container_magic(&[]));
        assert!(!PresentationFormat::has_container_magic(b"%PDF-1.7"));
    }

    #[test]
    fn test_add_slide_tracks_total() {
        let mut presentation = ProcessedPresentation::new(PresentationFormat::Pptx, SlideDimensions::default());
        let mut slide = ProcessedSlide::new(0, Some(1));
        slide.add_component(sample_component(0));
        slide.add_component(sample_component(1));
        presentation.add_slide(slide);
        presentation.add_slide(ProcessedSlide::new(1, Some(2)));

        assert_eq!(presentation.total_components, 2);
        assert_eq!(presentation.all_components().count(), 2);
    }

    #[test]
    fn test_unknown_serializes_empty() {
        let json = serde_json::to_value(ProcessedPresentation::unknown()).unwrap();
        assert_eq!(json["format"], "unknown");
        assert_eq!(json["totalComponents"], 0);
        assert_eq!(json["slides"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn test_component_serializes_flat_with_type_tag() {
        let json = serde_json::to_value(sample_component(3)).unwrap();
        assert_eq!(json["type"], "shape");
        assert_eq!(json["shapeType"], "rect");
        assert_eq!(json["zIndex"], 3);
        assert_eq!(json["slideIndex"], 0);
        assert!(json.get("rotation").is_none());
        assert!(json.get("style").is_none());
    }

    #[test]
    fn test_empty_style_is_dropped() {
        let component = sample_component(0).with_style(ComponentStyle::default());
        assert!(component.style.is_none());
    }

    #[test]
    fn test_metadata_foreground() {
        let mut meta = ComponentMetadata::default();
        assert!(meta.is_foreground());
        meta.is_layout_element = true;
        assert!(!meta.is_foreground());
    }
}
