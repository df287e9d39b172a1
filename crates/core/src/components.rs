//! Type-specific component payloads.

use crate::media::MediaStorage;
use crate::rich_text::RichTextDocument;
use crate::types::ComponentStyle;
use serde::{Deserialize, Serialize};

/// Type tag and payload of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComponentData {
    Text(TextData),
    Shape(ShapeData),
    Image(ImageData),
    Table(TableData),
    Video(VideoData),
    Connector(ConnectorData),
}

impl ComponentData {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Shape(_) => "shape",
            Self::Image(_) => "image",
            Self::Table(_) => "table",
            Self::Video(_) => "video",
            Self::Connector(_) => "connector",
        }
    }
}

/// A text box or text placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextData {
    pub is_title: bool,
    pub rich_text: RichTextDocument,
}

/// Text carried inside a non-text shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPayload {
    pub content: String,
    pub rich_text: RichTextDocument,
    #[serde(skip_serializing_if = "ComponentStyle::is_empty", default)]
    pub style: ComponentStyle,
}

/// A preset or custom geometry shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeData {
    /// Preset geometry name (`rect`, `ellipse`, ...) or `custom`.
    pub shape_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<LineStyle>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub effects: Vec<ShapeEffect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextPayload>,
}

impl ShapeData {
    pub fn new(shape_type: impl Into<String>) -> Self {
        Self {
            shape_type: shape_type.into(),
            fill: None,
            border: None,
            effects: Vec::new(),
            text: None,
        }
    }
}

/// Shape or cell fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Fill {
    /// Explicit `noFill`.
    #[serde(rename = "none")]
    NoFill,
    Solid {
        color: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        opacity: Option<f64>,
    },
    Gradient {
        stops: Vec<GradientStop>,
        #[serde(skip_serializing_if = "Option::is_none")]
        angle: Option<f64>,
    },
    Pattern {
        preset: String,
        foreground: String,
        background: String,
    },
    /// Picture fill; the picture itself is not extracted for shapes.
    Image,
}

impl Fill {
    /// The single color that best represents this fill.
    pub fn primary_color(&self) -> Option<&str> {
        match self {
            Fill::Solid { color, .. } => Some(color),
            Fill::Gradient { stops, .. } => stops.first().map(|s| s.color.as_str()),
            Fill::Pattern { foreground, .. } => Some(foreground),
            Fill::NoFill | Fill::Image => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, 0-100.
    pub position: f64,
    pub color: String,
}

/// Stroke of a shape outline, a cell border or a connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    /// Width in pixels.
    pub width: f64,
    pub color: String,
    /// Preset dash name (`solid`, `dash`, `sysDot`, ...).
    pub dash: String,
    /// Line cap (`flat`, `round`, `square`).
    pub cap: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShapeEffect {
    Shadow {
        inner: bool,
        color: String,
        blur: f64,
        distance: f64,
        direction: f64,
    },
    Glow {
        color: String,
        radius: f64,
    },
    SoftEdge {
        radius: f64,
    },
    Reflection {
        blur: f64,
        distance: f64,
    },
}

/// A picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    /// Data URI or storage reference, or the external link target.
    pub src: String,
    pub storage: MediaStorage,
    pub mime_type: String,
    /// Path of the media part inside the container, or the external URL.
    pub media_path: String,
    pub size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub effects: Vec<ImageEffect>,
}

/// Source-rectangle crop, each edge as a percentage of the source image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ImageEffect {
    Grayscale,
    BiLevel { threshold: f64 },
    Alpha { amount: f64 },
    Luminance { brightness: f64, contrast: f64 },
    Duotone { colors: Vec<String> },
}

/// A table graphic frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub rows: usize,
    pub columns: usize,
    pub column_widths: Vec<i64>,
    pub row_heights: Vec<i64>,
    /// Cells row by row; every row keeps the merge-continuation cells so
    /// its length equals the grid width.
    pub cells: Vec<Vec<TableCell>>,
    pub has_header_row: bool,
    pub rich_text: RichTextDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    pub text: String,
    pub row: usize,
    pub column: usize,
    pub row_span: u32,
    pub col_span: u32,
    /// The cell spans more than one grid cell.
    pub is_merged: bool,
    /// The cell is covered by a neighbor's span (`hMerge`/`vMerge`).
    pub is_merge_continuation: bool,
    pub is_header: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_top: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_right: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_bottom: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_left: Option<LineStyle>,
}

impl CellStyle {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// An embedded or linked video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoData {
    pub url: String,
    pub provider: VideoProvider,
    pub is_embedded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoProvider {
    YouTube,
    Vimeo,
    Generic,
}

/// A connector line between two shapes (or two free points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorData {
    /// Preset geometry name (`straightConnector1`, `bentConnector3`, ...).
    pub connector_type: String,
    /// `straight`, `elbow` or `curved`.
    pub routing: String,
    pub start_point: Point,
    pub end_point: Point,
    pub line: LineStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_arrow: Option<Arrowhead>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_arrow: Option<Arrowhead>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_connection: Option<ConnectionRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_connection: Option<ConnectionRef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrowhead {
    /// `triangle`, `stealth`, `diamond`, `oval` or `arrow`.
    pub kind: String,
    pub width: String,
    pub length: String,
}

/// A connector endpoint glued to a shape's connection site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRef {
    pub shape_id: u32,
    pub site_index: u32,
    /// Whether the shape was found and the point computed from it.
    pub resolved: bool,
}
