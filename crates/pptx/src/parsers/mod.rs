//! Component parsers.
//!
//! Each parser turns one [`NormalizedElement`] into a typed
//! [`PowerPointComponent`]. A parser returns `Ok(None)` when the feature it
//! looks for is structurally absent, and an [`Error::ElementParse`] only when
//! something present is too corrupt to skip safely.

pub mod connector;
pub mod image;
pub mod shape;
pub mod table;
pub mod text;
pub mod video;

pub use connector::{ShapeBox, ShapePositionMap};

use crate::archive::Package;
use crate::normalize::{ElementKind, NormalizedElement};
use crate::options::ParseOptions;
use crate::rels::Relationships;
use crate::theme::ThemeContext;
use ppt_core::units::{check_emu_leak, emu_to_pixels};
use ppt_core::{ComponentData, ComponentMetadata, Error, Geometry, PowerPointComponent, Result, StoredMedia};
use uuid::Uuid;

/// Media pulled out of the container and handed to the media store.
#[derive(Debug, Clone)]
pub struct ExtractedMedia {
    pub path: String,
    pub mime_type: String,
    pub stored: StoredMedia,
    pub size_bytes: usize,
}

/// Everything a parser may consult besides the element itself.
pub struct ParseContext<'a> {
    pub package: &'a Package,
    pub theme: &'a ThemeContext,
    pub options: &'a ParseOptions,
    /// Zero-based output slide index.
    pub slide_index: usize,
    pub positions: &'a ShapePositionMap,
}

impl<'a> ParseContext<'a> {
    /// Pixel geometry of an element. Elements without a transform sit at
    /// the origin with no size.
    pub fn geometry(&self, element: &NormalizedElement) -> Geometry {
        let Some(t) = element.transform else {
            log::debug!("{:?} element {:?} has no transform", element.kind, element.name());
            return Geometry::default();
        };
        let px = |emu: i64, what: &str| {
            let value = emu_to_pixels(emu);
            check_emu_leak(value, self.options.emu_leak_threshold, what);
            value
        };
        Geometry {
            x: px(t.x, "x"),
            y: px(t.y, "y"),
            width: px(t.width, "width"),
            height: px(t.height, "height"),
            rotation: t.rotation,
        }
    }

    pub fn metadata(&self, element: &NormalizedElement) -> ComponentMetadata {
        ComponentMetadata {
            name: element.name().map(str::to_string),
            shape_id: element.shape_id(),
            placeholder_type: element.placeholder.as_ref().map(|p| p.kind.clone()),
            placeholder_index: element.placeholder.as_ref().and_then(|p| p.idx),
            namespace: element.namespace.clone(),
            source_part: element.source_part.clone(),
            is_background: element.provenance.is_background,
            is_layout_element: element.provenance.is_layout,
            is_master_element: element.provenance.is_master,
        }
    }

    /// Relationship table of the part the element was read from.
    pub fn relationships(&self, element: &NormalizedElement) -> Relationships {
        self.package.relationships(&element.source_part)
    }

    /// Resolve an internal relationship id to stored media.
    pub fn store_media(&self, element: &NormalizedElement, rel_id: &str) -> Result<ExtractedMedia> {
        let rels = self.relationships(element);
        let rel = rels.get(rel_id).ok_or_else(|| {
            Error::ElementParse(format!("relationship '{}' not found for '{}'", rel_id, element.source_part))
        })?;
        let bytes = self
            .package
            .media(&rel.target)
            .ok_or_else(|| Error::ElementParse(format!("media part '{}' is missing", rel.target)))?;
        let mime = ppt_core::media::mime_from_path(&rel.target)
            .or_else(|| ppt_core::media::mime_from_magic(bytes))
            .unwrap_or("application/octet-stream");
        let stored = self
            .options
            .media_store
            .store(&rel.target, mime, bytes)
            .map_err(|e| Error::ElementParse(format!("could not store '{}': {}", rel.target, e)))?;
        Ok(ExtractedMedia {
            path: rel.target.clone(),
            mime_type: mime.to_string(),
            stored,
            size_bytes: bytes.len(),
        })
    }

    /// Assemble a component with geometry, metadata and a fresh id.
    pub fn component(&self, element: &NormalizedElement, data: ComponentData) -> PowerPointComponent {
        let id = format!(
            "{}-{}-{}-{}",
            data.type_name(),
            self.slide_index,
            element.z_index,
            Uuid::new_v4().simple()
        );
        PowerPointComponent::new(id, data, self.geometry(element), self.slide_index, element.z_index)
            .with_metadata(self.metadata(element))
    }
}

/// Dispatch one element to the parser for its kind.
pub fn parse_element(element: &NormalizedElement, ctx: &ParseContext<'_>) -> Result<Option<PowerPointComponent>> {
    match element.kind {
        ElementKind::Text => text::parse_text(element, ctx),
        ElementKind::Shape => shape::parse_shape(element, ctx),
        ElementKind::Image => image::parse_image(element, ctx),
        ElementKind::Table => table::parse_table(element, ctx),
        ElementKind::Video => video::parse_video(element, ctx),
        ElementKind::Connection => connector::parse_connector(element, ctx),
    }
}
