//! Core domain types, unit conversion, and error taxonomy for PowerPoint
//! component extraction.

pub mod components;
pub mod error;
pub mod media;
pub mod rich_text;
pub mod types;
pub mod units;

pub use components::ComponentData;
pub use error::{Error, Result};
pub use media::{InlineMediaStore, MediaStorage, MediaStore, StoredMedia};
pub use rich_text::RichTextDocument;
pub use types::{
    ComponentMetadata, ComponentStyle, Geometry, PowerPointComponent, PresentationFormat,
    ProcessedPresentation, ProcessedSlide, SlideDimensions,
};
