//! PowerPoint component extraction for `.pptx` files and clipboard fragments.
//!
//! Both container variants are OOXML ZIP packages. [`PowerPointProcessor`]
//! reads the package, detects which schema it carries, normalizes the
//! drawing trees into one ordered element list per slide and hands each
//! element to a typed component parser.

pub mod archive;
pub mod detect;
pub mod normalize;
pub mod options;
pub mod parsers;
pub mod processor;
pub mod rels;
pub mod theme;
pub mod xml;

#[cfg(test)]
mod fixtures;

pub use archive::Package;
pub use detect::detect_format;
pub use options::ParseOptions;
pub use processor::PowerPointProcessor;
pub use theme::ThemeContext;
