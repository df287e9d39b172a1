//! Error types for PowerPoint component extraction.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting components from PowerPoint data.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read local input.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The request itself was rejected (bad origin, malformed URL, unusable buffer).
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// A structurally required part of the container could not be decoded.
    #[error("Failed to parse PowerPoint data: {0}")]
    ContainerRead(String),

    /// Neither the pptx nor the clipboard schema was detected.
    #[error("Unsupported or unrecognized PowerPoint format: {0}")]
    UnsupportedFormat(String),

    /// A single element could not be turned into a component.
    #[error("Failed to parse element: {0}")]
    ElementParse(String),

    /// Fetching the clipboard source failed.
    #[error("Failed to fetch clipboard data: {0}")]
    UpstreamFetch(String),

    /// Low-level XML decoding error. Callers classify it as structural or
    /// element-level before it leaves the pipeline.
    #[error("XML parsing error: {0}")]
    XmlError(String),
}

impl Error {
    /// Whether the pipeline may drop the offending element and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::ElementParse(_))
    }

    /// Reclassify a low-level error as fatal for the whole container.
    pub fn into_container_error(self, context: &str) -> Self {
        match self {
            Error::XmlError(msg) | Error::ElementParse(msg) => {
                Error::ContainerRead(format!("{}: {}", context, msg))
            }
            other => other,
        }
    }

    /// Reclassify a low-level error as scoped to one element.
    pub fn into_element_error(self, context: &str) -> Self {
        match self {
            Error::XmlError(msg) => Error::ElementParse(format!("{}: {}", context, msg)),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_error_message() {
        let err = Error::ContainerRead("invalid Zip archive".to_string());
        assert!(err.to_string().contains("Failed to parse PowerPoint data"));
    }

    #[test]
    fn test_only_element_errors_are_recoverable() {
        assert!(Error::ElementParse("bad xfrm".into()).is_recoverable());
        assert!(!Error::ContainerRead("x".into()).is_recoverable());
        assert!(!Error::UpstreamFetch("503".into()).is_recoverable());
        assert!(!Error::InputValidation("host".into()).is_recoverable());
    }

    #[test]
    fn test_reclassify_xml_error() {
        let err = Error::XmlError("unexpected end".into()).into_container_error("ppt/slides/slide1.xml");
        assert!(matches!(err, Error::ContainerRead(_)));
        assert!(err.to_string().contains("ppt/slides/slide1.xml"));

        let err = Error::XmlError("bad attr".into()).into_element_error("sp 4");
        assert!(err.is_recoverable());
    }
}
