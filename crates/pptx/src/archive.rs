//! Container reader: unzips a buffer into parsed XML parts and raw media.

use crate::rels::Relationships;
use crate::xml::{parse_xml, XmlNode};
use ppt_core::{Error, PresentationFormat, Result};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Largest uncompressed entry accepted from a container.
pub const MAX_ENTRY_BYTES: u64 = 256 * 1024 * 1024;

/// All parts of one container, decoded. Scoped to a single parse call.
#[derive(Debug, Default, Clone)]
pub struct Package {
    parts: BTreeMap<String, XmlNode>,
    media: BTreeMap<String, Vec<u8>>,
}

impl Package {
    /// Read a container from memory.
    ///
    /// Returns `Ok(None)` when the buffer does not start with a ZIP
    /// local-file-header signature (including empty buffers). Fails when the
    /// ZIP itself is corrupt or a required drawing part cannot be decoded;
    /// optional XML parts that fail to decode are replaced by an empty node.
    /// Entries larger than [`MAX_ENTRY_BYTES`] once inflated are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Option<Self>> {
        Self::from_bytes_with_limit(bytes, MAX_ENTRY_BYTES)
    }

    pub(crate) fn from_bytes_with_limit(bytes: &[u8], max_entry_bytes: u64) -> Result<Option<Self>> {
        if !PresentationFormat::has_container_magic(bytes) {
            log::debug!("Buffer of {} bytes has no ZIP signature", bytes.len());
            return Ok(None);
        }

        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::ContainerRead(format!("Failed to open ZIP: {}", e)))?;

        let mut package = Package::default();
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| Error::ContainerRead(format!("Failed to read ZIP entry {}: {}", index, e)))?;
            if file.is_dir() {
                continue;
            }
            let path = normalize_path(file.name());

            if file.size() > max_entry_bytes {
                return Err(Error::ContainerRead(format!(
                    "Entry '{}' declares {} bytes, limit is {}",
                    path,
                    file.size(),
                    max_entry_bytes
                )));
            }

            // Declared sizes are untrusted.
            let mut content = Vec::with_capacity(file.size().min(bytes.len() as u64) as usize);
            let read = (&mut file).take(max_entry_bytes + 1).read_to_end(&mut content);
            if content.len() as u64 > max_entry_bytes {
                return Err(Error::ContainerRead(format!(
                    "Entry '{}' inflates past {} bytes",
                    path, max_entry_bytes
                )));
            }
            if let Err(e) = read {
                if is_required_part(&path) {
                    return Err(Error::ContainerRead(format!("Failed to read '{}': {}", path, e)));
                }
                log::warn!("Skipping unreadable entry '{}': {}", path, e);
                continue;
            }

            if is_xml_part(&path) {
                match parse_xml(&content) {
                    Ok(node) => {
                        package.parts.insert(path, node);
                    }
                    Err(e) if is_required_part(&path) => {
                        return Err(e.into_container_error(&path));
                    }
                    Err(e) => {
                        log::warn!("Optional part '{}' failed to parse, using empty node: {}", path, e);
                        package.parts.insert(path, XmlNode::empty());
                    }
                }
            } else {
                package.media.insert(path, content);
            }
        }

        log::debug!(
            "Read container: {} XML parts, {} media entries",
            package.parts.len(),
            package.media.len()
        );
        Ok(Some(package))
    }

    /// Every entry path (XML and media), sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().chain(self.media.keys()).map(String::as_str)
    }

    pub fn part(&self, path: &str) -> Option<&XmlNode> {
        self.parts.get(path)
    }

    /// XML part paths under `prefix`, sorted by their numeric suffix.
    pub fn parts_under(&self, prefix: &str) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .parts
            .keys()
            .map(String::as_str)
            .filter(|p| p.starts_with(prefix) && !p[prefix.len()..].contains('/') && p.ends_with(".xml"))
            .collect();
        paths.sort_by_key(|p| (extract_part_number(p).unwrap_or(usize::MAX), p.to_string()));
        paths
    }

    pub fn media(&self, path: &str) -> Option<&[u8]> {
        self.media.get(path).map(Vec::as_slice)
    }

    /// Relationship table of a part (`dir/_rels/name.rels`). Missing or
    /// unreadable tables are empty.
    pub fn relationships(&self, part_path: &str) -> Relationships {
        let rels_path = rels_path_for(part_path);
        match self.parts.get(&rels_path) {
            Some(node) => Relationships::from_node(part_path, node),
            None => Relationships::default(),
        }
    }
}

/// Parts whose failure aborts the whole parse.
fn is_required_part(path: &str) -> bool {
    (path.starts_with("ppt/slides/") && !path.contains("/_rels/") && path.ends_with(".xml"))
        || (path.starts_with("clipboard/drawings/") && !path.contains("/_rels/") && path.ends_with(".xml"))
}

fn is_xml_part(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".xml") || lower.ends_with(".rels")
}

fn normalize_path(name: &str) -> String {
    name.trim_start_matches('/').replace('\\', "/")
}

/// Path of the relationship part that belongs to `part_path`.
pub fn rels_path_for(part_path: &str) -> String {
    match part_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_path),
    }
}

/// Extract the trailing number from a name like "rId2" or "slide3.xml".
pub fn extract_part_number(s: &str) -> Option<usize> {
    let s = s.rsplit('/').next().unwrap_or(s);
    let s = s.trim_end_matches(".rels").trim_end_matches(".xml");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ZipBuilder;

    #[test]
    fn test_extract_part_number() {
        assert_eq!(extract_part_number("rId1"), Some(1));
        assert_eq!(extract_part_number("rId12"), Some(12));
        assert_eq!(extract_part_number("slide1.xml"), Some(1));
        assert_eq!(extract_part_number("ppt/slides/slide123.xml"), Some(123));
        assert_eq!(extract_part_number("nodigits"), None);
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for("ppt/slides/slide1.xml"), "ppt/slides/_rels/slide1.xml.rels");
        assert_eq!(rels_path_for("ppt/presentation.xml"), "ppt/_rels/presentation.xml.rels");
        assert_eq!(
            rels_path_for("clipboard/drawings/drawing1.xml"),
            "clipboard/drawings/_rels/drawing1.xml.rels"
        );
    }

    #[test]
    fn test_non_container_buffers_yield_none() {
        assert!(Package::from_bytes(&[]).unwrap().is_none());
        assert!(Package::from_bytes(&[0x50, 0x4B]).unwrap().is_none());
        assert!(Package::from_bytes(b"not a zip at all").unwrap().is_none());
    }

    #[test]
    fn test_signature_with_garbage_is_container_error() {
        let mut bytes = vec![0x50, 0x4B, 0x03, 0x04];
        bytes.extend_from_slice(&[0xAB; 64]);
        let err = Package::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::ContainerRead(_)));
        assert!(err.to_string().contains("Failed to parse PowerPoint data"));
    }

    #[test]
    fn test_reads_xml_and_media() {
        let bytes = ZipBuilder::new()
            .file("ppt/slides/slide1.xml", "<p:sld><p:cSld><p:spTree/></p:cSld></p:sld>")
            .bytes("ppt/media/image1.png", &[0x89, b'P', b'N', b'G'])
            .build();
        let package = Package::from_bytes(&bytes).unwrap().unwrap();
        assert_eq!(package.part("ppt/slides/slide1.xml").unwrap().local_name(), "sld");
        assert_eq!(package.media("ppt/media/image1.png").unwrap().len(), 4);
        assert_eq!(package.paths().count(), 2);
    }

    #[test]
    fn test_optional_part_failure_is_tolerated() {
        let bytes = ZipBuilder::new()
            .file("ppt/slides/slide1.xml", "<p:sld><p:cSld><p:spTree/></p:cSld></p:sld>")
            .file("ppt/theme/theme1.xml", "<a:theme><broken></a:theme>")
            .file("ppt/slides/_rels/slide1.xml.rels", "<Relationships><oops")
            .build();
        let package = Package::from_bytes(&bytes).unwrap().unwrap();
        assert!(package.part("ppt/theme/theme1.xml").unwrap().is_empty());
        assert!(package.relationships("ppt/slides/slide1.xml").is_empty());
    }

    #[test]
    fn test_required_part_failure_is_fatal() {
        let bytes = ZipBuilder::new()
            .file("ppt/slides/slide1.xml", "<p:sld><p:cSld>")
            .build();
        let err = Package::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::ContainerRead(_)));
        assert!(err.to_string().contains("ppt/slides/slide1.xml"));
    }

    #[test]
    fn test_oversized_entry_is_container_error() {
        let bytes = ZipBuilder::new()
            .file("ppt/slides/slide1.xml", "<p:sld><p:cSld><p:spTree/></p:cSld></p:sld>")
            .bytes("ppt/media/image1.png", &[0u8; 4096])
            .build();

        let err = Package::from_bytes_with_limit(&bytes, 1024).unwrap_err();
        assert!(matches!(err, Error::ContainerRead(_)));
        assert!(err.to_string().contains("ppt/media/image1.png"));

        let package = Package::from_bytes_with_limit(&bytes, 4096).unwrap().unwrap();
        assert_eq!(package.media("ppt/media/image1.png").unwrap().len(), 4096);
    }

    #[test]
    fn test_parts_under_sorts_numerically() {
        let bytes = ZipBuilder::new()
            .file("ppt/slides/slide10.xml", "<p:sld/>")
            .file("ppt/slides/slide2.xml", "<p:sld/>")
            .file("ppt/slides/slide1.xml", "<p:sld/>")
            .file("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>")
            .build();
        let package = Package::from_bytes(&bytes).unwrap().unwrap();
        assert_eq!(
            package.parts_under("ppt/slides/"),
            vec!["ppt/slides/slide1.xml", "ppt/slides/slide2.xml", "ppt/slides/slide10.xml"]
        );
    }
}
