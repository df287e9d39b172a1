//! Storage contract for extracted media.
//!
//! Image and video bytes pulled out of a container are handed to a
//! [`MediaStore`], which returns something a renderer can load. The default
//! store inlines the bytes as a `data:` URI; hosts that persist media plug in
//! their own implementation.

use crate::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// How a media reference can be retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaStorage {
    /// The reference is a self-contained `data:` URI.
    Inline,
    /// The reference points at an external store.
    Reference,
}

/// A retrievable reference to stored media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMedia {
    pub url: String,
    pub storage: MediaStorage,
}

/// Persists extracted media and hands back a retrievable reference.
pub trait MediaStore: Send + Sync {
    /// Store `bytes` found at `path` inside the container.
    fn store(&self, path: &str, mime_type: &str, bytes: &[u8]) -> Result<StoredMedia>;
}

/// Encodes media inline as base64 `data:` URIs.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineMediaStore;

impl MediaStore for InlineMediaStore {
    fn store(&self, _path: &str, mime_type: &str, bytes: &[u8]) -> Result<StoredMedia> {
        Ok(StoredMedia {
            url: data_uri(mime_type, bytes),
            storage: MediaStorage::Inline,
        })
    }
}

/// Build a base64 `data:` URI.
pub fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Infer a MIME type from a part path's extension.
pub fn mime_from_path(path: &str) -> Option<&'static str> {
    let ext = path.rsplit_once('.').map(|(_, ext)| ext)?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        "ico" => "image/x-icon",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "wmv" => "video/x-ms-wmv",
        "avi" => "video/x-msvideo",
        "webm" => "video/webm",
        "mpg" | "mpeg" => "video/mpeg",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        _ => return None,
    };
    Some(mime)
}

/// Infer a MIME type from leading magic bytes.
pub fn mime_from_magic(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if bytes.starts_with(b"BM") {
        return Some("image/bmp");
    }
    if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return Some("image/tiff");
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        return Some("video/mp4");
    }
    if bytes.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A]) {
        return Some("image/x-wmf");
    }
    if bytes.len() >= 44 && bytes.starts_with(&[0x01, 0x00, 0x00, 0x00]) && &bytes[40..44] == b" EMF" {
        return Some("image/x-emf");
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    if head.contains("<svg") {
        return Some("image/svg+xml");
    }
    None
}
