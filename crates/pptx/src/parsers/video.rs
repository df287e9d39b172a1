//! Videos: linked files, online videos and embedded media parts.

use super::ParseContext;
use crate::normalize::NormalizedElement;
use ppt_core::components::{VideoData, VideoProvider};
use ppt_core::media::mime_from_path;
use ppt_core::{ComponentData, Error, PowerPointComponent, Result};
use regex::Regex;
use std::sync::LazyLock;

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/(?:watch\?(?:.*&)?v=|embed/|v/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})").unwrap()
});
static VIMEO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"vimeo\.com/(?:video/)?(\d+)").unwrap());

/// Provider, video id and player URL recognized from a video URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMatch {
    pub provider: VideoProvider,
    pub video_id: Option<String>,
    pub embed_url: Option<String>,
}

/// Recognize YouTube and Vimeo URLs; anything else is generic.
pub fn detect_provider(url: &str) -> ProviderMatch {
    if let Some(caps) = YOUTUBE_RE.captures(url) {
        let id = caps[1].to_string();
        return ProviderMatch {
            provider: VideoProvider::YouTube,
            embed_url: Some(format!("https://www.youtube.com/embed/{}", id)),
            video_id: Some(id),
        };
    }
    if let Some(caps) = VIMEO_RE.captures(url) {
        let id = caps[1].to_string();
        return ProviderMatch {
            provider: VideoProvider::Vimeo,
            embed_url: Some(format!("https://player.vimeo.com/video/{}", id)),
            video_id: Some(id),
        };
    }
    ProviderMatch {
        provider: VideoProvider::Generic,
        video_id: None,
        embed_url: None,
    }
}

pub fn parse_video(element: &NormalizedElement, ctx: &ParseContext<'_>) -> Result<Option<PowerPointComponent>> {
    let Some(nv_pr) = element.nv_pr() else {
        return Ok(None);
    };
    let rels = ctx.relationships(element);

    // The p14:media part wins over the videoFile link when both exist.
    let embedded = nv_pr
        .child("extLst")
        .and_then(|ext| ext.children_named("ext").find_map(|e| e.child("media")))
        .and_then(|media| media.attr_ns("embed"));
    let linked = nv_pr
        .child("videoFile")
        .or_else(|| nv_pr.child("quickTimeFile"))
        .and_then(|v| v.attr_ns("link"));

    let mut data = if let Some(rel_id) = embedded {
        let media = ctx.store_media(element, rel_id)?;
        VideoData {
            url: media.stored.url,
            provider: VideoProvider::Generic,
            is_embedded: true,
            embed_url: None,
            video_id: None,
            thumbnail: None,
            mime_type: Some(media.mime_type),
        }
    } else if let Some(rel_id) = linked {
        let rel = rels
            .get(rel_id)
            .ok_or_else(|| Error::ElementParse(format!("video relationship '{}' not found", rel_id)))?;
        if rel.external {
            let detected = detect_provider(&rel.target);
            VideoData {
                url: rel.target.clone(),
                provider: detected.provider,
                is_embedded: false,
                embed_url: detected.embed_url,
                video_id: detected.video_id,
                thumbnail: None,
                mime_type: mime_from_path(&rel.target).map(str::to_string),
            }
        } else {
            let media = ctx.store_media(element, rel_id)?;
            VideoData {
                url: media.stored.url,
                provider: VideoProvider::Generic,
                is_embedded: true,
                embed_url: None,
                video_id: None,
                thumbnail: None,
                mime_type: Some(media.mime_type),
            }
        }
    } else {
        log::debug!("Video {:?} has no media reference", element.name());
        return Ok(None);
    };

    // A broken poster frame does not lose the video.
    data.thumbnail = element
        .node
        .find(&["blipFill", "blip"])
        .and_then(|blip| blip.attr_ns("embed"))
        .and_then(|rel_id| match ctx.store_media(element, rel_id) {
            Ok(media) => Some(media.stored.url),
            Err(e) => {
                log::debug!("No poster frame for video {:?}: {}", element.name(), e);
                None
            }
        });

    Ok(Some(ctx.component(element, ComponentData::Video(data))))
}
