//! Pictures.

use super::ParseContext;
use crate::normalize::NormalizedElement;
use crate::theme::{resolve_color_element, ThemeContext};
use crate::xml::XmlNode;
use ppt_core::components::{Crop, ImageData, ImageEffect};
use ppt_core::media::mime_from_path;
use ppt_core::units::thousandths_to_percent;
use ppt_core::{ComponentData, Error, MediaStorage, PowerPointComponent, Result};

pub fn parse_image(element: &NormalizedElement, ctx: &ParseContext<'_>) -> Result<Option<PowerPointComponent>> {
    let Some(blip_fill) = element.node.child("blipFill") else {
        log::debug!("Picture {:?} has no blipFill", element.name());
        return Ok(None);
    };
    let Some(blip) = blip_fill.child("blip") else {
        return Ok(None);
    };

    let mut data = if let Some(embed) = blip.attr_ns("embed") {
        let media = ctx.store_media(element, embed)?;
        ImageData {
            src: media.stored.url,
            storage: media.stored.storage,
            mime_type: media.mime_type,
            media_path: media.path,
            size_bytes: media.size_bytes,
            alt_text: None,
            title: None,
            crop: None,
            effects: Vec::new(),
        }
    } else if let Some(link) = blip.attr_ns("link") {
        let rels = ctx.relationships(element);
        let rel = rels
            .get(link)
            .ok_or_else(|| Error::ElementParse(format!("linked picture relationship '{}' not found", link)))?;
        ImageData {
            src: rel.target.clone(),
            storage: MediaStorage::Reference,
            mime_type: mime_from_path(&rel.target).unwrap_or("application/octet-stream").to_string(),
            media_path: rel.target.clone(),
            size_bytes: 0,
            alt_text: None,
            title: None,
            crop: None,
            effects: Vec::new(),
        }
    } else {
        log::debug!("Picture {:?} has a blip without a reference", element.name());
        return Ok(None);
    };

    let c_nv_pr = element.c_nv_pr();
    data.alt_text = c_nv_pr.and_then(|c| c.attr("descr")).filter(|d| !d.is_empty()).map(str::to_string);
    data.title = c_nv_pr.and_then(|c| c.attr("title")).filter(|t| !t.is_empty()).map(str::to_string);
    data.crop = blip_fill.child("srcRect").and_then(crop);
    data.effects = blip_effects(blip, ctx.theme);

    Ok(Some(ctx.component(element, ComponentData::Image(data))))
}

/// `a:srcRect` as percentages; `None` when nothing is cropped.
fn crop(src_rect: &XmlNode) -> Option<Crop> {
    let edge = |name: &str| thousandths_to_percent(src_rect.attr_i64_lenient(name).unwrap_or(0));
    let crop = Crop {
        left: edge("l"),
        top: edge("t"),
        right: edge("r"),
        bottom: edge("b"),
    };
    (crop != Crop::default()).then_some(crop)
}

fn blip_effects(blip: &XmlNode, theme: &ThemeContext) -> Vec<ImageEffect> {
    let percent = |node: &XmlNode, name: &str| thousandths_to_percent(node.attr_i64_lenient(name).unwrap_or(0));

    blip.children
        .iter()
        .filter_map(|effect| match effect.local_name() {
            "grayscl" => Some(ImageEffect::Grayscale),
            "biLevel" => Some(ImageEffect::BiLevel {
                threshold: percent(effect, "thresh"),
            }),
            "alphaModFix" => Some(ImageEffect::Alpha {
                amount: effect
                    .attr_i64_lenient("amt")
                    .map(thousandths_to_percent)
                    .unwrap_or(100.0),
            }),
            "lum" => Some(ImageEffect::Luminance {
                brightness: percent(effect, "bright"),
                contrast: percent(effect, "contrast"),
            }),
            "duotone" => Some(ImageEffect::Duotone {
                colors: effect
                    .children
                    .iter()
                    .map(|c| resolve_color_element(c, theme).hex)
                    .collect(),
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Package;
    use crate::fixtures::PptxBuilder;
    use crate::normalize::normalize;
    use crate::options::ParseOptions;
    use crate::parsers::ShapePositionMap;
    use ppt_core::PresentationFormat;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn parse_first(builder: PptxBuilder) -> Result<Option<PowerPointComponent>> {
        let package = Package::from_bytes(&builder.build()).unwrap().unwrap();
        let options = ParseOptions::default();
        let doc = normalize(&package, PresentationFormat::Pptx, &options).unwrap();
        let positions = ShapePositionMap::default();
        let ctx = ParseContext {
            package: &package,
            theme: &doc.slides[0].theme,
            options: &options,
            slide_index: 0,
            positions: &positions,
        };
        parse_image(&doc.slides[0].elements[0], &ctx)
    }

    const PICTURE: &str = r#"<p:pic><p:nvPicPr><p:cNvPr id="4" name="Picture 3" descr="A red square" title="Logo"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"><a:grayscl/><a:lum bright="20000" contrast="-10000"/></a:blip><a:srcRect l="10000" r="5000"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="952500" cy="952500"/></a:xfrm><a:prstGeom prst="rect"/></p:spPr></p:pic>"#;

    #[test]
    fn test_embedded_picture_is_inlined() {
        let component = parse_first(
            PptxBuilder::new()
                .slide(PICTURE)
                .slide_rel("rId2", "image", "../media/image1.png", false)
                .media("ppt/media/image1.png", PNG),
        )
        .unwrap()
        .unwrap();

        let ComponentData::Image(image) = &component.data else {
            panic!("expected image");
        };
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.storage, MediaStorage::Inline);
        assert!(image.src.starts_with("data:image/png;base64,"));
        assert_eq!(image.media_path, "ppt/media/image1.png");
        assert_eq!(image.size_bytes, PNG.len());
        assert_eq!(image.alt_text.as_deref(), Some("A red square"));
        assert_eq!(image.title.as_deref(), Some("Logo"));
        assert_eq!(
            image.crop,
            Some(Crop {
                left: 10.0,
                top: 0.0,
                right: 5.0,
                bottom: 0.0
            })
        );
        assert_eq!(
            image.effects,
            vec![
                ImageEffect::Grayscale,
                ImageEffect::Luminance {
                    brightness: 20.0,
                    contrast: -10.0
                }
            ]
        );
        assert_eq!((component.width, component.height), (100, 100));
    }

    #[test]
    fn test_mime_from_magic_when_extension_is_unknown() {
        let component = parse_first(
            PptxBuilder::new()
                .slide(PICTURE)
                .slide_rel("rId2", "image", "../media/image1.bin", false)
                .media("ppt/media/image1.bin", PNG),
        )
        .unwrap()
        .unwrap();
        let ComponentData::Image(image) = &component.data else {
            panic!("expected image");
        };
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_missing_media_is_element_error() {
        let err = parse_first(PptxBuilder::new().slide(PICTURE)).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_linked_picture_is_a_reference() {
        let linked = PICTURE.replace(r#"r:embed="rId2""#, r#"r:link="rId3""#);
        let component = parse_first(
            PptxBuilder::new()
                .slide(&linked)
                .slide_rel("rId3", "image", "https://example.com/logo.jpg", true),
        )
        .unwrap()
        .unwrap();
        let ComponentData::Image(image) = &component.data else {
            panic!("expected image");
        };
        assert_eq!(image.storage, MediaStorage::Reference);
        assert_eq!(image.src, "https://example.com/logo.jpg");
        assert_eq!(image.mime_type, "image/jpeg");
    }
}
