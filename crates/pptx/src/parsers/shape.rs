//! Preset and custom geometry shapes, plus the fill, line and effect
//! readers shared with tables and connectors.

use super::text::extract_text;
use super::ParseContext;
use crate::normalize::NormalizedElement;
use crate::theme::{resolve_color, ThemeContext, BLACK};
use crate::xml::XmlNode;
use ppt_core::components::{Fill, GradientStop, LineStyle, ShapeData, ShapeEffect, TextPayload};
use ppt_core::units::{angle_to_degrees, emu_to_pixels_f64, thousandths_to_percent};
use ppt_core::{ComponentData, ComponentStyle, PowerPointComponent, Result};

/// Stroke width when `a:ln` does not give one (0.75pt).
pub const DEFAULT_LINE_WIDTH_PX: f64 = 1.0;

pub fn parse_shape(element: &NormalizedElement, ctx: &ParseContext<'_>) -> Result<Option<PowerPointComponent>> {
    let sp_pr = element.shape_properties();
    let style_refs = element.node.child("style");

    let mut data = ShapeData::new(shape_type(sp_pr));
    data.fill = parse_fill(sp_pr, style_refs, ctx.theme);
    data.border = line_style(sp_pr.and_then(|s| s.child("ln")), style_refs.and_then(|s| s.child("lnRef")), ctx.theme);
    data.effects = sp_pr.map(|s| parse_effects(s, ctx.theme)).unwrap_or_default();

    let mut style = ComponentStyle {
        fill_color: data.fill.as_ref().and_then(Fill::primary_color).map(str::to_string),
        opacity: match &data.fill {
            Some(Fill::Solid { opacity, .. }) => *opacity,
            _ => None,
        },
        border_color: data.border.as_ref().map(|b| b.color.clone()),
        border_width: data.border.as_ref().map(|b| b.width),
        border_style: data.border.as_ref().map(|b| b.dash.clone()),
        ..ComponentStyle::default()
    };

    let mut content = None;
    if let Some(body) = element.text_body() {
        let rels = ctx.relationships(element);
        let text = extract_text(body, &element.list_styles, ctx.theme, Some(&rels));
        if !text.is_empty() {
            style.font_family = text.style.font_family.clone();
            style.font_size = text.style.font_size;
            style.color = text.style.color.clone();
            style.text_align = text.style.text_align.clone();
            style.vertical_align = text.style.vertical_align.clone();
            content = Some(text.content.clone());
            data.text = Some(TextPayload {
                content: text.content,
                rich_text: text.rich_text,
                style: text.style,
            });
        }
    }

    let mut component = ctx.component(element, ComponentData::Shape(data)).with_style(style);
    if let Some(content) = content {
        component = component.with_content(content);
    }
    Ok(Some(component))
}

fn shape_type(sp_pr: Option<&XmlNode>) -> String {
    match sp_pr {
        Some(sp_pr) if sp_pr.has_child("custGeom") => "custom".to_string(),
        Some(sp_pr) => sp_pr
            .child("prstGeom")
            .and_then(|g| g.attr("prst"))
            .unwrap_or("rect")
            .to_string(),
        None => "rect".to_string(),
    }
}

/// Fill of a shape: explicit `spPr` fill first, then the `fillRef` color
/// of the shape style.
pub fn parse_fill(sp_pr: Option<&XmlNode>, style_refs: Option<&XmlNode>, theme: &ThemeContext) -> Option<Fill> {
    if let Some(fill) = sp_pr.and_then(|s| fill_of(s, theme)) {
        return Some(fill);
    }
    let fill_ref = style_refs.and_then(|s| s.child("fillRef"))?;
    if fill_ref.attr_i64_lenient("idx").unwrap_or(0) <= 0 {
        return None;
    }
    resolve_color(fill_ref, theme).map(|c| Fill::Solid {
        color: c.hex,
        opacity: c.alpha,
    })
}

/// The first fill child of `container` (`spPr`, `tcPr`, `bgPr`, ...).
pub fn fill_of(container: &XmlNode, theme: &ThemeContext) -> Option<Fill> {
    container.children.iter().find_map(|child| match child.local_name() {
        "noFill" => Some(Fill::NoFill),
        "solidFill" => {
            let color = resolve_color(child, theme)?;
            Some(Fill::Solid {
                color: color.hex,
                opacity: color.alpha,
            })
        }
        "gradFill" => Some(gradient(child, theme)),
        "pattFill" => Some(Fill::Pattern {
            preset: child.attr("prst").unwrap_or("pct5").to_string(),
            foreground: child
                .child("fgClr")
                .and_then(|c| resolve_color(c, theme))
                .map(|c| c.hex)
                .unwrap_or_else(|| BLACK.to_string()),
            background: child
                .child("bgClr")
                .and_then(|c| resolve_color(c, theme))
                .map(|c| c.hex)
                .unwrap_or_else(|| "#FFFFFF".to_string()),
        }),
        "blipFill" => Some(Fill::Image),
        _ => None,
    })
}

fn gradient(grad: &XmlNode, theme: &ThemeContext) -> Fill {
    let mut stops: Vec<GradientStop> = grad
        .child("gsLst")
        .map(|list| {
            list.children_named("gs")
                .filter_map(|gs| {
                    let color = resolve_color(gs, theme)?;
                    Some(GradientStop {
                        position: thousandths_to_percent(gs.attr_i64_lenient("pos").unwrap_or(0)),
                        color: color.hex,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    stops.sort_by(|a, b| a.position.total_cmp(&b.position));

    Fill::Gradient {
        stops,
        angle: grad
            .child("lin")
            .and_then(|lin| lin.attr_i64_lenient("ang"))
            .map(angle_to_degrees),
    }
}

/// Resolve an outline. `None` when the line is explicitly hidden or there
/// is neither an `a:ln` nor a style `lnRef`.
pub fn line_style(ln: Option<&XmlNode>, ln_ref: Option<&XmlNode>, theme: &ThemeContext) -> Option<LineStyle> {
    let ln_ref = ln_ref.filter(|r| r.attr_i64_lenient("idx").unwrap_or(0) > 0);
    if ln.is_some_and(|l| l.has_child("noFill")) || (ln.is_none() && ln_ref.is_none()) {
        return None;
    }

    let explicit_color = ln.and_then(|l| {
        l.child("solidFill").and_then(|f| resolve_color(f, theme)).or_else(|| {
            l.find(&["gradFill", "gsLst", "gs"])
                .and_then(|gs| resolve_color(gs, theme))
        })
    });
    // An a:ln without a fill of its own or a style ref draws nothing.
    if explicit_color.is_none() && ln_ref.is_none() {
        return None;
    }
    let color = explicit_color
        .or_else(|| ln_ref.and_then(|r| resolve_color(r, theme)))
        .map(|c| c.hex)
        .unwrap_or_else(|| BLACK.to_string());

    Some(LineStyle {
        width: ln
            .and_then(|l| l.attr_i64_lenient("w"))
            .map(emu_to_pixels_f64)
            .unwrap_or(DEFAULT_LINE_WIDTH_PX),
        color,
        dash: ln
            .and_then(|l| l.child("prstDash"))
            .and_then(|d| d.attr("val"))
            .unwrap_or("solid")
            .to_string(),
        cap: cap_name(ln.and_then(|l| l.attr("cap"))),
    })
}

pub fn cap_name(cap: Option<&str>) -> String {
    match cap {
        Some("rnd") => "round",
        Some("sq") => "square",
        _ => "flat",
    }
    .to_string()
}

/// `effectLst` entries of a shape.
pub fn parse_effects(sp_pr: &XmlNode, theme: &ThemeContext) -> Vec<ShapeEffect> {
    let Some(list) = sp_pr.child("effectLst") else {
        return Vec::new();
    };
    let px = |node: &XmlNode, name: &str| node.attr_i64_lenient(name).map(emu_to_pixels_f64).unwrap_or(0.0);
    let color = |node: &XmlNode| {
        resolve_color(node, theme)
            .map(|c| c.hex)
            .unwrap_or_else(|| BLACK.to_string())
    };

    list.children
        .iter()
        .filter_map(|effect| match effect.local_name() {
            "outerShdw" | "innerShdw" => Some(ShapeEffect::Shadow {
                inner: effect.is("innerShdw"),
                color: color(effect),
                blur: px(effect, "blurRad"),
                distance: px(effect, "dist"),
                direction: effect.attr_i64_lenient("dir").map(angle_to_degrees).unwrap_or(0.0),
            }),
            "glow" => Some(ShapeEffect::Glow {
                color: color(effect),
                radius: px(effect, "rad"),
            }),
            "softEdge" => Some(ShapeEffect::SoftEdge {
                radius: px(effect, "rad"),
            }),
            "reflection" => Some(ShapeEffect::Reflection {
                blur: px(effect, "blurRad"),
                distance: px(effect, "dist"),
            }),
            _ => None,
        })
        .collect()
}
