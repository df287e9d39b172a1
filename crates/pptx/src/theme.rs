//! Theme context and color resolution.
//!
//! A [`ThemeContext`] is built once per parse from the document theme and
//! passed by reference to every parser that resolves colors. Nothing about
//! the theme outlives the parse call.

use crate::xml::XmlNode;
use std::collections::BTreeMap;

pub const BLACK: &str = "#000000";

/// Scheme colors used when the document has no theme (or the theme lacks an
/// entry).
pub const DEFAULT_PALETTE: [(&str, &str); 14] = [
    ("dk1", "#000000"),
    ("lt1", "#FFFFFF"),
    ("dk2", "#44546A"),
    ("lt2", "#E7E6E6"),
    ("accent1", "#4472C4"),
    ("accent2", "#ED7D31"),
    ("accent3", "#A5A5A5"),
    ("accent4", "#FFC000"),
    ("accent5", "#5B9BD5"),
    ("accent6", "#70AD47"),
    ("hlink", "#0563C1"),
    ("folHlink", "#954F72"),
    ("tx1", "#000000"),
    ("bg1", "#FFFFFF"),
];

const DEFAULT_COLOR_MAP: [(&str, &str); 4] = [("bg1", "lt1"), ("tx1", "dk1"), ("bg2", "lt2"), ("tx2", "dk2")];

const PRESET_COLORS: [(&str, &str); 16] = [
    ("black", "#000000"),
    ("white", "#FFFFFF"),
    ("red", "#FF0000"),
    ("green", "#008000"),
    ("lime", "#00FF00"),
    ("blue", "#0000FF"),
    ("yellow", "#FFFF00"),
    ("cyan", "#00FFFF"),
    ("magenta", "#FF00FF"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("silver", "#C0C0C0"),
    ("maroon", "#800000"),
    ("navy", "#000080"),
    ("orange", "#FFA500"),
    ("purple", "#800080"),
];

/// Color element names in resolution precedence.
const COLOR_ELEMENTS: [&str; 6] = ["srgbClr", "sysClr", "schemeClr", "prstClr", "scrgbClr", "hslClr"];

/// Per-parse theme state: scheme colors, color map and theme fonts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeContext {
    colors: BTreeMap<String, String>,
    color_map: BTreeMap<String, String>,
    major_font: Option<String>,
    minor_font: Option<String>,
}

impl ThemeContext {
    /// Build from a parsed `a:theme` part. An empty node yields the
    /// default palette.
    pub fn from_theme(theme: &XmlNode) -> Self {
        let mut ctx = Self::default();
        let Some(elements) = theme.child("themeElements") else {
            return ctx;
        };

        if let Some(scheme) = elements.child("clrScheme") {
            for entry in &scheme.children {
                let value = entry
                    .child("srgbClr")
                    .and_then(|c| c.attr("val"))
                    .and_then(normalize_hex)
                    .or_else(|| entry.child("sysClr").and_then(|c| c.attr("lastClr")).and_then(normalize_hex));
                if let Some(hex) = value {
                    ctx.colors.insert(entry.local_name().to_string(), hex);
                }
            }
        }

        if let Some(fonts) = elements.child("fontScheme") {
            ctx.major_font = fonts
                .find(&["majorFont", "latin"])
                .and_then(|l| l.attr("typeface"))
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            ctx.minor_font = fonts
                .find(&["minorFont", "latin"])
                .and_then(|l| l.attr("typeface"))
                .filter(|t| !t.is_empty())
                .map(str::to_string);
        }

        ctx
    }

    /// Apply a master `p:clrMap` (`bg1="lt1" tx1="dk1" ...`).
    pub fn with_color_map(mut self, clr_map: Option<&XmlNode>) -> Self {
        if let Some(map) = clr_map {
            for (key, value) in &map.attributes {
                if !key.contains(':') {
                    self.color_map.insert(key.clone(), value.clone());
                }
            }
        }
        self
    }

    /// Resolve a scheme color name to hex: color map alias, then the theme,
    /// then the default palette, then black.
    pub fn scheme_color(&self, name: &str) -> String {
        let mapped = self
            .color_map
            .get(name)
            .map(String::as_str)
            .or_else(|| DEFAULT_COLOR_MAP.iter().find(|(k, _)| *k == name).map(|(_, v)| *v))
            .unwrap_or(name);

        self.colors
            .get(mapped)
            .or_else(|| self.colors.get(name))
            .cloned()
            .or_else(|| palette_lookup(mapped).or_else(|| palette_lookup(name)).map(str::to_string))
            .unwrap_or_else(|| BLACK.to_string())
    }

    /// Resolve theme font references (`+mj-lt`, `+mn-ea`, ...).
    pub fn resolve_typeface(&self, typeface: &str) -> Option<String> {
        if typeface.starts_with("+mj-") {
            return self.major_font.clone();
        }
        if typeface.starts_with("+mn-") {
            return self.minor_font.clone();
        }
        (!typeface.is_empty()).then(|| typeface.to_string())
    }

    pub fn major_font(&self) -> Option<&str> {
        self.major_font.as_deref()
    }

    pub fn minor_font(&self) -> Option<&str> {
        self.minor_font.as_deref()
    }
}

fn palette_lookup(name: &str) -> Option<&'static str> {
    DEFAULT_PALETTE.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
}

/// A resolved color with optional opacity (0.0-1.0).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColor {
    pub hex: String,
    pub alpha: Option<f64>,
}

/// Resolve the color held by `container` (a `solidFill`, `fontRef`,
/// gradient stop, ...). `None` when the container holds no color element.
pub fn resolve_color(container: &XmlNode, theme: &ThemeContext) -> Option<ResolvedColor> {
    let element = COLOR_ELEMENTS.iter().find_map(|name| container.child(name))?;
    Some(resolve_color_element(element, theme))
}

/// Hex of the color held by `container`, if any.
pub fn resolve_hex(container: Option<&XmlNode>, theme: &ThemeContext) -> Option<String> {
    container.and_then(|c| resolve_color(c, theme)).map(|c| c.hex)
}

/// Resolve one color element, falling back to black when it is unusable.
pub fn resolve_color_element(element: &XmlNode, theme: &ThemeContext) -> ResolvedColor {
    let base = match element.local_name() {
        "srgbClr" => element.attr("val").and_then(normalize_hex),
        "sysClr" => element
            .attr("lastClr")
            .and_then(normalize_hex)
            .or_else(|| system_color(element.attr("val").unwrap_or_default())),
        "schemeClr" => element.attr("val").map(|v| theme.scheme_color(v)),
        "prstClr" => element.attr("val").and_then(|v| {
            PRESET_COLORS
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(v))
                .map(|(_, hex)| hex.to_string())
        }),
        "scrgbClr" => {
            let channel = |name: &str| {
                element
                    .attr_i64_lenient(name)
                    .map(|v| ((v as f64 / 100_000.0).clamp(0.0, 1.0) * 255.0).round() as u8)
            };
            match (channel("r"), channel("g"), channel("b")) {
                (Some(r), Some(g), Some(b)) => Some(to_hex(r, g, b)),
                _ => None,
            }
        }
        "hslClr" => {
            let hue = element.attr_i64_lenient("hue").unwrap_or(0) as f64 / 60_000.0;
            let sat = element.attr_i64_lenient("sat").unwrap_or(0) as f64 / 100_000.0;
            let lum = element.attr_i64_lenient("lum").unwrap_or(0) as f64 / 100_000.0;
            let (r, g, b) = hsl_to_rgb(hue, sat, lum);
            Some(to_hex(r, g, b))
        }
        _ => None,
    };

    let hex = base.unwrap_or_else(|| BLACK.to_string());
    apply_modifiers(&hex, element)
}

fn system_color(val: &str) -> Option<String> {
    let hex = match val {
        "windowText" | "menuText" | "captionText" | "btnText" => "#000000",
        "window" | "menu" | "btnHighlight" => "#FFFFFF",
        "btnFace" | "3dLight" => "#F0F0F0",
        "grayText" | "btnShadow" => "#808080",
        "highlight" => "#0078D7",
        "highlightText" => "#FFFFFF",
        _ => return None,
    };
    Some(hex.to_string())
}

/// Apply `lumMod`, `lumOff`, `tint`, `shade` and `alpha` children.
fn apply_modifiers(hex: &str, element: &XmlNode) -> ResolvedColor {
    let Some((mut r, mut g, mut b)) = parse_hex(hex) else {
        return ResolvedColor {
            hex: hex.to_string(),
            alpha: None,
        };
    };
    let mut alpha = None;

    let fraction = |node: &XmlNode| node.attr_i64_lenient("val").map(|v| v as f64 / 100_000.0);

    for modifier in &element.children {
        match modifier.local_name() {
            "lumMod" | "lumOff" => {
                let Some(amount) = fraction(modifier) else { continue };
                let (h, s, mut l) = rgb_to_hsl(r, g, b);
                if modifier.is("lumMod") {
                    l *= amount;
                } else {
                    l += amount;
                }
                (r, g, b) = hsl_to_rgb(h, s, l.clamp(0.0, 1.0));
            }
            "tint" => {
                let Some(amount) = fraction(modifier) else { continue };
                let tint = |c: u8| (c as f64 * amount + 255.0 * (1.0 - amount)).round().clamp(0.0, 255.0) as u8;
                (r, g, b) = (tint(r), tint(g), tint(b));
            }
            "shade" => {
                let Some(amount) = fraction(modifier) else { continue };
                let shade = |c: u8| (c as f64 * amount).round().clamp(0.0, 255.0) as u8;
                (r, g, b) = (shade(r), shade(g), shade(b));
            }
            "alpha" => {
                alpha = fraction(modifier).map(|a| (a.clamp(0.0, 1.0) * 100.0).round() / 100.0);
            }
            _ => {}
        }
    }

    ResolvedColor {
        hex: to_hex(r, g, b),
        alpha,
    }
}

/// Validate and canonicalize a 6-digit hex value to `#RRGGBB`.
pub fn normalize_hex(raw: &str) -> Option<String> {
    let raw = raw.trim().trim_start_matches('#');
    (raw.len() == 6 && raw.chars().all(|c| c.is_ascii_hexdigit())).then(|| format!("#{}", raw.to_ascii_uppercase()))
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let raw = hex.trim_start_matches('#');
    if raw.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&raw[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h * 60.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s <= 0.0 {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let h = (h / 360.0).rem_euclid(1.0);
    let channel = |mut t: f64| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };
    (channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}
