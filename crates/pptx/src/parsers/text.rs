//! Text bodies: paragraphs, runs, bullets and the dominant style.

use super::ParseContext;
use crate::normalize::NormalizedElement;
use crate::rels::Relationships;
use crate::theme::{resolve_hex, ThemeContext, BLACK};
use crate::xml::XmlNode;
use ppt_core::components::TextData;
use ppt_core::rich_text::{RichList, RichParagraph, RichTextBlock, RichTextRun};
use ppt_core::units::font_size_to_points;
use ppt_core::{ComponentData, ComponentStyle, PowerPointComponent, Result, RichTextDocument};
use std::collections::BTreeMap;
use unicode_normalization::UnicodeNormalization;

pub const FALLBACK_FONT_FAMILY: &str = "Arial";
pub const FALLBACK_FONT_SIZE_PT: u32 = 18;

/// Texts shorter than this with a large font are treated as titles.
const TITLE_MAX_CHARS: usize = 100;
const TITLE_MIN_FONT_SIZE_PT: u32 = 18;

/// Upper bound of `a:buAutoNum@startAt`. Letter and roman labels are also
/// rendered from a number no larger than this.
pub const MAX_AUTONUM_START: u32 = 32_767;

/// Everything pulled out of one text body.
#[derive(Debug, Clone, PartialEq)]
pub struct TextExtraction {
    /// Plain text, one line per paragraph, bullets prefixed.
    pub content: String,
    pub rich_text: RichTextDocument,
    /// Dominant style of the body.
    pub style: ComponentStyle,
    /// Dominant font size in points.
    pub font_size: u32,
}

impl TextExtraction {
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Bullet {
    None,
    Char(String),
    Number { scheme: String, start: u32 },
}

#[derive(Debug)]
struct Paragraph {
    level: u32,
    alignment: Option<String>,
    bullet: Bullet,
    runs: Vec<RichTextRun>,
}

impl Paragraph {
    fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn has_text(&self) -> bool {
        self.runs.iter().any(|r| !r.text.trim().is_empty())
    }
}

pub fn parse_text(element: &NormalizedElement, ctx: &ParseContext<'_>) -> Result<Option<PowerPointComponent>> {
    let Some(body) = element.text_body() else {
        return Ok(None);
    };
    let rels = ctx.relationships(element);
    let extraction = extract_text(body, &element.list_styles, ctx.theme, Some(&rels));
    if extraction.is_empty() {
        log::debug!("Text element {:?} has no text", element.name());
        return Ok(None);
    }

    let by_placeholder = element.placeholder.as_ref().is_some_and(|p| p.is_title());
    let by_size = extraction.content.chars().count() < TITLE_MAX_CHARS && extraction.font_size > TITLE_MIN_FONT_SIZE_PT;

    let data = ComponentData::Text(TextData {
        is_title: by_placeholder || by_size,
        rich_text: extraction.rich_text,
    });
    Ok(Some(
        ctx.component(element, data)
            .with_content(extraction.content)
            .with_style(extraction.style),
    ))
}

/// Extract a `txBody`. `list_styles` run from nearest to farthest.
pub fn extract_text(
    body: &XmlNode,
    list_styles: &[XmlNode],
    theme: &ThemeContext,
    rels: Option<&Relationships>,
) -> TextExtraction {
    let mut paragraphs = Vec::new();
    let mut dominant: Option<RichTextRun> = None;

    for p in body.children_named("p") {
        let p_pr = p.child("pPr");
        let level = p_pr
            .and_then(|p| p.attr_u32_lenient("lvl"))
            .unwrap_or(0)
            .min(8);
        let level_props = level_properties(list_styles, level);
        let defaults: Vec<&XmlNode> = level_props.iter().filter_map(|l| l.child("defRPr")).collect();

        let mut runs = Vec::new();
        for child in &p.children {
            match child.local_name() {
                "r" | "fld" => {
                    let text: String = child.child("t").map(XmlNode::text_content).unwrap_or_default().nfc().collect();
                    let r_pr = child.child("rPr");
                    let run = build_run(text, r_pr, &defaults, theme, rels);
                    if dominant.is_none() && r_pr.is_some_and(has_explicit_formatting) && !run.text.trim().is_empty() {
                        dominant = Some(run.clone());
                    }
                    runs.push(run);
                }
                "br" => runs.push(RichTextRun::plain("\n")),
                _ => {}
            }
        }

        let alignment = p_pr
            .and_then(|p| p.attr("algn"))
            .or_else(|| level_props.iter().find_map(|l| l.attr("algn")))
            .map(alignment_name);

        paragraphs.push(Paragraph {
            level,
            alignment,
            bullet: resolve_bullet(p_pr, &level_props),
            runs,
        });
    }

    let first_level = paragraphs.iter().find(|p| p.has_text()).map(|p| p.level).unwrap_or(0);
    let dominant = dominant.unwrap_or_else(|| {
        let props = level_properties(list_styles, first_level);
        let defaults: Vec<&XmlNode> = props.iter().filter_map(|l| l.child("defRPr")).collect();
        build_run(String::new(), None, &defaults, theme, rels)
    });
    let font_size = dominant.font_size.unwrap_or(FALLBACK_FONT_SIZE_PT);

    let style = ComponentStyle {
        font_family: Some(dominant.font_family.clone().unwrap_or_else(|| FALLBACK_FONT_FAMILY.to_string())),
        font_size: Some(font_size),
        color: Some(dominant.color.clone().unwrap_or_else(|| BLACK.to_string())),
        bold: Some(dominant.bold),
        italic: Some(dominant.italic),
        underline: dominant.underline.then_some(true),
        strikethrough: dominant.strikethrough.then_some(true),
        text_align: paragraphs.iter().find(|p| p.has_text()).and_then(|p| p.alignment.clone()),
        vertical_align: body.child("bodyPr").and_then(|b| b.attr("anchor")).map(anchor_name),
        ..ComponentStyle::default()
    };

    TextExtraction {
        content: plain_content(&paragraphs),
        rich_text: rich_document(paragraphs),
        style,
        font_size,
    }
}

/// `lvlNpPr` for a 0-based level from every list style that has one.
fn level_properties(list_styles: &[XmlNode], level: u32) -> Vec<&XmlNode> {
    let name = format!("lvl{}pPr", level + 1);
    list_styles.iter().filter_map(|s| s.child(&name)).collect()
}

fn has_explicit_formatting(r_pr: &XmlNode) -> bool {
    ["sz", "b", "i", "u", "strike"].iter().any(|a| r_pr.attr(a).is_some())
        || r_pr.has_child("solidFill")
        || r_pr.has_child("latin")
}

fn build_run<'a>(
    text: String,
    r_pr: Option<&'a XmlNode>,
    defaults: &[&'a XmlNode],
    theme: &ThemeContext,
    rels: Option<&Relationships>,
) -> RichTextRun {
    let lookup = |name: &str| {
        r_pr.and_then(|r| r.attr(name))
            .or_else(|| defaults.iter().find_map(|d| d.attr(name)))
    };
    let flag = |name: &str| lookup(name).is_some_and(|v| matches!(v, "1" | "true"));
    let baseline = lookup("baseline").and_then(|v| v.parse::<i64>().ok()).unwrap_or(0);

    let color = r_pr
        .and_then(|r| r.child("solidFill"))
        .or_else(|| defaults.iter().find_map(|d| d.child("solidFill")))
        .and_then(|fill| resolve_hex(Some(fill), theme));
    let font_family = r_pr
        .and_then(|r| r.child("latin"))
        .or_else(|| defaults.iter().find_map(|d| d.child("latin")))
        .and_then(|latin| latin.attr("typeface"))
        .and_then(|t| theme.resolve_typeface(t));
    let link = r_pr
        .and_then(|r| r.child("hlinkClick"))
        .and_then(|h| h.attr_ns("id"))
        .and_then(|id| rels.and_then(|r| r.get(id)))
        .map(|rel| rel.target.clone());

    RichTextRun {
        text,
        bold: flag("b"),
        italic: flag("i"),
        underline: lookup("u").is_some_and(|u| u != "none"),
        strikethrough: lookup("strike").is_some_and(|s| s != "noStrike"),
        superscript: baseline > 0,
        subscript: baseline < 0,
        color,
        font_size: lookup("sz").map(|sz| font_size_to_points(Some(sz))),
        font_family,
        link,
    }
}

fn resolve_bullet<'a>(p_pr: Option<&'a XmlNode>, level_props: &[&'a XmlNode]) -> Bullet {
    std::iter::once(p_pr)
        .flatten()
        .chain(level_props.iter().copied())
        .find_map(bullet_of)
        .unwrap_or(Bullet::None)
}

fn bullet_of(props: &XmlNode) -> Option<Bullet> {
    for child in &props.children {
        match child.local_name() {
            "buNone" => return Some(Bullet::None),
            "buChar" => return Some(Bullet::Char(child.attr("char").unwrap_or("•").to_string())),
            "buBlip" => return Some(Bullet::Char("•".to_string())),
            "buAutoNum" => {
                return Some(Bullet::Number {
                    scheme: child.attr("type").unwrap_or("arabicPeriod").to_string(),
                    start: child
                        .attr_u32_lenient("startAt")
                        .unwrap_or(1)
                        .clamp(1, MAX_AUTONUM_START),
                })
            }
            _ => {}
        }
    }
    None
}

fn alignment_name(algn: &str) -> String {
    match algn {
        "l" => "left",
        "ctr" => "center",
        "r" => "right",
        "just" | "justLow" => "justify",
        "dist" | "thaiDist" => "distributed",
        other => other,
    }
    .to_string()
}

fn anchor_name(anchor: &str) -> String {
    match anchor {
        "t" => "top",
        "ctr" => "middle",
        "b" => "bottom",
        other => other,
    }
    .to_string()
}

/// Plain text with bullet and number prefixes.
fn plain_content(paragraphs: &[Paragraph]) -> String {
    let mut counters: BTreeMap<u32, (String, u32)> = BTreeMap::new();
    let mut lines = Vec::with_capacity(paragraphs.len());

    for p in paragraphs {
        let text = p.text();
        if !p.has_text() {
            lines.push(text);
            continue;
        }
        let prefix = match &p.bullet {
            Bullet::None => {
                counters.retain(|level, _| *level < p.level);
                String::new()
            }
            Bullet::Char(c) => {
                counters.retain(|level, _| *level < p.level);
                format!("{} ", c)
            }
            Bullet::Number { scheme, start } => {
                counters.retain(|level, _| *level <= p.level);
                let n = match counters.get(&p.level) {
                    Some((current, next)) if current == scheme => *next,
                    _ => *start,
                };
                counters.insert(p.level, (scheme.clone(), n.saturating_add(1)));
                format!("{} ", auto_number_label(scheme, n))
            }
        };
        lines.push(format!("{}{}", prefix, text));
    }

    lines.join("\n").trim_matches('\n').to_string()
}

/// Group paragraphs into paragraph and list blocks.
fn rich_document(paragraphs: Vec<Paragraph>) -> RichTextDocument {
    let mut blocks: Vec<RichTextBlock> = Vec::new();
    for p in paragraphs {
        if !p.has_text() {
            continue;
        }
        let ordered = match p.bullet {
            Bullet::None => None,
            Bullet::Char(_) => Some(false),
            Bullet::Number { .. } => Some(true),
        };
        let paragraph = RichParagraph {
            runs: p.runs,
            alignment: p.alignment,
            level: p.level,
        };
        match ordered {
            None => blocks.push(RichTextBlock::Paragraph(paragraph)),
            Some(ordered) => match blocks.last_mut() {
                Some(RichTextBlock::BulletList(list)) if list.ordered == ordered => list.items.push(paragraph),
                _ => blocks.push(RichTextBlock::BulletList(RichList {
                    ordered,
                    items: vec![paragraph],
                })),
            },
        }
    }
    RichTextDocument::new(blocks)
}

/// Render number `n` in an auto-numbering scheme such as `arabicPeriod`,
/// `alphaLcParenR` or `romanUcParenBoth`.
///
/// Letter and roman forms saturate at [`MAX_AUTONUM_START`].
pub fn auto_number_label(scheme: &str, n: u32) -> String {
    let bounded = n.min(MAX_AUTONUM_START);
    let body = if scheme.starts_with("alphaLc") {
        alpha(bounded).to_lowercase()
    } else if scheme.starts_with("alphaUc") {
        alpha(bounded)
    } else if scheme.starts_with("romanLc") {
        roman(bounded).to_lowercase()
    } else if scheme.starts_with("romanUc") {
        roman(bounded)
    } else {
        n.to_string()
    };

    if scheme.ends_with("ParenBoth") {
        format!("({})", body)
    } else if scheme.ends_with("ParenR") {
        format!("{})", body)
    } else if scheme.ends_with("Plain") {
        body
    } else {
        format!("{}.", body)
    }
}

/// A, B, ... Z, AA, BB, ...
fn alpha(n: u32) -> String {
    let n = n.max(1) - 1;
    let letter = char::from(b'A' + (n % 26) as u8);
    std::iter::repeat(letter).take((n / 26 + 1) as usize).collect()
}

fn roman(mut n: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if n == 0 {
        return "0".to_string();
    }
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}
