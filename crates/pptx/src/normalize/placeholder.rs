//! Placeholder identity and inheritance lookups.

use super::{NormalizedElement, Transform};
use crate::xml::XmlNode;

/// A `p:ph` reference: placeholder type and index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRef {
    /// `type` attribute; `obj` when absent.
    pub kind: String,
    pub idx: Option<u32>,
}

impl PlaceholderRef {
    /// Read `nv*Pr/nvPr/ph` from a drawing element.
    pub fn from_element(node: &XmlNode) -> Option<Self> {
        let ph = node
            .children
            .iter()
            .find(|c| c.local_name().starts_with("nv") && c.local_name().ends_with("Pr"))
            .and_then(|nv| nv.child("nvPr"))
            .and_then(|nv_pr| nv_pr.child("ph"))?;
        Some(Self {
            kind: ph.attr("type").unwrap_or("obj").to_string(),
            idx: ph.attr_u32_lenient("idx"),
        })
    }

    pub fn is_title(&self) -> bool {
        matches!(self.kind.as_str(), "title" | "ctrTitle")
    }

    /// Coarse grouping used when no exact match exists.
    fn family(&self) -> &str {
        match self.kind.as_str() {
            "title" | "ctrTitle" => "title",
            "body" | "subTitle" | "obj" => "body",
            other => other,
        }
    }

    /// Which master text style applies (`titleStyle`, `bodyStyle`, `otherStyle`).
    pub fn master_text_style(&self) -> &'static str {
        match self.family() {
            "title" => "titleStyle",
            "body" => "bodyStyle",
            _ => "otherStyle",
        }
    }
}

/// Find the placeholder in `candidates` that `wanted` inherits from.
///
/// An indexed placeholder binds to the candidate with the same index, or
/// failing that to an unindexed candidate of the same type. Unindexed
/// placeholders match by type, then by type family.
pub(crate) fn find_match<'a>(wanted: &PlaceholderRef, candidates: &'a [NormalizedElement]) -> Option<&'a NormalizedElement> {
    let with_ph = move || candidates.iter().filter_map(|c| c.placeholder.as_ref().map(|ph| (c, ph)));

    if let Some(idx) = wanted.idx {
        if let Some((el, _)) = with_ph().find(|(_, ph)| ph.idx == Some(idx) && ph.family() == wanted.family()) {
            return Some(el);
        }
        if let Some((el, _)) = with_ph().find(|(_, ph)| ph.idx == Some(idx)) {
            return Some(el);
        }
        return with_ph()
            .find(|(_, ph)| ph.idx.is_none() && ph.kind == wanted.kind)
            .map(|(el, _)| el);
    }
    if let Some((el, _)) = with_ph().find(|(_, ph)| ph.kind == wanted.kind) {
        return Some(el);
    }
    with_ph().find(|(_, ph)| ph.family() == wanted.family()).map(|(el, _)| el)
}

/// Inherited placement and list styles for a placeholder.
#[derive(Debug, Default)]
pub(crate) struct Inherited {
    pub transform: Option<Transform>,
    pub list_styles: Vec<XmlNode>,
}

/// Resolve the slide → layout → master chain for one placeholder.
pub(crate) fn resolve_inheritance(
    wanted: &PlaceholderRef,
    layout: &[NormalizedElement],
    master: &[NormalizedElement],
    master_text_styles: Option<&XmlNode>,
) -> Inherited {
    let mut inherited = Inherited::default();

    let layout_match = find_match(wanted, layout);
    // The master is matched by the layout placeholder's type when there is one.
    let master_key = layout_match.and_then(|l| l.placeholder.as_ref()).unwrap_or(wanted);
    let master_match = find_match(&PlaceholderRef { kind: master_key.kind.clone(), idx: None }, master);

    if let Some(layout_el) = layout_match {
        inherited.transform = layout_el.transform;
        inherited.list_styles.extend(layout_el.list_styles.iter().cloned());
    }
    if let Some(master_el) = master_match {
        if inherited.transform.is_none() {
            inherited.transform = master_el.transform;
        }
        inherited.list_styles.extend(master_el.list_styles.iter().cloned());
    }
    if let Some(style) = master_text_styles.and_then(|s| s.child(wanted.master_text_style())) {
        inherited.list_styles.push(style.clone());
    }

    inherited
}
