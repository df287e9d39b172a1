//! Connectors and the shape position lookup their endpoints resolve against.

use super::shape::line_style;
use super::ParseContext;
use crate::normalize::{ElementKind, NormalizedElement};
use crate::xml::XmlNode;
use ppt_core::components::{Arrowhead, ConnectionRef, ConnectorData, LineStyle, Point};
use ppt_core::units::emu_to_pixels;
use ppt_core::{ComponentData, PowerPointComponent, Result};
use std::collections::HashMap;

/// Pixel bounds of a shape on the slide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl ShapeBox {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Connection site on the box. Sites 0-3 are the cardinal midpoints
    /// (top, left, bottom, right); any other index lands on the center.
    pub fn site(&self, index: u32) -> Point {
        let Point { x: cx, y: cy } = self.center();
        match index {
            0 => Point::new(cx, self.y),
            1 => Point::new(self.x, cy),
            2 => Point::new(cx, self.y + self.height),
            3 => Point::new(self.x + self.width, cy),
            _ => Point::new(cx, cy),
        }
    }
}

/// Shape id to pixel bounds for one slide.
#[derive(Debug, Clone, Default)]
pub struct ShapePositionMap {
    boxes: HashMap<u32, ShapeBox>,
}

impl ShapePositionMap {
    /// Collect the bounds of every non-connector element that has an id and a
    /// transform. Later elements win on duplicate ids.
    pub fn from_elements(elements: &[NormalizedElement]) -> Self {
        let boxes = elements
            .iter()
            .filter(|e| e.kind != ElementKind::Connection)
            .filter_map(|e| {
                let id = e.shape_id()?;
                let t = e.transform?;
                Some((
                    id,
                    ShapeBox {
                        x: emu_to_pixels(t.x),
                        y: emu_to_pixels(t.y),
                        width: emu_to_pixels(t.width),
                        height: emu_to_pixels(t.height),
                    },
                ))
            })
            .collect();
        Self { boxes }
    }

    pub fn get(&self, shape_id: u32) -> Option<&ShapeBox> {
        self.boxes.get(&shape_id)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

pub fn parse_connector(element: &NormalizedElement, ctx: &ParseContext<'_>) -> Result<Option<PowerPointComponent>> {
    let sp_pr = element.shape_properties();
    let connector_type = sp_pr
        .and_then(|s| s.child("prstGeom"))
        .and_then(|g| g.attr("prst"))
        .unwrap_or("line")
        .to_string();

    let geometry = ctx.geometry(element);
    let flip_h = element.transform.is_some_and(|t| t.flip_h);
    let flip_v = element.transform.is_some_and(|t| t.flip_v);
    let left = geometry.x;
    let right = geometry.x + geometry.width;
    let top = geometry.y;
    let bottom = geometry.y + geometry.height;
    let own_start = Point::new(if flip_h { right } else { left }, if flip_v { bottom } else { top });
    let own_end = Point::new(if flip_h { left } else { right }, if flip_v { top } else { bottom });

    let c_nv = element.non_visual().and_then(|nv| nv.child("cNvCxnSpPr"));
    let (start_point, start_connection) = endpoint(c_nv.and_then(|c| c.child("stCxn")), own_start, ctx);
    let (end_point, end_connection) = endpoint(c_nv.and_then(|c| c.child("endCxn")), own_end, ctx);

    let ln = sp_pr.and_then(|s| s.child("ln"));
    let ln_ref = element.node.find(&["style", "lnRef"]);
    let line = line_style(ln, ln_ref, ctx.theme).unwrap_or_else(default_line);

    let data = ConnectorData {
        routing: routing(&connector_type).to_string(),
        connector_type,
        start_point,
        end_point,
        line,
        start_arrow: ln.and_then(|l| l.child("headEnd")).and_then(arrowhead),
        end_arrow: ln.and_then(|l| l.child("tailEnd")).and_then(arrowhead),
        start_connection,
        end_connection,
    };
    Ok(Some(ctx.component(element, ComponentData::Connector(data))))
}

/// Resolve one `stCxn`/`endCxn` against the slide's shapes, falling back to
/// the connector's own bounds when the shape is unknown.
fn endpoint(cxn: Option<&XmlNode>, fallback: Point, ctx: &ParseContext<'_>) -> (Point, Option<ConnectionRef>) {
    let Some(cxn) = cxn else {
        return (fallback, None);
    };
    let Some(shape_id) = cxn.attr_u32_lenient("id") else {
        return (fallback, None);
    };
    let site_index = cxn.attr_u32_lenient("idx").unwrap_or(0);

    match ctx.positions.get(shape_id) {
        Some(bounds) => (
            bounds.site(site_index),
            Some(ConnectionRef {
                shape_id,
                site_index,
                resolved: true,
            }),
        ),
        None => {
            log::debug!("Connector target shape {} not on slide {}", shape_id, ctx.slide_index);
            (
                fallback,
                Some(ConnectionRef {
                    shape_id,
                    site_index,
                    resolved: false,
                }),
            )
        }
    }
}

fn default_line() -> LineStyle {
    LineStyle {
        width: super::shape::DEFAULT_LINE_WIDTH_PX,
        color: crate::theme::BLACK.to_string(),
        dash: "solid".to_string(),
        cap: "flat".to_string(),
    }
}

fn routing(connector_type: &str) -> &'static str {
    if connector_type.starts_with("bentConnector") {
        "elbow"
    } else if connector_type.starts_with("curvedConnector") {
        "curved"
    } else {
        "straight"
    }
}

fn arrowhead(end: &XmlNode) -> Option<Arrowhead> {
    let kind = end.attr("type").filter(|t| *t != "none")?;
    Some(Arrowhead {
        kind: kind.to_string(),
        width: end.attr("w").unwrap_or("med").to_string(),
        length: end.attr("len").unwrap_or("med").to_string(),
    })
}
