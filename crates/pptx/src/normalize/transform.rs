//! Element placement and group coordinate mapping.

use crate::xml::XmlNode;
use ppt_core::units::angle_to_degrees;
use ppt_core::{Error, Result};

/// Element placement in slide-space EMUs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    /// Clockwise, degrees.
    pub rotation: f64,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl Transform {
    /// Read an `a:xfrm`/`p:xfrm`. `Ok(None)` when it has no extent; an
    /// error when a present coordinate is not a number.
    pub fn from_xfrm(xfrm: &XmlNode) -> Result<Option<Self>> {
        let Some(ext) = xfrm.child("ext") else {
            return Ok(None);
        };
        let (x, y) = match xfrm.child("off") {
            Some(off) => (off.attr_i64("x")?.unwrap_or(0), off.attr_i64("y")?.unwrap_or(0)),
            None => (0, 0),
        };
        let width = ext.attr_i64("cx")?.unwrap_or(0);
        let height = ext.attr_i64("cy")?.unwrap_or(0);
        if width < 0 || height < 0 {
            return Err(Error::XmlError(format!("negative extent {}x{}", width, height)));
        }
        let rotation = xfrm.attr_i64("rot")?.map(angle_to_degrees).unwrap_or(0.0);

        Ok(Some(Self {
            x,
            y,
            width,
            height,
            rotation,
            flip_h: xfrm.attr_bool("flipH").unwrap_or(false),
            flip_v: xfrm.attr_bool("flipV").unwrap_or(false),
        }))
    }
}

/// Affine mapping from a group's child space to slide space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupMapping {
    scale_x: f64,
    scale_y: f64,
    offset_x: f64,
    offset_y: f64,
}

impl GroupMapping {
    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Mapping of a group `xfrm` carrying `off/ext` and `chOff/chExt`.
    pub fn from_group_xfrm(xfrm: &XmlNode) -> Result<Self> {
        let pair = |name: &str, a: &str, b: &str| -> Result<Option<(f64, f64)>> {
            match xfrm.child(name) {
                Some(node) => Ok(Some((
                    node.attr_i64(a)?.unwrap_or(0) as f64,
                    node.attr_i64(b)?.unwrap_or(0) as f64,
                ))),
                None => Ok(None),
            }
        };
        let (off_x, off_y) = pair("off", "x", "y")?.unwrap_or((0.0, 0.0));
        let ext = pair("ext", "cx", "cy")?;
        let ch_off = pair("chOff", "x", "y")?.unwrap_or((off_x, off_y));
        let ch_ext = pair("chExt", "cx", "cy")?;

        let scale = |ext: Option<f64>, ch: Option<f64>| match (ext, ch) {
            (Some(e), Some(c)) if c != 0.0 => e / c,
            _ => 1.0,
        };
        let scale_x = scale(ext.map(|e| e.0), ch_ext.map(|c| c.0));
        let scale_y = scale(ext.map(|e| e.1), ch_ext.map(|c| c.1));

        Ok(Self {
            scale_x,
            scale_y,
            offset_x: off_x - ch_off.0 * scale_x,
            offset_y: off_y - ch_off.1 * scale_y,
        })
    }

    /// Compose: apply `inner` first, then `self`.
    pub fn then(self, inner: GroupMapping) -> GroupMapping {
        GroupMapping {
            scale_x: inner.scale_x * self.scale_x,
            scale_y: inner.scale_y * self.scale_y,
            offset_x: inner.offset_x * self.scale_x + self.offset_x,
            offset_y: inner.offset_y * self.scale_y + self.offset_y,
        }
    }

    pub fn apply(&self, t: Transform) -> Transform {
        Transform {
            x: (t.x as f64 * self.scale_x + self.offset_x).round() as i64,
            y: (t.y as f64 * self.scale_y + self.offset_y).round() as i64,
            width: (t.width as f64 * self.scale_x).round() as i64,
            height: (t.height as f64 * self.scale_y).round() as i64,
            ..t
        }
    }
}
