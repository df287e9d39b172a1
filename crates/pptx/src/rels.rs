//! Part relationship tables (`_rels/*.rels`).

use crate::xml::XmlNode;
use std::collections::BTreeMap;

pub const REL_SLIDE: &str = "/slide";
pub const REL_SLIDE_LAYOUT: &str = "/slideLayout";
pub const REL_SLIDE_MASTER: &str = "/slideMaster";
pub const REL_THEME: &str = "/theme";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Absolute part path for internal targets, the raw URL for external ones.
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type URI ends with `suffix` (`/slideLayout`).
    pub fn is_type(&self, suffix: &str) -> bool {
        self.rel_type.ends_with(suffix)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Relationships {
    by_id: BTreeMap<String, Relationship>,
}

impl Relationships {
    /// Build the table for `owner_part` from its parsed `.rels` node.
    pub fn from_node(owner_part: &str, node: &XmlNode) -> Self {
        let base_dir = owner_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        let mut by_id = BTreeMap::new();

        for rel in node.children_named("Relationship") {
            let (Some(id), Some(target)) = (rel.attr("Id"), rel.attr("Target")) else {
                log::debug!("Relationship in rels of '{}' lacks Id or Target", owner_part);
                continue;
            };
            let external = rel.attr("TargetMode").is_some_and(|m| m.eq_ignore_ascii_case("External"));
            let target = if external {
                target.to_string()
            } else {
                resolve_target(base_dir, target)
            };
            by_id.insert(
                id.to_string(),
                Relationship {
                    id: id.to_string(),
                    rel_type: rel.attr("Type").unwrap_or_default().to_string(),
                    target,
                    external,
                },
            );
        }

        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    /// First relationship of the given type.
    pub fn first_of_type(&self, suffix: &str) -> Option<&Relationship> {
        self.by_id.values().find(|r| r.is_type(suffix))
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}

/// Resolve a relative target against the owning part's directory.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
