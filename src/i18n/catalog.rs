//! Per-language translation catalog.
//!
//! A catalog is a tree of string segments ending in leaf strings, addressed by
//! dotted keys such as `nav.services`. Lookup walks the tree one segment at a
//! time; any step that lands on the wrong kind of node is a miss, so there is
//! no separate "is this an object" probe anywhere.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Separator between key segments.
pub const KEY_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogNode {
    Leaf(String),
    Branch(BTreeMap<String, CatalogNode>),
}

/// The JSON document was valid but is not shaped like a catalog.
#[derive(Debug, Error)]
#[error("catalog root must be a JSON object, found {found}")]
pub struct CatalogShapeError {
    found: &'static str,
}

/// Translation catalog for one language.
///
/// Catalogs are never edited once built; a reload produces a new one that
/// replaces the old one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Catalog {
    root: BTreeMap<String, CatalogNode>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw catalog document (no response envelope).
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build a nested catalog from flat `(dotted_key, value)` rows, the shape
    /// translations are stored in on the admin side.
    ///
    /// Rows with an empty segment are skipped. When two rows collide (one key is
    /// a prefix of another) the later row wins.
    pub fn from_flat_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut catalog = Catalog::new();
        for (key, value) in entries {
            catalog.insert_path(key.as_ref(), value.into());
        }
        catalog
    }

    fn insert_path(&mut self, key: &str, value: String) {
        let segments: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            debug!("Skipping translation row with malformed key '{}'", key);
            return;
        }
        let Some((leaf, parents)) = segments.split_last() else {
            return;
        };

        let mut branch = &mut self.root;
        for segment in parents {
            let node = branch
                .entry((*segment).to_string())
                .or_insert_with(|| CatalogNode::Branch(BTreeMap::new()));
            if matches!(node, CatalogNode::Leaf(_)) {
                *node = CatalogNode::Branch(BTreeMap::new());
            }
            let CatalogNode::Branch(children) = node else {
                return;
            };
            branch = children;
        }
        branch.insert((*leaf).to_string(), CatalogNode::Leaf(value));
    }

    /// Resolve a dotted key to its string.
    ///
    /// Returns `None` (a miss) when any segment is absent or empty, when a
    /// segment lands on a leaf before the key is exhausted, when the key ends on
    /// a branch, or when the leaf is an empty string.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let segments: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        descend(&self.root, &segments)
    }

    /// Every leaf as `(dotted_key, value)`, sorted by key.
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, "", &mut out);
        out
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        count_leaves(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn descend<'a>(branch: &'a BTreeMap<String, CatalogNode>, segments: &[&str]) -> Option<&'a str> {
    let (head, rest) = segments.split_first()?;
    if head.is_empty() {
        return None;
    }

    match (branch.get(*head)?, rest.is_empty()) {
        (CatalogNode::Leaf(value), true) if !value.is_empty() => Some(value.as_str()),
        (CatalogNode::Branch(children), false) => descend(children, rest),
        _ => None,
    }
}

fn collect_leaves(branch: &BTreeMap<String, CatalogNode>, prefix: &str, out: &mut Vec<(String, String)>) {
    for (segment, node) in branch {
        let key = if prefix.is_empty() {
            segment.clone()
        } else {
            format!("{}{}{}", prefix, KEY_SEPARATOR, segment)
        };
        match node {
            CatalogNode::Leaf(value) => out.push((key, value.clone())),
            CatalogNode::Branch(children) => collect_leaves(children, &key, out),
        }
    }
}

fn count_leaves(branch: &BTreeMap<String, CatalogNode>) -> usize {
    branch
        .values()
        .map(|node| match node {
            CatalogNode::Leaf(_) => 1,
            CatalogNode::Branch(children) => count_leaves(children),
        })
        .sum()
}

/// Convert one JSON value. Nulls and arrays can never resolve to a string, so
/// they are dropped instead of being kept as dead nodes.
fn node_from_value(value: Value) -> Option<CatalogNode> {
    match value {
        Value::String(text) => Some(CatalogNode::Leaf(text)),
        Value::Number(number) => Some(CatalogNode::Leaf(number.to_string())),
        Value::Bool(flag) => Some(CatalogNode::Leaf(flag.to_string())),
        Value::Object(map) => Some(CatalogNode::Branch(branch_from_map(map))),
        Value::Null | Value::Array(_) => None,
    }
}

fn branch_from_map(map: serde_json::Map<String, Value>) -> BTreeMap<String, CatalogNode> {
    map.into_iter()
        .filter_map(|(key, value)| node_from_value(value).map(|node| (key, node)))
        .collect()
}

impl TryFrom<Value> for Catalog {
    type Error = CatalogShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let found = match value {
            Value::Object(map) => {
                return Ok(Catalog {
                    root: branch_from_map(map),
                })
            }
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
        };
        Err(CatalogShapeError { found })
    }
}
