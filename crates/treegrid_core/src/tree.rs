//! Derived hierarchy views over the flat record collection.
//!
//! [`build_tree`] turns parent pointers into nested [`Node`]s and
//! [`flatten_visible`] projects those nodes plus the expansion set into the
//! ordered rows a viewer would see. Both are pure; nothing here is ever the
//! source of truth.

use crate::models::record::{Record, ID_FIELD, PARENT_FIELD};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{HashMap, HashSet};

/// Keys a [`Node`] adds next to the record's members.
pub const NODE_VIEW_KEYS: &[&str] = &["children"];
/// Keys a [`VisibleRow`] adds next to the record's members.
pub const ROW_VIEW_KEYS: &[&str] = &["depth", "childCount", "expanded"];

/// A record decorated with its ordered children.
///
/// Serializes as one flat object. A domain field named like one of
/// [`NODE_VIEW_KEYS`] is left out of the view; the record keeps it.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub record: Record,
    pub children: Vec<Node>,
}

impl Node {
    pub fn id(&self) -> &str {
        self.record.id.as_str()
    }
}

/// A visible row: the record plus its depth (roots are depth 0).
///
/// Serializes as one flat object; [`ROW_VIEW_KEYS`] shadow same-named
/// domain fields.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRow {
    pub record: Record,
    pub depth: usize,
    pub child_count: usize,
    pub expanded: bool,
}

fn serialize_record_entries<M: SerializeMap>(
    map: &mut M,
    record: &Record,
    view_keys: &[&str],
) -> Result<(), M::Error> {
    map.serialize_entry(ID_FIELD, &record.id)?;
    map.serialize_entry(PARENT_FIELD, &record.parent_id)?;
    for (key, value) in &record.fields {
        let key = key.as_str();
        if key == ID_FIELD || key == PARENT_FIELD || view_keys.contains(&key) {
            continue;
        }
        map.serialize_entry(key, value)?;
    }
    Ok(())
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        serialize_record_entries(&mut map, &self.record, NODE_VIEW_KEYS)?;
        map.serialize_entry("children", &self.children)?;
        map.end()
    }
}

impl Serialize for VisibleRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        serialize_record_entries(&mut map, &self.record, ROW_VIEW_KEYS)?;
        map.serialize_entry("depth", &self.depth)?;
        map.serialize_entry("childCount", &self.child_count)?;
        map.serialize_entry("expanded", &self.expanded)?;
        map.end()
    }
}

/// Build the nested hierarchy from a flat collection.
///
/// Records whose `parentId` equals `root_parent_id` become roots. When
/// `root_parent_id` is `None`, records pointing at a missing parent are kept
/// as extra roots instead of being dropped. Root and sibling order mirror the
/// input order.
pub fn build_tree(records: &[Record], root_parent_id: Option<&str>) -> Vec<Node> {
    let ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
    let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();

    for (position, record) in records.iter().enumerate() {
        if record.has_parent(root_parent_id) {
            roots.push(position);
            continue;
        }
        match record.parent_id.as_deref() {
            Some(parent_id) if ids.contains(parent_id) => {
                children.entry(parent_id).or_default().push(position);
            }
            _ if root_parent_id.is_none() => {
                tracing::debug!(id = %record.id, "treating orphaned record as root");
                roots.push(position);
            }
            _ => {}
        }
    }

    let mut placed = HashSet::new();
    roots
        .into_iter()
        .filter_map(|position| assemble(records, position, &children, &mut placed))
        .collect()
}

fn assemble<'a>(
    records: &'a [Record],
    position: usize,
    children: &HashMap<&str, Vec<usize>>,
    placed: &mut HashSet<&'a str>,
) -> Option<Node> {
    let record = &records[position];
    if !placed.insert(record.id.as_str()) {
        return None;
    }
    let kids = children
        .get(record.id.as_str())
        .map(|positions| {
            positions
                .iter()
                .filter_map(|child| assemble(records, *child, children, placed))
                .collect()
        })
        .unwrap_or_default();
    Some(Node {
        record: record.clone(),
        children: kids,
    })
}

/// Flatten `roots` into visible rows starting at depth 0.
pub fn flatten_visible(roots: &[Node], expanded: &HashSet<String>) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    flatten_into(roots, expanded, 0, &mut rows);
    rows
}

/// Flatten `nodes` into visible rows whose top level sits at `depth`.
///
/// Pre-order: every node is emitted; children are only visited when the
/// node is expanded and has at least one child.
pub fn flatten_visible_from(
    nodes: &[Node],
    expanded: &HashSet<String>,
    depth: usize,
) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    flatten_into(nodes, expanded, depth, &mut rows);
    rows
}

fn flatten_into(
    nodes: &[Node],
    expanded: &HashSet<String>,
    depth: usize,
    rows: &mut Vec<VisibleRow>,
) {
    for node in nodes {
        let is_expanded = expanded.contains(node.id());
        rows.push(VisibleRow {
            record: node.record.clone(),
            depth,
            child_count: node.children.len(),
            expanded: is_expanded,
        });
        if is_expanded && !node.children.is_empty() {
            flatten_into(&node.children, expanded, depth + 1, rows);
        }
    }
}
