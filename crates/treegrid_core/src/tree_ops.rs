//! Structural operations on the flat record collection.

use crate::models::record::Record;
use std::collections::{HashMap, HashSet};

/// Returns `true` if re-parenting `node_id` under `new_parent_id` introduces a cycle.
///
/// Walks the proposed parent's ancestor chain; a chain that reaches
/// `node_id` (or loops on itself) is a cycle.
pub fn introduces_cycle(records: &[Record], node_id: &str, new_parent_id: &str) -> bool {
    let parent_map: HashMap<&str, Option<&str>> = records
        .iter()
        .map(|r| (r.id.as_str(), r.parent_id.as_deref()))
        .collect();
    let mut current = Some(new_parent_id);
    let mut visited = HashSet::new();

    while let Some(curr) = current {
        if !visited.insert(curr) || curr == node_id {
            return true;
        }
        current = parent_map.get(curr).copied().flatten();
    }

    false
}

/// Collect every id whose ancestor chain includes `root_id` (excluding `root_id`).
///
/// Ids come out in pre-order, children in collection order.
pub fn descendant_ids(records: &[Record], root_id: &str) -> Vec<String> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for record in records {
        if let Some(parent_id) = record.parent_id.as_deref() {
            children.entry(parent_id).or_default().push(record.id.as_str());
        }
    }

    let mut to_visit: Vec<&str> = children
        .get(root_id)
        .map(|kids| kids.iter().rev().copied().collect())
        .unwrap_or_default();
    let mut discovered = Vec::new();
    let mut visited = HashSet::from([root_id]);

    while let Some(current) = to_visit.pop() {
        if !visited.insert(current) {
            continue;
        }
        discovered.push(current.to_string());
        if let Some(kids) = children.get(current) {
            to_visit.extend(kids.iter().rev().copied());
        }
    }

    discovered
}

/// Find a record that sits on a parent-pointer cycle, if any.
pub fn find_cycle(records: &[Record]) -> Option<&str> {
    records.iter().find_map(|record| {
        let parent_id = record.parent_id.as_deref()?;
        introduces_cycle(records, record.id.as_str(), parent_id).then_some(record.id.as_str())
    })
}

/// Find the first id that occurs more than once.
pub fn find_duplicate_id(records: &[Record]) -> Option<&str> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|record| record.id.as_str())
        .find(|id| !seen.insert(*id))
}

/// Position of `node_id` among the records sharing its parent.
pub fn sibling_index(records: &[Record], node_id: &str) -> Option<usize> {
    let node = records.iter().find(|r| r.id == node_id)?;
    records
        .iter()
        .filter(|r| r.parent_id == node.parent_id)
        .position(|r| r.id == node_id)
}

/// Number of direct children of `parent_id`.
pub fn child_count(records: &[Record], parent_id: &str) -> usize {
    records
        .iter()
        .filter(|r| r.has_parent(Some(parent_id)))
        .count()
}

/// Compute the collection that results from moving `node_id` under
/// `new_parent_id` at sibling position `new_index`.
///
/// Cycle and parent-existence checks are the caller's job. `new_index` is
/// clamped to the sibling count after removal. Moving a node to its current
/// parent and sibling position returns the collection unchanged.
///
/// # Returns
/// `None` when `node_id` does not exist.
pub fn plan_move(
    records: &[Record],
    node_id: &str,
    new_parent_id: Option<&str>,
    new_index: usize,
) -> Option<Vec<Record>> {
    let from = records.iter().position(|r| r.id == node_id)?;
    let moved = &records[from];
    if moved.has_parent(new_parent_id) && sibling_index(records, node_id) == Some(new_index) {
        return Some(records.to_vec());
    }

    let mut rest: Vec<Record> = records.to_vec();
    let mut updated = rest.remove(from);
    updated.parent_id = new_parent_id.map(str::to_string);

    let siblings: Vec<usize> = rest
        .iter()
        .enumerate()
        .filter(|(_, r)| r.has_parent(new_parent_id))
        .map(|(position, _)| position)
        .collect();
    let index = new_index.min(siblings.len());

    let insert_at = if index == siblings.len() {
        siblings.last().map(|last| last + 1).unwrap_or(rest.len())
    } else {
        siblings[index]
    };
    rest.insert(insert_at, updated);
    Some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ids_of, sample_records};

    #[test]
    fn detects_cycle() {
        let records = sample_records();
        assert!(introduces_cycle(&records, "1", "1-1-1"));
        assert!(introduces_cycle(&records, "1", "1"));
        assert!(!introduces_cycle(&records, "1-1", "2"));
        assert!(!introduces_cycle(&records, "1-1-1", "1"));
    }

    #[test]
    fn descendants_are_transitive_and_exclude_target() {
        let records = sample_records();
        assert_eq!(descendant_ids(&records, "1"), vec!["1-1", "1-1-1", "1-2"]);
        assert_eq!(descendant_ids(&records, "1-1"), vec!["1-1-1"]);
        assert!(descendant_ids(&records, "2").is_empty());
        assert!(descendant_ids(&records, "missing").is_empty());
    }

    #[test]
    fn descendants_terminate_on_corrupt_cycles() {
        let records = vec![
            Record::with_parent("x", Some("y")),
            Record::with_parent("y", Some("x")),
        ];
        assert_eq!(descendant_ids(&records, "x"), vec!["y"]);
    }

    #[test]
    fn find_cycle_and_duplicates() {
        assert_eq!(find_cycle(&sample_records()), None);
        let cyclic = vec![
            Record::new("root"),
            Record::with_parent("x", Some("y")),
            Record::with_parent("y", Some("x")),
        ];
        assert_eq!(find_cycle(&cyclic), Some("x"));
        let self_parent = vec![Record::with_parent("s", Some("s"))];
        assert_eq!(find_cycle(&self_parent), Some("s"));

        let dupes = vec![Record::new("a"), Record::new("b"), Record::new("a")];
        assert_eq!(find_duplicate_id(&dupes), Some("a"));
        assert_eq!(find_duplicate_id(&sample_records()), None);
    }

    #[test]
    fn sibling_index_and_child_count() {
        let records = sample_records();
        assert_eq!(sibling_index(&records, "1-2"), Some(1));
        assert_eq!(sibling_index(&records, "2"), Some(1));
        assert_eq!(sibling_index(&records, "missing"), None);
        assert_eq!(child_count(&records, "1"), 2);
        assert_eq!(child_count(&records, "2"), 0);
    }

    #[test]
    fn move_to_root_front() {
        let records = vec![
            Record::new("1"),
            Record::with_parent("1-1", Some("1")),
            Record::new("2"),
        ];
        let moved = plan_move(&records, "1-1", None, 0).expect("node exists");
        assert_eq!(ids_of(&moved), vec!["1-1", "1", "2"]);
        assert!(moved[0].is_root());
    }

    #[test]
    fn move_appends_after_last_sibling() {
        let records = sample_records();
        let moved = plan_move(&records, "2", Some("1"), 99).expect("node exists");
        assert_eq!(ids_of(&moved), vec!["1", "1-1", "1-1-1", "1-2", "2"]);
        assert_eq!(moved[4].parent_id.as_deref(), Some("1"));
    }

    #[test]
    fn move_into_childless_parent_goes_to_end() {
        let records = sample_records();
        let moved = plan_move(&records, "1-1-1", Some("2"), 0).expect("node exists");
        assert_eq!(ids_of(&moved), vec!["1", "1-1", "1-2", "2", "1-1-1"]);
    }

    #[test]
    fn reorder_within_parent_inserts_before_target_sibling() {
        let records = sample_records();
        let moved = plan_move(&records, "1-2", Some("1"), 0).expect("node exists");
        assert_eq!(ids_of(&moved), vec!["1", "1-2", "1-1", "1-1-1", "2"]);
    }

    #[test]
    fn move_to_current_position_is_identity() {
        let records = sample_records();
        for record in &records {
            let index = sibling_index(&records, &record.id).expect("index");
            let moved = plan_move(&records, &record.id, record.parent_id.as_deref(), index)
                .expect("node exists");
            assert_eq!(moved, records, "node {}", record.id);
        }
    }

    #[test]
    fn move_of_missing_node_is_none() {
        assert!(plan_move(&sample_records(), "missing", None, 0).is_none());
    }
}
