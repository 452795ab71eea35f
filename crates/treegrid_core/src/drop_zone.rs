//! Maps a pointer position over a row to a drop zone and then to a move target.

use crate::{
    constants::{DROP_AFTER_FRACTION, DROP_BEFORE_FRACTION},
    models::record::Record,
};
use serde::{Deserialize, Serialize};

/// Where a dragged row lands relative to the hovered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropZone {
    Before,
    Inside,
    After,
}

/// Classify a vertical pointer `offset` within a row of `height`.
///
/// The middle 30% of the row means "inside", so reparenting needs a more
/// deliberate aim than reordering. Non-finite input falls into `Inside`.
pub fn classify(offset: f64, height: f64) -> DropZone {
    if offset < height * DROP_BEFORE_FRACTION {
        DropZone::Before
    } else if offset > height * DROP_AFTER_FRACTION {
        DropZone::After
    } else {
        DropZone::Inside
    }
}

/// Parent/index pair handed to the move intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTarget {
    pub new_parent_id: Option<String>,
    pub new_index: usize,
}

/// Translate a drop of `dragged_id` onto `hovered_id` into a move target.
///
/// Positions are counted among siblings with the dragged record removed, which
/// is the order the move planner indexes into.
///
/// # Returns
/// `None` when the hovered record is missing or is the dragged record itself.
pub fn drop_target(
    records: &[Record],
    dragged_id: &str,
    hovered_id: &str,
    zone: DropZone,
) -> Option<MoveTarget> {
    if dragged_id == hovered_id {
        return None;
    }
    let hovered = records.iter().find(|r| r.id == hovered_id)?;
    let others = || records.iter().filter(|r| r.id != dragged_id);

    match zone {
        DropZone::Inside => Some(MoveTarget {
            new_parent_id: Some(hovered.id.clone()),
            new_index: others().filter(|r| r.has_parent(Some(hovered_id))).count(),
        }),
        DropZone::Before | DropZone::After => {
            let position = others()
                .filter(|r| r.parent_id == hovered.parent_id)
                .position(|r| r.id == hovered_id)?;
            Some(MoveTarget {
                new_parent_id: hovered.parent_id.clone(),
                new_index: if zone == DropZone::After {
                    position + 1
                } else {
                    position
                },
            })
        }
    }
}
