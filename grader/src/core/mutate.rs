//! Structural rubric edits.
//!
//! Every operation takes the current tree by reference and returns a new
//! tree, so a failed edit leaves the caller's tree untouched. Callers must
//! rebuild the [`TreeIndex`](crate::core::index::TreeIndex) before reading
//! anything derived from the result.

use std::collections::HashSet;

use crate::core::error::{CoreError, CoreResult};
use crate::core::path::NodePath;
use crate::core::types::Direction;
use crate::rubric::DeductionNode;

/// Append `node` as the last child of the node at `parent_path`.
pub fn insert(
    tree: &DeductionNode,
    parent_path: &NodePath,
    node: DeductionNode,
) -> CoreResult<DeductionNode> {
    validate_points(&node)?;
    ensure_fresh_ids(tree, &node)?;

    let mut next = tree.clone();
    let parent = node_at_mut(&mut next, parent_path)
        .ok_or_else(|| CoreError::not_found(format!("parent path '{parent_path}'")))?;
    parent.children.push(node);
    Ok(next)
}

/// Replace the scalar fields of node `id`; its children are kept as-is.
pub fn edit(
    tree: &DeductionNode,
    id: &str,
    description: &str,
    points: f64,
    default_feedback: &str,
) -> CoreResult<DeductionNode> {
    check_points(id, points)?;
    let mut next = tree.clone();
    let node = find_node_mut(&mut next, id)
        .ok_or_else(|| CoreError::not_found(format!("deduction '{id}'")))?;
    node.description = description.to_string();
    node.points = points;
    node.default_feedback = default_feedback.to_string();
    Ok(next)
}

/// Remove node `id` together with its whole subtree.
///
/// Registrations pointing into the removed subtree are not touched here;
/// prune them against an index rebuilt from the returned tree.
pub fn delete(tree: &DeductionNode, id: &str) -> CoreResult<DeductionNode> {
    if tree.id == id {
        return Err(CoreError::InvariantViolation(
            "the rubric root cannot be deleted".to_string(),
        ));
    }
    let mut next = tree.clone();
    remove_node(&mut next, id).ok_or_else(|| CoreError::not_found(format!("deduction '{id}'")))?;
    Ok(next)
}

/// Swap the node at `path` with its previous (`Up`) or next (`Down`) sibling.
///
/// Already first/last, or the root: returns an unchanged copy.
pub fn move_node(
    tree: &DeductionNode,
    path: &NodePath,
    direction: Direction,
) -> CoreResult<DeductionNode> {
    let mut next = tree.clone();
    let (Some(parent_path), Some(position)) = (path.parent(), path.last()) else {
        return Ok(next);
    };
    let parent = node_at_mut(&mut next, &parent_path)
        .ok_or_else(|| CoreError::not_found(format!("path '{path}'")))?;
    if position >= parent.children.len() {
        return Err(CoreError::not_found(format!("path '{path}'")));
    }

    match direction {
        Direction::Up if position > 0 => parent.children.swap(position - 1, position),
        Direction::Down if position + 1 < parent.children.len() => {
            parent.children.swap(position, position + 1);
        }
        _ => {}
    }
    Ok(next)
}

fn node_at_mut<'a>(tree: &'a mut DeductionNode, path: &NodePath) -> Option<&'a mut DeductionNode> {
    path.indices()
        .iter()
        .try_fold(tree, |node, &position| node.children.get_mut(position))
}

fn find_node_mut<'a>(node: &'a mut DeductionNode, id: &str) -> Option<&'a mut DeductionNode> {
    if node.id == id {
        return Some(node);
    }

    for child in &mut node.children {
        if let Some(found) = find_node_mut(child, id) {
            return Some(found);
        }
    }

    None
}

fn remove_node(node: &mut DeductionNode, id: &str) -> Option<DeductionNode> {
    if let Some(position) = node.children.iter().position(|child| child.id == id) {
        return Some(node.children.remove(position));
    }
    node.children
        .iter_mut()
        .find_map(|child| remove_node(child, id))
}

fn ensure_fresh_ids(tree: &DeductionNode, incoming: &DeductionNode) -> CoreResult<()> {
    let mut existing = Vec::new();
    tree.collect_ids(&mut existing);
    let mut seen: HashSet<&str> = existing.into_iter().collect();

    let mut added = Vec::new();
    incoming.collect_ids(&mut added);
    for id in added {
        if !seen.insert(id) {
            return Err(CoreError::InvariantViolation(format!(
                "duplicate deduction id '{id}'"
            )));
        }
    }
    Ok(())
}

fn validate_points(node: &DeductionNode) -> CoreResult<()> {
    check_points(&node.id, node.points)?;
    node.children.iter().try_for_each(validate_points)
}

fn check_points(id: &str, points: f64) -> CoreResult<()> {
    if !points.is_finite() || points < 0.0 {
        return Err(CoreError::MalformedInput(format!(
            "deduction '{id}': points must be a non-negative number, got {points}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::index::TreeIndex;
    use crate::test_support::{child_ids, deduction, deduction_with_children, rubric};

    fn sample() -> DeductionNode {
        rubric(vec![
            deduction_with_children("a", 10.0, vec![deduction("a1", 1.0), deduction("a2", 2.0)]),
            deduction_with_children("b", 5.0, vec![deduction("b1", 1.0)]),
            deduction("c", 3.0),
        ])
    }

    #[test]
    fn insert_appends_as_last_child() {
        let tree = sample();
        let next = insert(&tree, &NodePath::new(vec![0]), deduction("a3", 1.0)).expect("insert");
        assert_eq!(child_ids(&next.children[0]), vec!["a1", "a2", "a3"]);
        // Input untouched.
        assert_eq!(child_ids(&tree.children[0]), vec!["a1", "a2"]);
    }

    #[test]
    fn insert_under_root_and_unknown_parent() {
        let tree = sample();
        let next = insert(&tree, &NodePath::root(), deduction("d", 1.0)).expect("insert");
        assert_eq!(child_ids(&next), vec!["a", "b", "c", "d"]);

        let err = insert(&tree, &NodePath::new(vec![7]), deduction("d", 1.0)).expect_err("missing");
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn insert_rejects_duplicate_ids_and_negative_points() {
        let tree = sample();
        let err = insert(&tree, &NodePath::root(), deduction("a1", 1.0)).expect_err("dup");
        assert!(matches!(err, CoreError::InvariantViolation(_)));

        let err = insert(&tree, &NodePath::root(), deduction("neg", -1.0)).expect_err("neg");
        assert!(matches!(err, CoreError::MalformedInput(_)));
    }

    #[test]
    fn edit_preserves_children() {
        let tree = sample();
        let next = edit(&tree, "a", "Alpha", 12.0, "new feedback").expect("edit");
        let before = &tree.children[0];
        let after = &next.children[0];
        assert_eq!(after.description, "Alpha");
        assert_eq!(after.points, 12.0);
        assert_eq!(after.default_feedback, "new feedback");
        assert_eq!(after.id, before.id);
        assert_eq!(before.children, after.children);
    }

    #[test]
    fn edit_unknown_id_is_not_found() {
        let err = edit(&sample(), "zz", "x", 1.0, "").expect_err("missing");
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn delete_removes_whole_subtree() {
        let tree = sample();
        let next = delete(&tree, "a").expect("delete");
        let index = TreeIndex::build(&next);
        for id in ["a", "a1", "a2"] {
            assert!(!index.contains(id), "{id} should be gone");
        }
        assert_eq!(child_ids(&next), vec!["b", "c"]);
        assert_eq!(index.path("b").map(NodePath::key), Some("0".to_string()));
    }

    #[test]
    fn delete_nested_and_root() {
        let next = delete(&sample(), "b1").expect("delete");
        assert!(next.children[1].children.is_empty());

        assert!(matches!(
            delete(&sample(), "root"),
            Err(CoreError::InvariantViolation(_))
        ));
        assert!(matches!(
            delete(&sample(), "zz"),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn move_up_swaps_with_previous_sibling_and_rebuilds_paths() {
        let tree = sample();
        let next = move_node(&tree, &NodePath::new(vec![1]), Direction::Up).expect("move");
        assert_eq!(child_ids(&next), vec!["b", "a", "c"]);

        let index = TreeIndex::build(&next);
        assert_eq!(index.path("b1").map(NodePath::key), Some("0-0".to_string()));
        assert_eq!(index.path("a1").map(NodePath::key), Some("1-0".to_string()));
        assert_eq!(index.path("a2").map(NodePath::key), Some("1-1".to_string()));
    }

    #[test]
    fn move_is_noop_at_boundaries() {
        let tree = sample();
        let first_up = move_node(&tree, &NodePath::new(vec![0]), Direction::Up).expect("move");
        assert_eq!(first_up, tree);
        let last_down = move_node(&tree, &NodePath::new(vec![2]), Direction::Down).expect("move");
        assert_eq!(last_down, tree);
        let root = move_node(&tree, &NodePath::root(), Direction::Down).expect("move");
        assert_eq!(root, tree);
    }

    #[test]
    fn move_down_and_unknown_path() {
        let tree = sample();
        let next = move_node(&tree, &NodePath::new(vec![0, 0]), Direction::Down).expect("move");
        assert_eq!(child_ids(&next.children[0]), vec!["a2", "a1"]);

        let err = move_node(&tree, &NodePath::new(vec![0, 5]), Direction::Up).expect_err("bad");
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}
