//! Derived lookup tables over the rubric tree.
//!
//! The index is a pure cache: it is rebuilt from scratch after every
//! structural change and never patched in place.

use std::collections::HashMap;

use crate::core::path::NodePath;
use crate::rubric::DeductionNode;

/// Scalar view of one rubric node plus its position in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedNode {
    pub id: String,
    pub description: String,
    pub points: f64,
    pub default_feedback: String,
    pub path: NodePath,
    pub child_ids: Vec<String>,
}

/// `id -> node`, `id -> path` and `path key -> node` lookups, plus pre-order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeIndex {
    by_id: HashMap<String, IndexedNode>,
    id_by_path_key: HashMap<String, String>,
    preorder: Vec<String>,
}

impl TreeIndex {
    /// Walk the whole tree once in pre-order and populate every table.
    pub fn build(tree: &DeductionNode) -> Self {
        let len = tree.subtree_len();
        let mut index = Self {
            by_id: HashMap::with_capacity(len),
            id_by_path_key: HashMap::with_capacity(len),
            preorder: Vec::with_capacity(len),
        };
        index.visit(tree, NodePath::root());
        index
    }

    fn visit(&mut self, node: &DeductionNode, path: NodePath) {
        self.id_by_path_key.insert(path.key(), node.id.clone());
        self.preorder.push(node.id.clone());
        self.by_id.insert(
            node.id.clone(),
            IndexedNode {
                id: node.id.clone(),
                description: node.description.clone(),
                points: node.points,
                default_feedback: node.default_feedback.clone(),
                path: path.clone(),
                child_ids: node.children.iter().map(|c| c.id.clone()).collect(),
            },
        );
        for (position, child) in node.children.iter().enumerate() {
            self.visit(child, path.child(position));
        }
    }

    pub fn node(&self, id: &str) -> Option<&IndexedNode> {
        self.by_id.get(id)
    }

    pub fn path(&self, id: &str) -> Option<&NodePath> {
        self.by_id.get(id).map(|node| &node.path)
    }

    pub fn node_at(&self, path: &NodePath) -> Option<&IndexedNode> {
        self.node_by_key(&path.key())
    }

    pub fn node_by_key(&self, key: &str) -> Option<&IndexedNode> {
        self.id_by_path_key
            .get(key)
            .and_then(|id| self.by_id.get(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Node ids in pre-order, root first.
    pub fn preorder_ids(&self) -> &[String] {
        &self.preorder
    }

    pub fn len(&self) -> usize {
        self.preorder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.preorder.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{deduction, deduction_with_children, rubric};

    #[test]
    fn root_only_tree_indexes_root_under_empty_key() {
        let index = TreeIndex::build(&rubric(Vec::new()));
        assert_eq!(index.len(), 1);
        assert_eq!(index.node_by_key("").map(|n| n.id.as_str()), Some("root"));
        assert_eq!(index.path("root"), Some(&NodePath::root()));
    }

    #[test]
    fn paths_follow_child_positions() {
        let tree = rubric(vec![
            deduction("a", 10.0),
            deduction_with_children("b", 5.0, vec![deduction("b1", 1.0), deduction("b2", 2.0)]),
        ]);
        let index = TreeIndex::build(&tree);

        assert_eq!(index.path("a").map(NodePath::key), Some("0".to_string()));
        assert_eq!(index.path("b2").map(NodePath::key), Some("1-1".to_string()));
        assert_eq!(
            index.node_at(&NodePath::new(vec![1, 0])).map(|n| n.id.as_str()),
            Some("b1")
        );
        assert_eq!(
            index.node("b").map(|n| n.child_ids.clone()),
            Some(vec!["b1".to_string(), "b2".to_string()])
        );
    }

    #[test]
    fn preorder_visits_parents_before_children() {
        let tree = rubric(vec![
            deduction_with_children("a", 1.0, vec![deduction("a1", 1.0)]),
            deduction("b", 1.0),
        ]);
        let index = TreeIndex::build(&tree);
        assert_eq!(index.preorder_ids(), ["root", "a", "a1", "b"]);
    }

    #[test]
    fn padded_path_order_equals_preorder() {
        let tree = rubric(vec![
            deduction_with_children(
                "a",
                1.0,
                (0..12).map(|i| deduction(&format!("a{i}"), 1.0)).collect(),
            ),
            deduction_with_children("b", 1.0, vec![deduction("b0", 1.0)]),
            deduction("c", 1.0),
        ]);
        let index = TreeIndex::build(&tree);

        let mut by_key: Vec<&str> = index.preorder_ids().iter().map(String::as_str).collect();
        by_key.sort_by_key(|id| index.path(id).map(|p| p.sort_key(4)).unwrap_or_default());
        let preorder: Vec<&str> = index.preorder_ids().iter().map(String::as_str).collect();
        assert_eq!(by_key, preorder);
    }
}
