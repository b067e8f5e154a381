//! Rubric structure commands: add, edit, delete, move, import, export.
//!
//! Every command goes through [`with_workspace`], so the stored session is
//! rewritten only after the gradebook accepted the change and rebuilt its
//! index.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::core::error::CoreError;
use crate::core::gradebook::Gradebook;
use crate::core::path::NodePath;
use crate::core::types::Direction;
use crate::io::ids::new_deduction_id;
use crate::io::rubric_file::{export_rubric, import_rubric};
use crate::rubric::DeductionNode;
use crate::workspace::{Workspace, with_workspace};

/// Fields for a new deduction; `id` is generated when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDeduction {
    pub id: Option<String>,
    pub description: String,
    pub points: f64,
    pub feedback: String,
}

/// Partial edit; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeductionEdit {
    pub description: Option<String>,
    pub points: Option<f64>,
    pub feedback: Option<String>,
}

/// Add a deduction under `parent`; returns the id of the new node.
pub fn add_deduction(root: &Path, parent: &NodePath, new: NewDeduction) -> Result<String> {
    let id = new.id.unwrap_or_else(new_deduction_id);
    let node = DeductionNode::new(id.clone(), new.description, new.points, new.feedback);
    with_workspace(root, |ws| {
        ws.book.insert_node(parent, node)?;
        info!(id = %id, parent = %parent, "deduction added");
        Ok(())
    })?;
    Ok(id)
}

pub fn edit_deduction(root: &Path, id: &str, edit: DeductionEdit) -> Result<()> {
    with_workspace(root, |ws| {
        let current = ws
            .book
            .index()
            .node(id)
            .ok_or_else(|| CoreError::not_found(format!("deduction '{id}'")))?;
        let description = edit.description.unwrap_or_else(|| current.description.clone());
        let points = edit.points.unwrap_or(current.points);
        let feedback = edit
            .feedback
            .unwrap_or_else(|| current.default_feedback.clone());
        ws.book.edit_node(id, &description, points, &feedback)?;
        info!(id, "deduction edited");
        Ok(())
    })
}

/// Delete a deduction subtree; returns the number of pruned registrations.
pub fn delete_deduction(root: &Path, id: &str) -> Result<usize> {
    with_workspace(root, |ws| {
        let pruned = ws.book.delete_node(id)?;
        info!(id, pruned, "deduction deleted");
        Ok(pruned)
    })
}

/// Move the node at `path` among its siblings; returns its new path.
pub fn move_deduction(root: &Path, path: &NodePath, direction: Direction) -> Result<NodePath> {
    with_workspace(root, |ws| {
        let id = ws
            .book
            .index()
            .node_at(path)
            .map(|node| node.id.clone())
            .ok_or_else(|| CoreError::not_found(format!("path '{path}'")))?;
        ws.book.move_node(path, direction)?;
        let moved = ws
            .book
            .index()
            .path(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found(format!("deduction '{id}'")))?;
        info!(id = %id, from = %path, to = %moved, "deduction moved");
        Ok(moved)
    })
}

/// Replace the rubric from a JSON file; returns the number of pruned registrations.
pub fn import_rubric_file(root: &Path, file: &Path) -> Result<usize> {
    with_workspace(root, |ws| {
        let tree = import_rubric(file)?;
        let pruned = ws.book.replace_rubric(tree)?;
        info!(file = %file.display(), pruned, "rubric imported");
        Ok(pruned)
    })
}

pub fn export_rubric_file(root: &Path, file: &Path) -> Result<()> {
    let ws = Workspace::open(root)?;
    export_rubric(file, &ws.book.session().rubric_tree)
        .with_context(|| format!("export rubric to {}", file.display()))
}

/// Indented outline of the rubric, one line per non-root node in pre-order.
pub fn outline(book: &Gradebook) -> Vec<String> {
    let index = book.index();
    index
        .preorder_ids()
        .iter()
        .filter_map(|id| index.node(id))
        .filter(|node| !node.path.is_root())
        .map(|node| {
            format!(
                "{}[{}] {} (-{}) {}",
                "  ".repeat(node.path.depth()),
                node.path.key(),
                node.id,
                node.points,
                node.description
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::session_store::load_session_strict;
    use crate::test_support::{TestWorkspace, deduction, deduction_with_children, rubric, student};

    fn load(ws: &TestWorkspace) -> Gradebook {
        load_session_strict(&ws.paths.session_path).expect("load")
    }

    fn new(id: &str, points: f64) -> NewDeduction {
        NewDeduction {
            id: Some(id.to_string()),
            description: format!("{id} description"),
            points,
            feedback: format!("{id} feedback"),
        }
    }

    #[test]
    fn add_then_outline() {
        let ws = TestWorkspace::new().expect("workspace");
        add_deduction(ws.root(), &NodePath::root(), new("a", 10.0)).expect("a");
        add_deduction(ws.root(), &NodePath::new(vec![0]), new("a1", 2.0)).expect("a1");
        let generated = add_deduction(
            ws.root(),
            &NodePath::root(),
            NewDeduction {
                id: None,
                ..new("ignored", 1.0)
            },
        )
        .expect("generated");
        assert!(generated.starts_with("deduction-"));

        let lines = outline(&load(&ws));
        assert_eq!(lines[0], "[0] a (-10) a description");
        assert_eq!(lines[1], "  [0-0] a1 (-2) a1 description");
        assert!(lines[2].starts_with("[1] deduction-"));
    }

    #[test]
    fn edit_merges_partial_fields() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.seed(
            rubric(vec![deduction_with_children("a", 10.0, vec![deduction("a1", 1.0)])]),
            Vec::new(),
        )
        .expect("seed");

        edit_deduction(
            ws.root(),
            "a",
            DeductionEdit {
                points: Some(7.0),
                ..DeductionEdit::default()
            },
        )
        .expect("edit");

        let book = load(&ws);
        let a = &book.session().rubric_tree.children[0];
        assert_eq!(a.points, 7.0);
        assert_eq!(a.description, "a description");
        assert_eq!(a.children.len(), 1);
    }

    #[test]
    fn delete_prunes_registrations_on_disk() {
        let ws = TestWorkspace::new().expect("workspace");
        let mut s = student("s1");
        s.registered_deductions.push(crate::core::types::RegisteredDeduction {
            deduction_id: "a1".to_string(),
            feedback: "x".to_string(),
        });
        ws.seed(
            rubric(vec![deduction_with_children("a", 10.0, vec![deduction("a1", 1.0)])]),
            vec![s],
        )
        .expect("seed");

        assert_eq!(delete_deduction(ws.root(), "a").expect("delete"), 1);
        let book = load(&ws);
        assert!(book.student("s1").expect("s1").registered_deductions.is_empty());
    }

    #[test]
    fn move_reports_new_path() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.seed(
            rubric(vec![deduction("a", 1.0), deduction("b", 1.0), deduction("c", 1.0)]),
            Vec::new(),
        )
        .expect("seed");

        let moved =
            move_deduction(ws.root(), &NodePath::new(vec![1]), Direction::Up).expect("move");
        assert_eq!(moved, NodePath::new(vec![0]));
        assert_eq!(load(&ws).index().path("a").map(NodePath::key), Some("1".to_string()));
    }

    #[test]
    fn failed_import_leaves_session_identical() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.seed(rubric(vec![deduction("a", 1.0)]), vec![student("s1")])
            .expect("seed");
        let before = std::fs::read_to_string(&ws.paths.session_path).expect("read");

        let bad = ws.root().join("bad.json");
        std::fs::write(&bad, "[\"not\", \"a\", \"rubric\"]").expect("write");
        let err = import_rubric_file(ws.root(), &bad).expect_err("malformed");
        assert!(err.downcast_ref::<CoreError>().is_some());

        let after = std::fs::read_to_string(&ws.paths.session_path).expect("read");
        assert_eq!(before, after);
    }

    #[test]
    fn export_then_import_round_trips() {
        let ws = TestWorkspace::new().expect("workspace");
        let tree = rubric(vec![deduction_with_children("a", 3.0, vec![deduction("a1", 1.0)])]);
        ws.seed(tree.clone(), Vec::new()).expect("seed");

        let file = ws.root().join("rubric.json");
        export_rubric_file(ws.root(), &file).expect("export");
        ws.seed(rubric(Vec::new()), Vec::new()).expect("reset");
        import_rubric_file(ws.root(), &file).expect("import");
        assert_eq!(load(&ws).session().rubric_tree, tree);
    }
}
