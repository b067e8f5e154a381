//! Generated comment text for a student.
//!
//! Registrations are emitted in rubric pre-order. Each registered node is
//! preceded by the `description:` headers of any ancestors not yet printed,
//! and each level indents by two spaces.

use std::collections::HashSet;

use crate::core::index::TreeIndex;
use crate::core::path::{DEFAULT_PAD_WIDTH, NodePath};
use crate::core::types::{RegisteredDeduction, Student};

const INDENT: &str = "  ";

/// Render with the default path padding width.
pub fn render(student: &Student, index: &TreeIndex) -> String {
    render_with_width(student, index, DEFAULT_PAD_WIDTH)
}

pub fn render_with_width(student: &Student, index: &TreeIndex, pad_width: usize) -> String {
    let body = render_deductions(student, index, pad_width);
    if body.is_empty() {
        return student.additional_feedback.clone();
    }
    format!("{body}\n{}", student.additional_feedback)
}

/// Header and deduction lines only, each terminated by `\n`.
pub fn render_deductions(student: &Student, index: &TreeIndex, pad_width: usize) -> String {
    let mut out = String::new();
    let mut headers_done: HashSet<&str> = HashSet::new();

    for (path, entry) in sorted_registrations(student, index, pad_width) {
        for ancestor_path in path.proper_ancestors() {
            let Some(ancestor) = index.node_at(&ancestor_path) else {
                continue;
            };
            if headers_done.insert(ancestor.id.as_str()) {
                out.push_str(&format!(
                    "{}{}:\n",
                    INDENT.repeat(ancestor_path.depth()),
                    ancestor.description
                ));
            }
        }

        let points = index
            .node(&entry.deduction_id)
            .map_or(0.0, |node| node.points);
        out.push_str(&format!(
            "{}{} (-{} points)\n",
            INDENT.repeat(path.depth()),
            entry.feedback,
            points
        ));
    }

    out
}

/// Registrations that resolve in `index`, ordered by zero-padded path key.
fn sorted_registrations<'a>(
    student: &'a Student,
    index: &'a TreeIndex,
    pad_width: usize,
) -> Vec<(&'a NodePath, &'a RegisteredDeduction)> {
    let mut keyed: Vec<(String, &NodePath, &RegisteredDeduction)> = student
        .registered_deductions
        .iter()
        .filter_map(|entry| {
            index
                .path(&entry.deduction_id)
                .map(|path| (path.sort_key(pad_width), path, entry))
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed
        .into_iter()
        .map(|(_, path, entry)| (path, entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::toggle::{set_feedback, toggle};
    use crate::rubric::DeductionNode;
    use crate::test_support::{deduction_with_children, rubric, student};

    fn flat_index() -> TreeIndex {
        TreeIndex::build(&rubric(vec![
            DeductionNode::new("a", "Header", 10.0, "missing header"),
            DeductionNode::new("b", "Spelling", 5.0, "typo"),
        ]))
    }

    #[test]
    fn flat_rubric_renders_in_tree_order() {
        let index = flat_index();
        let mut s = toggle(&student("s"), "b", &index).expect("b");
        s = toggle(&s, "a", &index).expect("a");
        s.additional_feedback = "Nice work".to_string();

        assert_eq!(
            render(&s, &index),
            "missing header (-10 points)\ntypo (-5 points)\n\nNice work"
        );
    }

    #[test]
    fn no_deductions_yields_only_additional_feedback() {
        let mut s = student("s");
        s.additional_feedback = "See me".to_string();
        assert_eq!(render(&s, &flat_index()), "See me");
    }

    #[test]
    fn nested_registrations_get_ancestor_headers_once() {
        let mut a = DeductionNode::new("a", "Part A", 20.0, "a fb");
        a.children = vec![
            DeductionNode::new("a1", "A1", 5.0, "a1 fb"),
            DeductionNode::new("a2", "A2", 2.5, "a2 fb"),
        ];
        let mut deep = DeductionNode::new("b", "Part B", 9.0, "b fb");
        let mut b1 = DeductionNode::new("b1", "B1", 4.0, "b1 fb");
        b1.children = vec![DeductionNode::new("b1x", "B1x", 1.0, "b1x fb")];
        deep.children = vec![b1];
        let index = TreeIndex::build(&rubric(vec![a, deep]));

        let mut s = student("s");
        for id in ["b1x", "a2", "a1"] {
            s = toggle(&s, id, &index).expect("toggle");
        }

        let expected = "Part A:\n  a1 fb (-5 points)\n  a2 fb (-2.5 points)\n\
                        Part B:\n  B1:\n    b1x fb (-1 points)\n\n";
        assert_eq!(render(&s, &index), expected);
    }

    #[test]
    fn student_specific_feedback_is_rendered() {
        let index = flat_index();
        let s = toggle(&student("s"), "a", &index).expect("a");
        let s = set_feedback(&s, "a", "header is missing on page 2").expect("set");
        assert_eq!(
            render(&s, &index),
            "header is missing on page 2 (-10 points)\n\n"
        );
    }

    #[test]
    fn render_does_not_touch_registrations() {
        let index = TreeIndex::build(&rubric(vec![deduction_with_children("a", 1.0, Vec::new())]));
        let s = toggle(&student("s"), "a", &index).expect("a");
        let before = s.clone();
        render(&s, &index);
        assert_eq!(s, before);
    }
}
