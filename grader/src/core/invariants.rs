//! Semantic invariants not expressible via JSON Schema.

use std::collections::HashSet;

use crate::core::index::TreeIndex;
use crate::core::types::{Session, Student};
use crate::rubric::{DeductionNode, ROOT_ID};

/// Check rubric invariants:
/// - Root carries the sentinel id
/// - No duplicate ids
/// - `points` finite and non-negative
pub fn validate_rubric(root: &DeductionNode) -> Vec<String> {
    let mut errors = Vec::new();
    if root.id != ROOT_ID {
        errors.push(format!("root id must be '{}', got '{}'", ROOT_ID, root.id));
    }
    let mut seen = HashSet::new();
    validate_node(root, &mut seen, &mut errors, root.id.as_str());
    errors
}

fn validate_node<'a>(
    node: &'a DeductionNode,
    seen: &mut HashSet<&'a str>,
    errors: &mut Vec<String>,
    path: &str,
) {
    if !seen.insert(node.id.as_str()) {
        errors.push(format!("duplicate id '{}' at {}", node.id, path));
    }

    if !node.points.is_finite() || node.points < 0.0 {
        errors.push(format!("{}: points must be >= 0, got {}", path, node.points));
    }

    for child in &node.children {
        let child_path = format!("{}/{}", path, child.id);
        validate_node(child, seen, errors, &child_path);
    }
}

/// Check the whole session: rubric invariants, then per-student registrations
/// (resolvable, unique, pairwise unrelated) and unique student ids.
pub fn validate_session(session: &Session, index: &TreeIndex) -> Vec<String> {
    let mut errors = validate_rubric(&session.rubric_tree);

    if !session.total_points.is_finite() {
        errors.push(format!(
            "total points must be finite, got {}",
            session.total_points
        ));
    }

    let mut student_ids = HashSet::new();
    for student in &session.students {
        if !student_ids.insert(student.id.as_str()) {
            errors.push(format!("duplicate student id '{}'", student.id));
        }
        validate_registrations(student, index, &mut errors);
    }
    errors
}

fn validate_registrations(student: &Student, index: &TreeIndex, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for entry in &student.registered_deductions {
        if !seen.insert(entry.deduction_id.as_str()) {
            errors.push(format!(
                "student '{}': deduction '{}' registered twice",
                student.id, entry.deduction_id
            ));
        }
        if !index.contains(&entry.deduction_id) {
            errors.push(format!(
                "student '{}': deduction '{}' not in rubric",
                student.id, entry.deduction_id
            ));
        }
    }

    let paths: Vec<_> = student
        .registered_deductions
        .iter()
        .filter_map(|entry| index.path(&entry.deduction_id).map(|p| (entry, p)))
        .collect();
    for (upper, upper_path) in &paths {
        for (lower, lower_path) in &paths {
            if upper_path.is_strict_ancestor_of(lower_path) {
                errors.push(format!(
                    "student '{}': '{}' and its descendant '{}' are both registered",
                    student.id, upper.deduction_id, lower.deduction_id
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RegisteredDeduction;
    use crate::test_support::{deduction, deduction_with_children, rubric, student};

    fn register(student: &mut Student, id: &str) {
        student.registered_deductions.push(RegisteredDeduction {
            deduction_id: id.to_string(),
            feedback: String::new(),
        });
    }

    #[test]
    fn rubric_reports_duplicates_and_negative_points() {
        let tree = rubric(vec![deduction("dup", 1.0), deduction("dup", -2.0)]);
        let errors = validate_rubric(&tree);
        assert!(errors.iter().any(|err| err.contains("duplicate id 'dup'")));
        assert!(errors.iter().any(|err| err.contains("points must be >= 0")));
    }

    #[test]
    fn rubric_requires_sentinel_root() {
        let tree = deduction("top", 0.0);
        let errors = validate_rubric(&tree);
        assert!(errors.iter().any(|err| err.contains("root id")));
    }

    #[test]
    fn session_reports_orphans_duplicates_and_overlap() {
        let mut session = Session::default();
        session.rubric_tree = rubric(vec![deduction_with_children(
            "a",
            5.0,
            vec![deduction("a1", 1.0)],
        )]);
        let mut s = student("s1");
        register(&mut s, "a");
        register(&mut s, "a1");
        register(&mut s, "a1");
        register(&mut s, "ghost");
        session.students = vec![s, student("s1")];

        let index = TreeIndex::build(&session.rubric_tree);
        let errors = validate_session(&session, &index);
        assert!(errors.iter().any(|err| err.contains("registered twice")));
        assert!(errors.iter().any(|err| err.contains("'ghost' not in rubric")));
        assert!(errors.iter().any(|err| err.contains("both registered")));
        assert!(errors.iter().any(|err| err.contains("duplicate student id")));
    }

    #[test]
    fn clean_session_has_no_errors() {
        let mut session = Session::default();
        session.rubric_tree = rubric(vec![deduction("a", 5.0)]);
        let mut s = student("s1");
        register(&mut s, "a");
        session.students.push(s);
        let index = TreeIndex::build(&session.rubric_tree);
        assert!(validate_session(&session, &index).is_empty());
    }
}
