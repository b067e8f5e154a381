//! Per-student deduction selection under the exclusivity invariant.
//!
//! A student never holds two registrations where one node is an ancestor of
//! the other. Selecting an ancestor clears registered descendants; selecting
//! a descendant while an ancestor is registered is refused.

use crate::core::error::{CoreError, CoreResult};
use crate::core::index::{IndexedNode, TreeIndex};
use crate::core::types::{RegisteredDeduction, Student};

/// Flip the registration of `deduction_id` and return the updated student.
pub fn toggle(student: &Student, deduction_id: &str, index: &TreeIndex) -> CoreResult<Student> {
    let node = resolve(deduction_id, index)?;
    let mut next = student.clone();

    if next.is_registered(deduction_id) {
        next.registered_deductions
            .retain(|entry| entry.deduction_id != deduction_id);
        return Ok(next);
    }

    if node.path.is_root() {
        return Err(CoreError::InvariantViolation(
            "the rubric root cannot be registered".to_string(),
        ));
    }
    if is_ancestor_registered(student, deduction_id, index) {
        return Err(CoreError::InvariantViolation(format!(
            "deduction '{deduction_id}' is covered by a registered ancestor"
        )));
    }

    next.registered_deductions.push(RegisteredDeduction {
        deduction_id: node.id.clone(),
        feedback: node.default_feedback.clone(),
    });
    next.registered_deductions.retain(|entry| {
        index
            .path(&entry.deduction_id)
            .is_none_or(|path| !path.is_strict_descendant_of(&node.path))
    });
    Ok(next)
}

/// True iff some registered deduction is a strict ancestor of `deduction_id`.
pub fn is_ancestor_registered(student: &Student, deduction_id: &str, index: &TreeIndex) -> bool {
    let Some(target) = index.path(deduction_id) else {
        return false;
    };
    student.registered_deductions.iter().any(|entry| {
        index
            .path(&entry.deduction_id)
            .is_some_and(|path| path.is_strict_ancestor_of(target))
    })
}

/// Replace the student-specific feedback of an existing registration.
pub fn set_feedback(student: &Student, deduction_id: &str, text: &str) -> CoreResult<Student> {
    let mut next = student.clone();
    let entry = next
        .registered_deductions
        .iter_mut()
        .find(|entry| entry.deduction_id == deduction_id)
        .ok_or_else(|| CoreError::not_found(format!("registration '{deduction_id}'")))?;
    entry.feedback = text.to_string();
    Ok(next)
}

/// Restore the rubric's default feedback on an existing registration.
pub fn reset_feedback(
    student: &Student,
    deduction_id: &str,
    index: &TreeIndex,
) -> CoreResult<Student> {
    let node = resolve(deduction_id, index)?;
    set_feedback(student, deduction_id, &node.default_feedback)
}

fn resolve<'a>(deduction_id: &str, index: &'a TreeIndex) -> CoreResult<&'a IndexedNode> {
    index
        .node(deduction_id)
        .ok_or_else(|| CoreError::not_found(format!("deduction '{deduction_id}'")))
}
