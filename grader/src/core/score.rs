//! Score arithmetic.

use crate::core::index::TreeIndex;
use crate::core::types::{Score, Student};

/// Sum of the rubric points of every registered deduction.
///
/// Registrations that no longer resolve contribute nothing; reconciliation
/// after structural edits keeps that set empty.
pub fn registered_points(student: &Student, index: &TreeIndex) -> f64 {
    student
        .registered_deductions
        .iter()
        .filter_map(|entry| index.node(&entry.deduction_id))
        .map(|node| node.points)
        .sum()
}

/// `total - (registered + additional)`; may be negative.
pub fn raw_score(student: &Student, total_points: f64, index: &TreeIndex) -> f64 {
    total_points - (registered_points(student, index) + student.additional_deduction)
}

pub fn score(student: &Student, total_points: f64, index: &TreeIndex) -> Score {
    Score::from_raw(raw_score(student, total_points, index))
}
