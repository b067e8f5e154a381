//! Shared types for grading state.
//!
//! `Session` is the entire persisted state. Everything else (indices, paths,
//! scores, rendered feedback) is derived from it on demand.

use serde::{Deserialize, Serialize};

use crate::rubric::{DeductionNode, default_rubric};

/// Maximum score used when no configuration overrides it.
pub const DEFAULT_TOTAL_POINTS: f64 = 100.0;

/// A student's selection of one rubric node plus their own copy of its feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredDeduction {
    /// Weak reference into the rubric tree.
    pub deduction_id: String,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Internal identity, stable across renames.
    pub id: String,
    /// External roster key.
    pub student_id: String,
    pub name: String,
    pub is_submitted: bool,
    pub is_graded: bool,
    /// Keyed by `deduction_id`; never holds duplicates.
    #[serde(rename = "registeredDeductionList", default)]
    pub registered_deductions: Vec<RegisteredDeduction>,
    #[serde(default)]
    pub additional_deduction: f64,
    #[serde(default)]
    pub additional_feedback: String,
}

impl Student {
    /// Fresh roster entry: submitted, ungraded, no deductions.
    pub fn new(
        id: impl Into<String>,
        student_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            student_id: student_id.into(),
            name: name.into(),
            is_submitted: true,
            is_graded: false,
            registered_deductions: Vec::new(),
            additional_deduction: 0.0,
            additional_feedback: String::new(),
        }
    }

    pub fn registration(&self, deduction_id: &str) -> Option<&RegisteredDeduction> {
        self.registered_deductions
            .iter()
            .find(|entry| entry.deduction_id == deduction_id)
    }

    pub fn is_registered(&self, deduction_id: &str) -> bool {
        self.registration(deduction_id).is_some()
    }
}

/// Persisted grading state: total points, rubric and roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub total_points: f64,
    #[serde(rename = "deductionItemTree")]
    pub rubric_tree: DeductionNode,
    #[serde(rename = "studentList")]
    pub students: Vec<Student>,
}

impl Session {
    pub fn with_total_points(total_points: f64) -> Self {
        Self {
            total_points,
            rubric_tree: default_rubric(),
            students: Vec::new(),
        }
    }

    pub fn student_position(&self, id: &str) -> Option<usize> {
        self.students.iter().position(|student| student.id == id)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::with_total_points(DEFAULT_TOTAL_POINTS)
    }
}

/// Sibling reorder direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Neighbour selection when stepping through the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Prev,
    Next,
}

/// Score pair: `raw` may be negative, `clamped` is what graders and exports see.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub raw: f64,
    pub clamped: f64,
}

impl Score {
    pub fn from_raw(raw: f64) -> Self {
        Self {
            raw,
            clamped: raw.max(0.0),
        }
    }

    pub fn is_below_zero(&self) -> bool {
        self.raw < 0.0
    }
}
