//! Per-student grading commands and the student detail view.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::core::error::CoreResult;
use crate::core::gradebook::Gradebook;
use crate::core::toggle::is_ancestor_registered;
use crate::core::types::{Score, Student};
use crate::workspace::{Workspace, with_workspace};

/// Checkbox state of one rubric node for the current student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Checked,
    Unchecked,
    /// An ancestor is registered, so this node cannot be selected.
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistRow {
    pub path_key: String,
    pub depth: usize,
    pub id: String,
    pub description: String,
    pub points: f64,
    pub state: CheckState,
    /// The student's own feedback text when checked.
    pub feedback: Option<String>,
}

/// Everything shown for one student.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentView {
    pub student: Student,
    pub total_points: f64,
    pub score: Score,
    pub feedback: String,
    pub checklist: Vec<ChecklistRow>,
}

/// Result of a toggle: the new registration state and the updated score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToggleOutcome {
    pub registered: bool,
    pub score: Score,
}

pub fn toggle_deduction(root: &Path, student: &str, deduction_id: &str) -> Result<ToggleOutcome> {
    with_workspace(root, |ws| {
        ws.book.toggle(student, deduction_id)?;
        let registered = ws.book.student(student)?.is_registered(deduction_id);
        let score = ws.book.score(student)?;
        info!(student, deduction_id, registered, score = score.raw, "deduction toggled");
        Ok(ToggleOutcome { registered, score })
    })
}

pub fn set_feedback(root: &Path, student: &str, deduction_id: &str, text: &str) -> Result<()> {
    with_workspace(root, |ws| Ok(ws.book.set_feedback(student, deduction_id, text)?))
}

pub fn reset_feedback(root: &Path, student: &str, deduction_id: &str) -> Result<()> {
    with_workspace(root, |ws| Ok(ws.book.reset_feedback(student, deduction_id)?))
}

pub fn set_additional_deduction(root: &Path, student: &str, points: f64) -> Result<Score> {
    with_workspace(root, |ws| {
        ws.book.set_additional_deduction(student, points)?;
        Ok(ws.book.score(student)?)
    })
}

pub fn set_additional_feedback(root: &Path, student: &str, text: &str) -> Result<()> {
    with_workspace(root, |ws| Ok(ws.book.set_additional_feedback(student, text)?))
}

pub fn set_submitted(root: &Path, student: &str, submitted: bool) -> Result<()> {
    with_workspace(root, |ws| Ok(ws.book.set_submitted(student, submitted)?))
}

pub fn set_graded(root: &Path, student: &str, graded: bool) -> Result<()> {
    with_workspace(root, |ws| Ok(ws.book.set_graded(student, graded)?))
}

pub fn show_student(root: &Path, student: &str) -> Result<StudentView> {
    let ws = Workspace::open(root)?;
    Ok(student_view(&ws.book, student, ws.pad_width())?)
}

pub fn student_view(book: &Gradebook, key: &str, pad_width: usize) -> CoreResult<StudentView> {
    let student = book.student(key)?;
    Ok(StudentView {
        student: student.clone(),
        total_points: book.total_points(),
        score: book.score(key)?,
        feedback: book.render(key, pad_width)?,
        checklist: checklist(book, student),
    })
}

/// One row per non-root rubric node, in pre-order.
pub fn checklist(book: &Gradebook, student: &Student) -> Vec<ChecklistRow> {
    let index = book.index();
    index
        .preorder_ids()
        .iter()
        .filter_map(|id| index.node(id))
        .filter(|node| !node.path.is_root())
        .map(|node| {
            let registration = student.registration(&node.id);
            let state = if registration.is_some() {
                CheckState::Checked
            } else if is_ancestor_registered(student, &node.id, index) {
                CheckState::Disabled
            } else {
                CheckState::Unchecked
            };
            ChecklistRow {
                path_key: node.path.key(),
                depth: node.path.depth(),
                id: node.id.clone(),
                description: node.description.clone(),
                points: node.points,
                state,
                feedback: registration.map(|entry| entry.feedback.clone()),
            }
        })
        .collect()
}
