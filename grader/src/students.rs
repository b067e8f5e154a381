//! Roster commands for `grader student ...`.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::core::gradebook::Gradebook;
use crate::core::score::score;
use crate::core::types::{Score, Step, Student};
use crate::io::ids::new_student_id;
use crate::io::roster::import_roster;
use crate::workspace::{Workspace, with_workspace};

/// One line of `grader student list`.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentSummary {
    pub id: String,
    pub student_id: String,
    pub name: String,
    pub is_submitted: bool,
    pub is_graded: bool,
    pub score: Score,
}

/// Add one student; returns the generated internal id.
pub fn add_student(root: &Path, student_id: &str, name: &str) -> Result<String> {
    let student = Student::new(new_student_id(), student_id, name);
    let id = student.id.clone();
    with_workspace(root, |ws| {
        ws.book.add_student(student)?;
        info!(id = %id, student_id, "student added");
        Ok(())
    })?;
    Ok(id)
}

/// Remove a student by internal id or roster key; returns the removed record.
pub fn remove_student(root: &Path, key: &str) -> Result<Student> {
    with_workspace(root, |ws| {
        let removed = ws.book.remove_student(key)?;
        info!(id = %removed.id, "student removed");
        Ok(removed)
    })
}

/// Append every roster row as a new student; returns how many were added.
///
/// `has_header` overrides `[roster] has_header` from the config.
pub fn import_students(root: &Path, file: &Path, has_header: Option<bool>) -> Result<usize> {
    with_workspace(root, |ws| {
        let has_header = has_header.unwrap_or(ws.config.roster.has_header);
        let students = import_roster(file, has_header)?;
        let count = students.len();
        ws.book.append_students(students)?;
        info!(file = %file.display(), count, "roster imported");
        Ok(count)
    })
}

pub fn list_students(root: &Path) -> Result<Vec<StudentSummary>> {
    let ws = Workspace::open(root)?;
    Ok(summaries(&ws.book))
}

/// Neighbour of `key` in roster order, or `None` at either end.
pub fn neighbour(root: &Path, key: &str, step: Step) -> Result<Option<StudentSummary>> {
    let ws = Workspace::open(root)?;
    let next = ws.book.adjacent_student(key, step)?;
    Ok(next.map(|student| summary(&ws.book, student)))
}

pub fn summaries(book: &Gradebook) -> Vec<StudentSummary> {
    book.session()
        .students
        .iter()
        .map(|student| summary(book, student))
        .collect()
}

fn summary(book: &Gradebook, student: &Student) -> StudentSummary {
    StudentSummary {
        id: student.id.clone(),
        student_id: student.student_id.clone(),
        name: student.name.clone(),
        is_submitted: student.is_submitted,
        is_graded: student.is_graded,
        score: score(student, book.total_points(), book.index()),
    }
}
