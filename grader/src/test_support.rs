//! Test-only helpers for building rubrics, students and scratch workspaces.

use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::types::{Session, Student};
use crate::io::init::{GraderPaths, InitOptions, init_grader};
use crate::io::session_store::write_session;
use crate::rubric::{DeductionNode, default_rubric};

/// Create a deterministic leaf deduction.
pub fn deduction(id: &str, points: f64) -> DeductionNode {
    DeductionNode::new(
        id,
        format!("{id} description"),
        points,
        format!("{id} feedback"),
    )
}

/// Create a deduction with children using deterministic defaults.
pub fn deduction_with_children(id: &str, points: f64, children: Vec<DeductionNode>) -> DeductionNode {
    DeductionNode {
        children,
        ..deduction(id, points)
    }
}

/// Sentinel root holding `children`.
pub fn rubric(children: Vec<DeductionNode>) -> DeductionNode {
    DeductionNode {
        children,
        ..default_rubric()
    }
}

/// Fresh submitted student whose roster key mirrors its id.
pub fn student(id: &str) -> Student {
    Student::new(id, id, format!("{id} name"))
}

/// Registered deduction ids in stored order.
pub fn registered_ids(student: &Student) -> Vec<&str> {
    student
        .registered_deductions
        .iter()
        .map(|entry| entry.deduction_id.as_str())
        .collect()
}

pub fn child_ids(node: &DeductionNode) -> Vec<&str> {
    node.children.iter().map(|child| child.id.as_str()).collect()
}

/// Temporary directory with an initialized `.grader/` layout.
pub struct TestWorkspace {
    dir: TempDir,
    pub paths: GraderPaths,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create tempdir")?;
        let paths = init_grader(dir.path(), &InitOptions { force: false })?;
        Ok(Self { dir, paths })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Overwrite the stored session.
    pub fn write_session(&self, session: &Session) -> Result<()> {
        write_session(&self.paths.session_path, session)
    }

    /// Store a session built from `tree` and `students` with 100 total points.
    pub fn seed(&self, tree: DeductionNode, students: Vec<Student>) -> Result<()> {
        let mut session = Session::default();
        session.rubric_tree = tree;
        session.students = students;
        self.write_session(&session)
    }
}
