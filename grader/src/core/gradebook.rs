//! The session aggregate with an always-fresh index.
//!
//! `Gradebook` is the only way the rest of the crate mutates a [`Session`].
//! Each operation computes the complete next state first and swaps it in only
//! when every step succeeded, so a failed operation leaves both the session
//! and the index exactly as they were. Structural edits rebuild the index
//! and reconcile student registrations before the swap.

use crate::core::error::{CoreError, CoreResult};
use crate::core::feedback::render_with_width;
use crate::core::index::TreeIndex;
use crate::core::invariants::{validate_rubric, validate_session};
use crate::core::mutate;
use crate::core::path::NodePath;
use crate::core::score;
use crate::core::toggle;
use crate::core::types::{Direction, Score, Session, Step, Student};
use crate::rubric::{DeductionNode, default_rubric};

/// One exported result line.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub student_id: String,
    pub name: String,
    /// `None` for students who did not submit.
    pub score: Option<f64>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradebook {
    session: Session,
    index: TreeIndex,
}

impl Gradebook {
    /// Wrap a session after checking its invariants.
    pub fn new(session: Session) -> CoreResult<Self> {
        let index = TreeIndex::build(&session.rubric_tree);
        let errors = validate_session(&session, &index);
        if !errors.is_empty() {
            return Err(CoreError::MalformedInput(errors.join("; ")));
        }
        Ok(Self { session, index })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn index(&self) -> &TreeIndex {
        &self.index
    }

    pub fn total_points(&self) -> f64 {
        self.session.total_points
    }

    pub fn insert_node(&mut self, parent_path: &NodePath, node: DeductionNode) -> CoreResult<()> {
        let tree = mutate::insert(&self.session.rubric_tree, parent_path, node)?;
        self.commit_tree(tree).map(|_| ())
    }

    pub fn edit_node(
        &mut self,
        id: &str,
        description: &str,
        points: f64,
        default_feedback: &str,
    ) -> CoreResult<()> {
        let tree = mutate::edit(
            &self.session.rubric_tree,
            id,
            description,
            points,
            default_feedback,
        )?;
        self.commit_tree(tree).map(|_| ())
    }

    /// Delete node `id` and its subtree; returns how many registrations were pruned.
    pub fn delete_node(&mut self, id: &str) -> CoreResult<usize> {
        let tree = mutate::delete(&self.session.rubric_tree, id)?;
        self.commit_tree(tree)
    }

    pub fn move_node(&mut self, path: &NodePath, direction: Direction) -> CoreResult<()> {
        let tree = mutate::move_node(&self.session.rubric_tree, path, direction)?;
        self.commit_tree(tree).map(|_| ())
    }

    /// Swap in an imported rubric; returns how many registrations were pruned.
    pub fn replace_rubric(&mut self, tree: DeductionNode) -> CoreResult<usize> {
        self.commit_tree(tree)
    }

    pub fn set_total_points(&mut self, total_points: f64) -> CoreResult<()> {
        if !total_points.is_finite() || total_points < 0.0 {
            return Err(CoreError::MalformedInput(format!(
                "total points must be a non-negative number, got {total_points}"
            )));
        }
        self.session.total_points = total_points;
        Ok(())
    }

    /// Drop the rubric and every student; total points are kept.
    pub fn clear_all(&mut self) {
        let session = Session {
            total_points: self.session.total_points,
            rubric_tree: default_rubric(),
            students: Vec::new(),
        };
        self.index = TreeIndex::build(&session.rubric_tree);
        self.session = session;
    }

    /// Rebuild the index for `tree`, prune dangling registrations against the
    /// new index, then swap everything in at once.
    fn commit_tree(&mut self, tree: DeductionNode) -> CoreResult<usize> {
        let errors = validate_rubric(&tree);
        if !errors.is_empty() {
            return Err(CoreError::InvariantViolation(errors.join("; ")));
        }
        let index = TreeIndex::build(&tree);
        let mut students = self.session.students.clone();
        let pruned = prune_registrations(&mut students, &index);

        self.session.rubric_tree = tree;
        self.session.students = students;
        self.index = index;
        Ok(pruned)
    }

    pub fn add_student(&mut self, student: Student) -> CoreResult<()> {
        self.append_students(vec![student])
    }

    /// Append students to the roster; all or none are added.
    pub fn append_students(&mut self, students: Vec<Student>) -> CoreResult<()> {
        let mut next = self.session.students.clone();
        for student in students {
            if next.iter().any(|existing| existing.id == student.id) {
                return Err(CoreError::InvariantViolation(format!(
                    "duplicate student id '{}'",
                    student.id
                )));
            }
            next.push(student);
        }
        self.session.students = next;
        Ok(())
    }

    pub fn remove_student(&mut self, key: &str) -> CoreResult<Student> {
        let position = self.position(key)?;
        Ok(self.session.students.remove(position))
    }

    /// Look up a student by internal id, falling back to the roster key.
    pub fn student(&self, key: &str) -> CoreResult<&Student> {
        self.position(key).map(|position| &self.session.students[position])
    }

    /// The previous/next student in roster order, if any.
    pub fn adjacent_student(&self, key: &str, step: Step) -> CoreResult<Option<&Student>> {
        let position = self.position(key)?;
        let target = match step {
            Step::Prev => position.checked_sub(1),
            Step::Next => Some(position + 1),
        };
        Ok(target.and_then(|target| self.session.students.get(target)))
    }

    fn position(&self, key: &str) -> CoreResult<usize> {
        self.session
            .student_position(key)
            .or_else(|| {
                self.session
                    .students
                    .iter()
                    .position(|student| student.student_id == key)
            })
            .ok_or_else(|| CoreError::not_found(format!("student '{key}'")))
    }

    pub fn toggle(&mut self, key: &str, deduction_id: &str) -> CoreResult<()> {
        self.update_student(key, |student, index| {
            toggle::toggle(student, deduction_id, index)
        })
    }

    pub fn set_feedback(&mut self, key: &str, deduction_id: &str, text: &str) -> CoreResult<()> {
        self.update_student(key, |student, _| {
            toggle::set_feedback(student, deduction_id, text)
        })
    }

    pub fn reset_feedback(&mut self, key: &str, deduction_id: &str) -> CoreResult<()> {
        self.update_student(key, |student, index| {
            toggle::reset_feedback(student, deduction_id, index)
        })
    }

    pub fn set_additional_deduction(&mut self, key: &str, points: f64) -> CoreResult<()> {
        if !points.is_finite() {
            return Err(CoreError::MalformedInput(format!(
                "additional deduction must be a number, got {points}"
            )));
        }
        self.update_student(key, |student, _| {
            Ok(Student {
                additional_deduction: points,
                ..student.clone()
            })
        })
    }

    pub fn set_additional_feedback(&mut self, key: &str, text: &str) -> CoreResult<()> {
        self.update_student(key, |student, _| {
            Ok(Student {
                additional_feedback: text.to_string(),
                ..student.clone()
            })
        })
    }

    pub fn set_submitted(&mut self, key: &str, submitted: bool) -> CoreResult<()> {
        self.update_student(key, |student, _| {
            Ok(Student {
                is_submitted: submitted,
                ..student.clone()
            })
        })
    }

    pub fn set_graded(&mut self, key: &str, graded: bool) -> CoreResult<()> {
        self.update_student(key, |student, _| {
            Ok(Student {
                is_graded: graded,
                ..student.clone()
            })
        })
    }

    fn update_student<F>(&mut self, key: &str, update: F) -> CoreResult<()>
    where
        F: FnOnce(&Student, &TreeIndex) -> CoreResult<Student>,
    {
        let position = self.position(key)?;
        let next = update(&self.session.students[position], &self.index)?;
        self.session.students[position] = next;
        Ok(())
    }

    pub fn score(&self, key: &str) -> CoreResult<Score> {
        let student = self.student(key)?;
        Ok(score::score(student, self.session.total_points, &self.index))
    }

    pub fn render(&self, key: &str, pad_width: usize) -> CoreResult<String> {
        let student = self.student(key)?;
        Ok(render_with_width(student, &self.index, pad_width))
    }

    /// One row per student in roster order.
    ///
    /// Students who did not submit get empty cells unless
    /// `include_unsubmitted` is set.
    pub fn result_rows(&self, pad_width: usize, include_unsubmitted: bool) -> Vec<ResultRow> {
        self.session
            .students
            .iter()
            .map(|student| {
                let graded = student.is_submitted || include_unsubmitted;
                ResultRow {
                    student_id: student.student_id.clone(),
                    name: student.name.clone(),
                    score: graded.then(|| {
                        score::score(student, self.session.total_points, &self.index).clamped
                    }),
                    feedback: graded.then(|| {
                        render_with_width(student, &self.index, pad_width)
                            .trim()
                            .to_string()
                    }),
                }
            })
            .collect()
    }
}

impl Default for Gradebook {
    fn default() -> Self {
        let session = Session::default();
        let index = TreeIndex::build(&session.rubric_tree);
        Self { session, index }
    }
}

/// Drop every registration whose deduction no longer resolves in `index`.
///
/// `index` must be built from the tree the students will be paired with;
/// pruning against a stale index would keep dangling references alive.
pub fn prune_registrations(students: &mut [Student], index: &TreeIndex) -> usize {
    let mut pruned = 0;
    for student in students.iter_mut() {
        let before = student.registered_deductions.len();
        student
            .registered_deductions
            .retain(|entry| index.contains(&entry.deduction_id));
        pruned += before - student.registered_deductions.len();
    }
    pruned
}
