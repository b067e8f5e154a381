//! Rubric-tree grading core.
//!
//! A session holds a hierarchical rubric of deductions and a roster of
//! students. Each student selects deductions from the rubric; the crate keeps
//! the selections consistent with the tree, computes scores and renders
//! feedback text. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (path index, toggling, scoring,
//!   feedback, structural edits). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (session and config files, rubric
//!   JSON, roster and results CSV).
//!
//! Orchestration modules ([`structure`], [`grading`], [`students`],
//! [`report`], [`validate`]) open the [`workspace`], apply core logic and
//! persist the result to implement CLI commands.

pub mod core;
pub mod exit_codes;
pub mod grading;
pub mod io;
pub mod logging;
pub mod report;
pub mod rubric;
pub mod structure;
pub mod students;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
pub mod workspace;
