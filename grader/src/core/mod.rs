//! Deterministic, pure logic for rubric grading.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod error;
pub mod feedback;
pub mod gradebook;
pub mod index;
pub mod invariants;
pub mod mutate;
pub mod path;
pub mod score;
pub mod toggle;
pub mod types;
