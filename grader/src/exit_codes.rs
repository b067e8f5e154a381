//! Stable exit codes for grader CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid layout, config, input file or arguments, or any other failure.
pub const INVALID: i32 = 1;
/// A named student, deduction or path does not exist.
pub const NOT_FOUND: i32 = 2;
/// The change was refused because it would break a session invariant
/// (e.g. selecting a deduction whose ancestor is already selected).
pub const REFUSED: i32 = 3;
