//! Validation of the `.grader/` layout, config and stored session.

use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::io::config::load_config;
use crate::io::init::GraderPaths;
use crate::io::session_store::load_session_strict;

/// Counts reported by a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOutcome {
    /// Rubric nodes, root excluded.
    pub deductions: usize,
    pub students: usize,
    pub registrations: usize,
}

/// Validate layout, config and session without falling back to defaults.
pub fn validate_grader(root: &Path) -> Result<ValidateOutcome> {
    let paths = GraderPaths::new(root);

    ensure_dir(&paths.grader_dir)?;
    ensure_file(&paths.config_path)?;
    ensure_file(&paths.session_path)?;

    load_config(&paths.config_path).with_context(|| "load config.toml")?;
    let book = load_session_strict(&paths.session_path).with_context(|| "load session.json")?;

    let students = &book.session().students;
    Ok(ValidateOutcome {
        deductions: book.index().len().saturating_sub(1),
        students: students.len(),
        registrations: students
            .iter()
            .map(|student| student.registered_deductions.len())
            .sum(),
    })
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("missing directory {}", path.display()));
    }
    if !path.is_dir() {
        return Err(anyhow!("expected directory {}", path.display()));
    }
    Ok(())
}

fn ensure_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("missing file {}", path.display()));
    }
    if !path.is_file() {
        return Err(anyhow!("expected file {}", path.display()));
    }
    Ok(())
}
