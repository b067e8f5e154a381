//! Session-wide commands: total points, results export, backup save/load, clear.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::io::results::export_results;
use crate::io::session_store::{load_session_strict, write_session};
use crate::workspace::{Workspace, with_workspace};

/// Counts reported after an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub rows: usize,
    /// Rows written with empty score and feedback cells.
    pub blank: usize,
}

pub fn total_points(root: &Path) -> Result<f64> {
    Ok(Workspace::open(root)?.book.total_points())
}

pub fn set_total_points(root: &Path, total: f64) -> Result<()> {
    with_workspace(root, |ws| {
        ws.book.set_total_points(total)?;
        info!(total, "total points updated");
        Ok(())
    })
}

/// Write the results CSV for every student in roster order.
///
/// `include_unsubmitted` overrides `[export] include_unsubmitted` from the config.
pub fn export(root: &Path, file: &Path, include_unsubmitted: Option<bool>) -> Result<ExportSummary> {
    let ws = Workspace::open(root)?;
    let include = include_unsubmitted.unwrap_or(ws.config.export.include_unsubmitted);
    let rows = ws.book.result_rows(ws.pad_width(), include);
    export_results(file, &rows).with_context(|| format!("export results to {}", file.display()))?;
    Ok(ExportSummary {
        rows: rows.len(),
        blank: rows.iter().filter(|row| row.score.is_none()).count(),
    })
}

/// Copy the working session to `file`.
pub fn save_backup(root: &Path, file: &Path) -> Result<()> {
    let ws = Workspace::open(root)?;
    write_session(file, ws.book.session())
        .with_context(|| format!("save session to {}", file.display()))?;
    info!(file = %file.display(), "session saved");
    Ok(())
}

/// Replace the working session with the one stored in `file`.
///
/// The file must parse and validate completely; otherwise the working session
/// is left untouched.
pub fn load_backup(root: &Path, file: &Path) -> Result<()> {
    let loaded = load_session_strict(file)?;
    with_workspace(root, |ws| {
        ws.book = loaded;
        info!(file = %file.display(), "session loaded");
        Ok(())
    })
}

/// Drop the rubric and the roster, keeping total points.
pub fn clear(root: &Path) -> Result<()> {
    with_workspace(root, |ws| {
        warn!(students = ws.book.session().students.len(), "clearing session");
        ws.book.clear_all();
        Ok(())
    })
}
