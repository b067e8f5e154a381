//! Load, mutate and save the working session as one unit.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::core::gradebook::Gradebook;
use crate::io::config::{GraderConfig, load_config};
use crate::io::init::GraderPaths;
use crate::io::session_store::{load_session, write_session};

/// An opened `.grader/` directory: config plus the live gradebook.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub paths: GraderPaths,
    pub config: GraderConfig,
    pub book: Gradebook,
}

impl Workspace {
    /// Open the workspace at `root`; a missing or unusable session starts empty.
    pub fn open(root: &Path) -> Result<Self> {
        let paths = GraderPaths::new(root);
        if !paths.grader_dir.is_dir() {
            return Err(anyhow!(
                "missing directory {} (run `grader init` first)",
                paths.grader_dir.display()
            ));
        }
        let config = load_config(&paths.config_path).context("load config.toml")?;
        let book = load_session(&paths.session_path, config.default_total_points)?;
        Ok(Self {
            paths,
            config,
            book,
        })
    }

    pub fn save(&self) -> Result<()> {
        write_session(&self.paths.session_path, self.book.session())
    }

    pub fn pad_width(&self) -> usize {
        self.config.feedback.pad_width
    }
}

/// Open the workspace, run `op`, and persist only if `op` succeeded.
pub fn with_workspace<T, F>(root: &Path, op: F) -> Result<T>
where
    F: FnOnce(&mut Workspace) -> Result<T>,
{
    let mut workspace = Workspace::open(root)?;
    let value = op(&mut workspace)?;
    workspace.save().context("save session")?;
    debug!(root = %root.display(), "session committed");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CoreError;
    use crate::io::session_store::load_session_strict;
    use crate::test_support::{TestWorkspace, deduction, rubric, student};

    #[test]
    fn open_requires_initialized_layout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = Workspace::open(temp.path()).expect_err("not initialized");
        assert!(err.to_string().contains("grader init"));
    }

    #[test]
    fn failed_operation_does_not_touch_stored_session() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.seed(rubric(vec![deduction("a", 1.0)]), vec![student("s1")])
            .expect("seed");
        let before = std::fs::read_to_string(&ws.paths.session_path).expect("read");

        let result: Result<()> = with_workspace(ws.root(), |workspace| {
            workspace.book.toggle("s1", "a")?;
            Err(CoreError::not_found("deduction 'zz'").into())
        });
        assert!(result.is_err());
        let after = std::fs::read_to_string(&ws.paths.session_path).expect("read");
        assert_eq!(before, after);
    }

    #[test]
    fn successful_operation_is_persisted() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.seed(rubric(vec![deduction("a", 1.0)]), vec![student("s1")])
            .expect("seed");

        with_workspace(ws.root(), |workspace| Ok(workspace.book.toggle("s1", "a")?))
            .expect("toggle");

        let book = load_session_strict(&ws.paths.session_path).expect("load");
        assert!(book.student("s1").expect("s1").is_registered("a"));
    }
}
