//! Layout of the `.grader/` directory and its scaffolding.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::info;

use super::config::{GraderConfig, write_config};
use super::session_store::write_session;
use crate::core::types::Session;

/// All canonical paths within `.grader/` for a project root.
#[derive(Debug, Clone)]
pub struct GraderPaths {
    pub root: PathBuf,
    pub grader_dir: PathBuf,
    /// Fixed storage key for the persisted session.
    pub session_path: PathBuf,
    pub config_path: PathBuf,
}

impl GraderPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let grader_dir = root.join(".grader");
        Self {
            root,
            session_path: grader_dir.join("session.json"),
            config_path: grader_dir.join("config.toml"),
            grader_dir,
        }
    }
}

/// Options for `init_grader`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite an existing session and config.
    pub force: bool,
}

/// Create `.grader/` with a default config and an empty session.
///
/// Fails if `.grader/` already exists unless `options.force` is set.
pub fn init_grader(root: &Path, options: &InitOptions) -> Result<GraderPaths> {
    let paths = GraderPaths::new(root);
    if paths.grader_dir.exists() && !paths.grader_dir.is_dir() {
        return Err(anyhow!("grader init: .grader exists but is not a directory"));
    }
    if paths.grader_dir.exists() && !options.force {
        return Err(anyhow!(
            "grader init: .grader already exists (use --force to overwrite)"
        ));
    }

    fs::create_dir_all(&paths.grader_dir)
        .with_context(|| format!("create directory {}", paths.grader_dir.display()))?;

    let config = GraderConfig::default();
    write_config(&paths.config_path, &config)?;
    write_session(
        &paths.session_path,
        &Session::with_total_points(config.default_total_points),
    )?;

    info!(root = %root.display(), "initialized grader workspace");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::load_config;
    use crate::io::session_store::load_session_strict;

    #[test]
    fn init_creates_expected_layout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = init_grader(temp.path(), &InitOptions { force: false }).expect("init");

        assert!(paths.grader_dir.is_dir());
        assert!(paths.session_path.is_file());
        assert!(paths.config_path.is_file());

        let book = load_session_strict(&paths.session_path).expect("session");
        assert_eq!(book.session(), &Session::default());
        assert_eq!(
            load_config(&paths.config_path).expect("config"),
            GraderConfig::default()
        );
    }

    #[test]
    fn init_without_force_refuses_existing_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        init_grader(temp.path(), &InitOptions { force: false }).expect("init");
        let err = init_grader(temp.path(), &InitOptions { force: false }).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn init_with_force_resets_session() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = init_grader(temp.path(), &InitOptions { force: false }).expect("init");
        fs::write(&paths.session_path, "{\"garbage\": true}").expect("write");

        init_grader(temp.path(), &InitOptions { force: true }).expect("re-init");
        let book = load_session_strict(&paths.session_path).expect("session");
        assert_eq!(book.session(), &Session::default());
    }
}
