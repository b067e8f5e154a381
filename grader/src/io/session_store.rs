//! Session persistence (`.grader/session.json` and backup files).
//!
//! Loading follows parse, then validate, then commit: nothing is handed to the
//! caller unless the whole file parsed and passed the invariant checks.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::error::{CoreError, CoreResult};
use crate::core::gradebook::Gradebook;
use crate::core::types::Session;

/// Parse and validate a serialized session.
pub fn parse_session(raw: &str) -> CoreResult<Gradebook> {
    let session: Session = serde_json::from_str(raw)
        .map_err(|err| CoreError::MalformedInput(format!("session json: {err}")))?;
    Gradebook::new(session)
}

/// Load the working session, falling back to an empty one.
///
/// A missing or malformed file yields `Session::with_total_points(default_total)`;
/// only unreadable files (permissions, I/O) are errors.
pub fn load_session(path: &Path, default_total: f64) -> Result<Gradebook> {
    let fallback = || {
        Gradebook::new(Session::with_total_points(default_total))
            .context("build default session")
    };
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no stored session, starting empty");
            return fallback();
        }
        Err(err) => {
            return Err(err).with_context(|| format!("read session {}", path.display()));
        }
    };
    match parse_session(&raw) {
        Ok(book) => {
            debug!(
                path = %path.display(),
                students = book.session().students.len(),
                nodes = book.index().len(),
                "session loaded"
            );
            Ok(book)
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "stored session unusable, starting empty");
            fallback()
        }
    }
}

/// Load a session file and fail on any problem.
pub fn load_session_strict(path: &Path) -> Result<Gradebook> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read session {}", path.display()))?;
    parse_session(&raw).with_context(|| format!("load session {}", path.display()))
}

/// Atomically write the session as pretty JSON.
pub fn write_session(path: &Path, session: &Session) -> Result<()> {
    debug!(path = %path.display(), students = session.students.len(), "writing session");
    let mut buf = serde_json::to_string_pretty(session).context("serialize session")?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}
