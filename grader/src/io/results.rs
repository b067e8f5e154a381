//! Results export as CSV (`studentId,name,score,feedback`).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::core::gradebook::ResultRow;

const HEADER: [&str; 4] = ["studentId", "name", "score", "feedback"];

/// Write result rows; `None` cells are left empty.
pub fn write_results<W: Write>(writer: W, rows: &[ResultRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER).context("write header")?;
    for row in rows {
        let score = row.score.map(|score| score.to_string()).unwrap_or_default();
        let feedback = row.feedback.as_deref().unwrap_or_default();
        csv_writer
            .write_record([row.student_id.as_str(), row.name.as_str(), score.as_str(), feedback])
            .with_context(|| format!("write row for {}", row.student_id))?;
    }
    csv_writer.flush().context("flush results")?;
    Ok(())
}

pub fn export_results(path: &Path, rows: &[ResultRow]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_results(file, rows)?;
    info!(path = %path.display(), rows = rows.len(), "results exported");
    Ok(())
}
