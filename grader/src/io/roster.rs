//! Roster import from two-column CSV (`studentId,name`).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::error::{CoreError, CoreResult};
use crate::core::types::Student;
use crate::io::ids::new_student_id;

/// One roster row before it becomes a [`Student`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub student_id: String,
    pub name: String,
}

/// Parsed roster rows plus the file lines that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub entries: Vec<RosterEntry>,
    /// 1-based line numbers of rows with an empty student id.
    pub skipped_lines: Vec<u64>,
}

/// Parse roster rows. Column 1 is the student id, column 2 the name;
/// further columns are ignored and rows with an empty id are skipped.
pub fn parse_roster<R: Read>(reader: R, has_header: bool) -> CoreResult<Roster> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut roster = Roster::default();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record
            .map_err(|err| CoreError::MalformedInput(format!("roster row {}: {err}", row + 1)))?;
        let student_id = record.get(0).unwrap_or_default();
        if student_id.is_empty() {
            let line = record.position().map_or(row as u64 + 1, |pos| pos.line());
            roster.skipped_lines.push(line);
            continue;
        }
        roster.entries.push(RosterEntry {
            student_id: student_id.to_string(),
            name: record.get(1).unwrap_or_default().to_string(),
        });
    }
    Ok(roster)
}

/// Map roster rows 1:1 to fresh students, drawing ids from `next_id`.
pub fn students_from_roster<F>(entries: Vec<RosterEntry>, mut next_id: F) -> Vec<Student>
where
    F: FnMut() -> String,
{
    entries
        .into_iter()
        .map(|entry| Student::new(next_id(), entry.student_id, entry.name))
        .collect()
}

/// Read a roster CSV file into new students with generated ids.
pub fn import_roster(path: &Path, has_header: bool) -> Result<Vec<Student>> {
    let file = File::open(path).with_context(|| format!("open roster {}", path.display()))?;
    let roster =
        parse_roster(file, has_header).with_context(|| format!("parse roster {}", path.display()))?;
    if !roster.skipped_lines.is_empty() {
        warn!(
            path = %path.display(),
            lines = ?roster.skipped_lines,
            "roster rows without a student id were skipped"
        );
    }
    debug!(path = %path.display(), rows = roster.entries.len(), "roster parsed");
    Ok(students_from_roster(roster.entries, new_student_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_columns_without_header() {
        let raw = "A001,Ada Lovelace\nA002, Alan Turing \n";
        let entries = parse_roster(raw.as_bytes(), false).expect("parse").entries;
        assert_eq!(
            entries,
            vec![
                RosterEntry {
                    student_id: "A001".to_string(),
                    name: "Ada Lovelace".to_string()
                },
                RosterEntry {
                    student_id: "A002".to_string(),
                    name: "Alan Turing".to_string()
                },
            ]
        );
    }

    #[test]
    fn header_row_is_skipped_when_requested() {
        let raw = "id,name\nA001,Ada\n";
        let entries = parse_roster(raw.as_bytes(), true).expect("parse").entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].student_id, "A001");
    }

    #[test]
    fn tolerates_missing_names_and_blank_ids() {
        let raw = "A001\n,Nobody\nA003,Cy,extra\n";
        let roster = parse_roster(raw.as_bytes(), false).expect("parse");
        let ids: Vec<&str> = roster.entries.iter().map(|e| e.student_id.as_str()).collect();
        assert_eq!(ids, vec!["A001", "A003"]);
        assert_eq!(roster.entries[0].name, "");
        assert_eq!(roster.skipped_lines, vec![2]);
    }

    #[test]
    fn skipped_lines_count_the_header() {
        let raw = "id,name\nA001,Ada\n ,Blank\n";
        let roster = parse_roster(raw.as_bytes(), true).expect("parse");
        assert_eq!(roster.entries.len(), 1);
        assert_eq!(roster.skipped_lines, vec![3]);
    }

    #[test]
    fn roster_students_start_ungraded() {
        let entries = vec![RosterEntry {
            student_id: "A001".to_string(),
            name: "Ada".to_string(),
        }];
        let mut counter = 0;
        let students = students_from_roster(entries, || {
            counter += 1;
            format!("student-{counter}")
        });
        let s = &students[0];
        assert_eq!(s.id, "student-1");
        assert!(s.is_submitted);
        assert!(!s.is_graded);
        assert!(s.registered_deductions.is_empty());
        assert_eq!(s.additional_deduction, 0.0);
    }

    #[test]
    fn import_reads_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("roster.csv");
        std::fs::write(&path, "A001,Ada\nA002,Alan\n").expect("write");
        let students = import_roster(&path, false).expect("import");
        assert_eq!(students.len(), 2);
        assert_ne!(students[0].id, students[1].id);
    }
}
