//! Rubric-tree grader.
//!
//! Keeps a grading session (`.grader/session.json`): a tree of deductions, a
//! roster of students and each student's selected deductions. Every command
//! loads the session, applies one change and writes it back.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use grader::core::error::CoreError;
use grader::core::path::NodePath;
use grader::core::types::{Direction, Step};
use grader::exit_codes;
use grader::grading::{self, CheckState, StudentView};
use grader::io::init::{InitOptions, init_grader};
use grader::logging;
use grader::report;
use grader::structure::{self, DeductionEdit, NewDeduction};
use grader::students::{self, StudentSummary};
use grader::validate::validate_grader;
use grader::workspace::Workspace;

#[derive(Parser)]
#[command(
    name = "grader",
    version,
    about = "Grade submissions against a hierarchical deduction rubric"
)]
struct Cli {
    /// Directory containing `.grader/`.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Log debug diagnostics to stderr (`RUST_LOG` overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.grader/` with a default config and an empty session.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Check config and session against the schema and invariants.
    Validate,
    /// Inspect and edit the rubric tree.
    #[command(subcommand)]
    Rubric(RubricCommand),
    /// Manage the roster.
    #[command(subcommand)]
    Student(StudentCommand),
    /// Grade one student.
    #[command(subcommand)]
    Grade(GradeCommand),
    /// Print total points, or set them when a value is given.
    Total { points: Option<f64> },
    /// Write the results CSV.
    Export {
        file: PathBuf,
        /// Also score students marked as not submitted.
        #[arg(long)]
        include_unsubmitted: bool,
    },
    /// Copy the session to a backup file.
    Save { file: PathBuf },
    /// Replace the session with a backup file.
    Load { file: PathBuf },
    /// Remove the rubric and every student.
    Clear {
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum RubricCommand {
    /// Print the rubric outline.
    Show,
    /// Append a deduction under `--parent` (default: root).
    Add {
        #[arg(long, default_value = "root")]
        parent: NodePath,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        description: String,
        #[arg(long)]
        points: f64,
        #[arg(long, default_value = "")]
        feedback: String,
    },
    /// Change fields of a deduction; omitted fields are kept.
    Edit {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        points: Option<f64>,
        #[arg(long)]
        feedback: Option<String>,
    },
    /// Delete a deduction and its subtree.
    Delete { id: String },
    /// Swap a deduction with its previous or next sibling.
    Move {
        path: NodePath,
        #[arg(value_enum)]
        direction: MoveDirection,
    },
    /// Write the rubric to a JSON file.
    Export { file: PathBuf },
    /// Replace the rubric from a JSON file.
    Import { file: PathBuf },
}

#[derive(Subcommand)]
enum StudentCommand {
    List,
    Add { student_id: String, name: String },
    Remove { student: String },
    /// Append students from a `studentId,name` CSV file.
    Import {
        file: PathBuf,
        /// Skip the first row (overrides config).
        #[arg(long, conflicts_with = "no_header")]
        header: bool,
        #[arg(long)]
        no_header: bool,
    },
    Next { student: String },
    Prev { student: String },
}

#[derive(Subcommand)]
enum GradeCommand {
    /// Select or deselect a deduction.
    Toggle { student: String, deduction: String },
    /// Set the feedback text of a selected deduction.
    Feedback {
        student: String,
        deduction: String,
        text: String,
    },
    /// Restore a selected deduction's default feedback.
    ResetFeedback { student: String, deduction: String },
    /// Set the additional deduction (negative values add points).
    Adjust {
        student: String,
        #[arg(allow_negative_numbers = true)]
        points: f64,
    },
    /// Set the additional feedback text.
    Note { student: String, text: String },
    Submitted {
        student: String,
        #[arg(action = ArgAction::Set)]
        value: bool,
    },
    Graded {
        student: String,
        #[arg(action = ArgAction::Set)]
        value: bool,
    },
    /// Print score, checklist and feedback.
    Show { student: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum MoveDirection {
    Up,
    Down,
}

impl From<MoveDirection> for Direction {
    fn from(direction: MoveDirection) -> Self {
        match direction {
            MoveDirection::Up => Direction::Up,
            MoveDirection::Down => Direction::Down,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{err:#}");
        std::process::exit(exit_code(&err));
    }
}

/// Map an error to its exit code via the underlying [`CoreError`], if any.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CoreError>() {
        Some(CoreError::NotFound { .. }) => exit_codes::NOT_FOUND,
        Some(CoreError::InvariantViolation(_)) => exit_codes::REFUSED,
        _ => exit_codes::INVALID,
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = cli.root.as_path();
    match cli.command {
        Command::Init { force } => {
            let paths = init_grader(root, &InitOptions { force })?;
            println!("initialized {}", paths.grader_dir.display());
        }
        Command::Validate => {
            let outcome = validate_grader(root)?;
            println!(
                "ok: {} deductions, {} students, {} registrations",
                outcome.deductions, outcome.students, outcome.registrations
            );
        }
        Command::Rubric(command) => run_rubric(root, command)?,
        Command::Student(command) => run_student(root, command)?,
        Command::Grade(command) => run_grade(root, command)?,
        Command::Total { points } => match points {
            Some(points) => report::set_total_points(root, points)?,
            None => println!("{}", report::total_points(root)?),
        },
        Command::Export {
            file,
            include_unsubmitted,
        } => {
            let summary = report::export(root, &file, include_unsubmitted.then_some(true))?;
            println!(
                "exported {} rows ({} blank) to {}",
                summary.rows,
                summary.blank,
                file.display()
            );
        }
        Command::Save { file } => report::save_backup(root, &file)?,
        Command::Load { file } => report::load_backup(root, &file)?,
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to clear the session without --yes");
            }
            report::clear(root)?;
        }
    }
    Ok(())
}

fn run_rubric(root: &Path, command: RubricCommand) -> Result<()> {
    match command {
        RubricCommand::Show => {
            let ws = Workspace::open(root)?;
            for line in structure::outline(&ws.book) {
                println!("{line}");
            }
        }
        RubricCommand::Add {
            parent,
            id,
            description,
            points,
            feedback,
        } => {
            let new = NewDeduction {
                id,
                description,
                points,
                feedback,
            };
            println!("{}", structure::add_deduction(root, &parent, new)?);
        }
        RubricCommand::Edit {
            id,
            description,
            points,
            feedback,
        } => {
            let edit = DeductionEdit {
                description,
                points,
                feedback,
            };
            structure::edit_deduction(root, &id, edit)?;
        }
        RubricCommand::Delete { id } => {
            let pruned = structure::delete_deduction(root, &id)?;
            println!("deleted {id} ({pruned} registrations removed)");
        }
        RubricCommand::Move { path, direction } => {
            let moved = structure::move_deduction(root, &path, direction.into())?;
            println!("{moved}");
        }
        RubricCommand::Export { file } => structure::export_rubric_file(root, &file)?,
        RubricCommand::Import { file } => {
            let pruned = structure::import_rubric_file(root, &file)?;
            println!("imported {} ({pruned} registrations removed)", file.display());
        }
    }
    Ok(())
}

fn run_student(root: &Path, command: StudentCommand) -> Result<()> {
    match command {
        StudentCommand::List => {
            for summary in students::list_students(root)? {
                print_summary(&summary);
            }
        }
        StudentCommand::Add { student_id, name } => {
            println!("{}", students::add_student(root, &student_id, &name)?);
        }
        StudentCommand::Remove { student } => {
            let removed = students::remove_student(root, &student)?;
            println!("removed {} {}", removed.student_id, removed.name);
        }
        StudentCommand::Import {
            file,
            header,
            no_header,
        } => {
            let has_header = match (header, no_header) {
                (true, _) => Some(true),
                (false, true) => Some(false),
                (false, false) => None,
            };
            let count = students::import_students(root, &file, has_header)?;
            println!("imported {count} students");
        }
        StudentCommand::Next { student } => print_neighbour(root, &student, Step::Next)?,
        StudentCommand::Prev { student } => print_neighbour(root, &student, Step::Prev)?,
    }
    Ok(())
}

fn run_grade(root: &Path, command: GradeCommand) -> Result<()> {
    match command {
        GradeCommand::Toggle { student, deduction } => {
            let outcome = grading::toggle_deduction(root, &student, &deduction)?;
            let verb = if outcome.registered {
                "selected"
            } else {
                "deselected"
            };
            println!("{verb} {deduction}; score {}", outcome.score.clamped);
        }
        GradeCommand::Feedback {
            student,
            deduction,
            text,
        } => grading::set_feedback(root, &student, &deduction, &text)?,
        GradeCommand::ResetFeedback { student, deduction } => {
            grading::reset_feedback(root, &student, &deduction)?;
        }
        GradeCommand::Adjust { student, points } => {
            let score = grading::set_additional_deduction(root, &student, points)?;
            println!("score {}", score.clamped);
        }
        GradeCommand::Note { student, text } => {
            grading::set_additional_feedback(root, &student, &text)?;
        }
        GradeCommand::Submitted { student, value } => {
            grading::set_submitted(root, &student, value)?;
        }
        GradeCommand::Graded { student, value } => grading::set_graded(root, &student, value)?,
        GradeCommand::Show { student } => print_view(&grading::show_student(root, &student)?),
    }
    Ok(())
}

fn print_neighbour(root: &Path, student: &str, step: Step) -> Result<()> {
    match students::neighbour(root, student, step)? {
        Some(summary) => print_summary(&summary),
        None => println!("(none)"),
    }
    Ok(())
}

fn print_summary(summary: &StudentSummary) {
    let submitted = if summary.is_submitted { "" } else { " [not submitted]" };
    let graded = if summary.is_graded { " [graded]" } else { "" };
    let raw = if summary.score.is_below_zero() {
        format!(" (raw {})", summary.score.raw)
    } else {
        String::new()
    };
    println!(
        "{}\t{}\t{}\t{}{raw}{submitted}{graded}",
        summary.id, summary.student_id, summary.name, summary.score.clamped
    );
}

fn print_view(view: &StudentView) {
    let student = &view.student;
    println!("{} {}", student.student_id, student.name);
    if view.score.is_below_zero() {
        println!(
            "score: {} / {} (raw {})",
            view.score.clamped, view.total_points, view.score.raw
        );
    } else {
        println!("score: {} / {}", view.score.clamped, view.total_points);
    }
    println!();
    for row in &view.checklist {
        let mark = match row.state {
            CheckState::Checked => "[x]",
            CheckState::Unchecked => "[ ]",
            CheckState::Disabled => "[-]",
        };
        println!(
            "{}{mark} {} (-{}) {}",
            "  ".repeat(row.depth),
            row.id,
            row.points,
            row.description
        );
    }
    println!();
    println!("{}", view.feedback);
}
