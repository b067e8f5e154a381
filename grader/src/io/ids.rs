//! Fresh identifiers for students and rubric nodes.

use uuid::Uuid;

pub fn new_student_id() -> String {
    format!("student-{}", Uuid::new_v4())
}

pub fn new_deduction_id() -> String {
    format!("deduction-{}", Uuid::new_v4())
}
