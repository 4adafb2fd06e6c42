use super::{delete_record, now, patch_record, require};
use crate::config::CodesConfig;
use crate::error::Result;
use crate::ledger::codes;
use crate::model::Student;
use crate::store::{fetch_all, set_op, Direction, Query, RecordStore};
use serde_json::Value;
use tracing::info;

/// Scans every stored student code and returns the next one in sequence.
pub fn next_student_code<S: RecordStore + ?Sized>(store: &S, cfg: &CodesConfig) -> Result<String> {
    let students: Vec<Student> = fetch_all(store, &Query::new())?;
    Ok(codes::next_student_code(
        students.iter().filter_map(|s| s.student_code.as_deref()),
        cfg,
    ))
}

/// Stores a new student under a fresh id with the next student code.
pub fn add_student<S: RecordStore + ?Sized>(
    store: &mut S,
    mut student: Student,
    cfg: &CodesConfig,
) -> Result<Student> {
    student.validate()?;
    student.id = codes::new_document_id();
    student.student_code = Some(next_student_code(store, cfg)?);
    student.created_at = Some(now());
    store.batch_write(vec![set_op(&student)?])?;
    info!(
        student_id = %student.id,
        code = student.student_code.as_deref().unwrap_or(""),
        "student added"
    );
    Ok(student)
}

/// Newest first.
pub fn list_students<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<Student>> {
    fetch_all(store, &Query::new().order_by("createdAt", Direction::Desc))
}

/// Students of one grade, by full name.
pub fn list_students_by_grade<S: RecordStore + ?Sized>(
    store: &S,
    grade: &str,
) -> Result<Vec<Student>> {
    fetch_all(
        store,
        &Query::new()
            .eq("grade", grade)
            .order_by("fullName", Direction::Asc),
    )
}

pub fn get_student<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Student> {
    require(store, id)
}

pub fn update_student<S: RecordStore + ?Sized>(
    store: &mut S,
    id: &str,
    patch: &Value,
) -> Result<Student> {
    patch_record(store, id, patch, Student::validate)
}

pub fn delete_student<S: RecordStore + ?Sized>(store: &mut S, id: &str) -> Result<()> {
    delete_record::<Student, S>(store, id)?;
    info!(student_id = %id, "student deleted");
    Ok(())
}
