use super::{now, require};
use crate::error::{LedgerError, Result};
use crate::ledger::codes;
use crate::ledger::scoring::{self, ResultRow};
use crate::model::{Exam, MarksEntry, Student};
use crate::store::{fetch_all, set_op, Direction, Query, RecordStore};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

pub fn add_exam<S: RecordStore + ?Sized>(store: &mut S, mut exam: Exam) -> Result<Exam> {
    exam.validate()?;
    exam.id = codes::new_document_id();
    exam.created_at = Some(now());
    store.batch_write(vec![set_op(&exam)?])?;
    info!(exam_id = %exam.id, grade = %exam.grade, subjects = exam.subjects.len(), "exam added");
    Ok(exam)
}

pub fn list_exams<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<Exam>> {
    fetch_all(store, &Query::new().order_by("createdAt", Direction::Desc))
}

/// Latest exam date first.
pub fn exams_by_grade<S: RecordStore + ?Sized>(store: &S, grade: &str) -> Result<Vec<Exam>> {
    fetch_all(
        store,
        &Query::new()
            .eq("grade", grade)
            .order_by("date", Direction::Desc),
    )
}

pub fn get_exam<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Exam> {
    require(store, id)
}

/// One mark as entered on the marks sheet. `max_marks` defaults to the exam's.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksInput {
    pub exam_id: String,
    pub student_id: String,
    #[serde(default)]
    pub student_name: String,
    pub subject: String,
    pub marks_obtained: f64,
    #[serde(default)]
    pub max_marks: Option<f64>,
}

/// Validates every entry, then writes them in one batch. Entries are keyed by
/// exam, student and subject, so saving the sheet again overwrites in place.
pub fn save_marks<S: RecordStore + ?Sized>(
    store: &mut S,
    inputs: Vec<MarksInput>,
) -> Result<Vec<MarksEntry>> {
    let mut exams: HashMap<String, Exam> = HashMap::new();
    let created_at = now();
    let mut saved: Vec<MarksEntry> = Vec::with_capacity(inputs.len());
    let mut slots: HashMap<String, usize> = HashMap::new();

    for input in inputs {
        if !exams.contains_key(&input.exam_id) {
            let exam = get_exam(store, &input.exam_id)?;
            exams.insert(input.exam_id.clone(), exam);
        }
        let exam = exams
            .get(&input.exam_id)
            .ok_or_else(|| LedgerError::not_found("exams", input.exam_id.as_str()))?;

        if !exam.has_subject(&input.subject) {
            return Err(LedgerError::InvalidRecord(format!(
                "subject {} is not part of exam {}",
                input.subject, exam.name
            )));
        }
        if input.student_id.trim().is_empty() {
            return Err(LedgerError::InvalidRecord("marks studentId is required".into()));
        }
        let max_marks = input.max_marks.unwrap_or(exam.max_marks);
        scoring::validate_marks(input.marks_obtained, max_marks)?;

        let entry = MarksEntry {
            id: codes::marks_entry_id(&input.exam_id, &input.student_id, &input.subject),
            exam_id: input.exam_id,
            student_id: input.student_id,
            student_name: input.student_name,
            subject: input.subject,
            marks_obtained: input.marks_obtained,
            max_marks,
            created_at: Some(created_at),
        };
        // A repeated exam/student/subject in one sheet keeps the later mark.
        match slots.get(&entry.id) {
            Some(&i) => saved[i] = entry,
            None => {
                slots.insert(entry.id.clone(), saved.len());
                saved.push(entry);
            }
        }
    }

    let ops = saved.iter().map(set_op).collect::<Result<Vec<_>>>()?;
    store.batch_write(ops)?;
    info!(count = saved.len(), "marks saved");
    Ok(saved)
}

pub fn marks_by_exam<S: RecordStore + ?Sized>(store: &S, exam_id: &str) -> Result<Vec<MarksEntry>> {
    fetch_all(store, &Query::new().eq("examId", exam_id))
}

pub fn marks_by_student<S: RecordStore + ?Sized>(
    store: &S,
    student_id: &str,
) -> Result<Vec<MarksEntry>> {
    fetch_all(store, &Query::new().eq("studentId", student_id))
}

/// Totals, percentage, grade and pass status for every active student in the
/// exam's grade, by name.
pub fn exam_result_sheet<S: RecordStore + ?Sized>(
    store: &S,
    exam_id: &str,
    passing_percentage: i64,
) -> Result<Vec<ResultRow>> {
    let exam = get_exam(store, exam_id)?;
    let students: Vec<Student> = fetch_all(
        store,
        &Query::new()
            .eq("grade", exam.grade.as_str())
            .order_by("fullName", Direction::Asc),
    )?;
    let entries = marks_by_exam(store, exam_id)?;
    debug!(exam_id, students = students.len(), entries = entries.len(), "building result sheet");
    Ok(scoring::result_sheet(&exam, &students, &entries, passing_percentage))
}
