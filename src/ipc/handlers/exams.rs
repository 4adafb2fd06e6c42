use crate::ipc::helpers::{
    get_optional_str, get_required_str, parse_params, respond, store_mut, store_ref, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Exam;
use crate::services::marks::{self, MarksInput};
use serde_json::{json, Value};

fn list(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let store = store_ref(state)?;
    let rows = match get_optional_str(params, "grade") {
        Some(grade) => marks::exams_by_grade(store, &grade)?,
        None => marks::list_exams(store)?,
    };
    Ok(json!({ "exams": rows }))
}

fn get(state: &AppState, params: &Value) -> Result<Exam, HandlerErr> {
    let id = get_required_str(params, "id")?;
    Ok(marks::get_exam(store_ref(state)?, &id)?)
}

fn create(state: &mut AppState, params: &Value) -> Result<Exam, HandlerErr> {
    let draft: Exam = parse_params(params)?;
    Ok(marks::add_exam(store_mut(state)?, draft)?)
}

fn save(state: &mut AppState, params: &Value) -> Result<Value, HandlerErr> {
    let raw = params
        .get("entries")
        .ok_or_else(|| HandlerErr::bad_params("missing entries"))?;
    let inputs: Vec<MarksInput> = parse_params(raw)?;
    let saved = marks::save_marks(store_mut(state)?, inputs)?;
    Ok(json!({ "saved": saved.len(), "entries": saved }))
}

fn by_exam(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let exam_id = get_required_str(params, "examId")?;
    Ok(json!({ "entries": marks::marks_by_exam(store_ref(state)?, &exam_id)? }))
}

fn by_student(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    Ok(json!({ "entries": marks::marks_by_student(store_ref(state)?, &student_id)? }))
}

fn result_sheet(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let exam_id = get_required_str(params, "examId")?;
    let rows = marks::exam_result_sheet(
        store_ref(state)?,
        &exam_id,
        state.config.scoring.passing_percentage,
    )?;
    Ok(json!({ "examId": exam_id, "rows": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    match req.method.as_str() {
        "exams.list" => Some(respond(&req.id, list(state, p))),
        "exams.get" => Some(respond(&req.id, get(state, p))),
        "exams.create" => Some(respond(&req.id, create(state, p))),
        "marks.save" => Some(respond(&req.id, save(state, p))),
        "marks.byExam" => Some(respond(&req.id, by_exam(state, p))),
        "marks.byStudent" => Some(respond(&req.id, by_student(state, p))),
        "marks.resultSheet" => Some(respond(&req.id, result_sheet(state, p))),
        _ => None,
    }
}
