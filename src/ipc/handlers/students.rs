use crate::ipc::helpers::{
    get_optional_str, get_required_str, parse_params, respond, store_mut, store_ref, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Student;
use crate::services::students;
use serde_json::{json, Value};

fn list(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let store = store_ref(state)?;
    let rows = match get_optional_str(params, "grade") {
        Some(grade) => students::list_students_by_grade(store, &grade)?,
        None => students::list_students(store)?,
    };
    Ok(json!({ "students": rows }))
}

fn get(state: &AppState, params: &Value) -> Result<Student, HandlerErr> {
    let id = get_required_str(params, "id")?;
    Ok(students::get_student(store_ref(state)?, &id)?)
}

fn create(state: &mut AppState, params: &Value) -> Result<Student, HandlerErr> {
    let draft: Student = parse_params(params)?;
    let codes = state.config.codes.clone();
    Ok(students::add_student(store_mut(state)?, draft, &codes)?)
}

fn update(state: &mut AppState, params: &Value) -> Result<Student, HandlerErr> {
    let id = get_required_str(params, "id")?;
    let patch = params
        .get("patch")
        .ok_or_else(|| HandlerErr::bad_params("missing patch"))?;
    Ok(students::update_student(store_mut(state)?, &id, patch)?)
}

fn delete(state: &mut AppState, params: &Value) -> Result<Value, HandlerErr> {
    let id = get_required_str(params, "id")?;
    students::delete_student(store_mut(state)?, &id)?;
    Ok(json!({ "deleted": id }))
}

fn next_code(state: &AppState) -> Result<Value, HandlerErr> {
    let code = students::next_student_code(store_ref(state)?, &state.config.codes)?;
    Ok(json!({ "studentCode": code }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    match req.method.as_str() {
        "students.list" => Some(respond(&req.id, list(state, p))),
        "students.get" => Some(respond(&req.id, get(state, p))),
        "students.create" => Some(respond(&req.id, create(state, p))),
        "students.update" => Some(respond(&req.id, update(state, p))),
        "students.delete" => Some(respond(&req.id, delete(state, p))),
        "students.nextCode" => Some(respond(&req.id, next_code(state))),
        _ => None,
    }
}
