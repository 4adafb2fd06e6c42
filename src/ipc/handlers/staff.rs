use crate::ipc::helpers::{
    get_required_str, parse_params, respond, store_mut, store_ref, store_with_rng, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Staff;
use crate::services::staff;
use serde_json::{json, Value};

fn list(state: &AppState) -> Result<Value, HandlerErr> {
    Ok(json!({ "staff": staff::list_staff(store_ref(state)?)? }))
}

fn get(state: &AppState, params: &Value) -> Result<Staff, HandlerErr> {
    let id = get_required_str(params, "id")?;
    Ok(staff::get_staff(store_ref(state)?, &id)?)
}

fn create(state: &mut AppState, params: &Value) -> Result<Staff, HandlerErr> {
    let draft: Staff = parse_params(params)?;
    let (store, rng, config) = store_with_rng(state)?;
    Ok(staff::add_staff(store, draft, rng, &config.codes)?)
}

fn update(state: &mut AppState, params: &Value) -> Result<Staff, HandlerErr> {
    let id = get_required_str(params, "id")?;
    let patch = params
        .get("patch")
        .ok_or_else(|| HandlerErr::bad_params("missing patch"))?;
    Ok(staff::update_staff(store_mut(state)?, &id, patch)?)
}

fn delete(state: &mut AppState, params: &Value) -> Result<Value, HandlerErr> {
    let id = get_required_str(params, "id")?;
    staff::delete_staff(store_mut(state)?, &id)?;
    Ok(json!({ "deleted": id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    match req.method.as_str() {
        "staff.list" => Some(respond(&req.id, list(state))),
        "staff.get" => Some(respond(&req.id, get(state, p))),
        "staff.create" => Some(respond(&req.id, create(state, p))),
        "staff.update" => Some(respond(&req.id, update(state, p))),
        "staff.delete" => Some(respond(&req.id, delete(state, p))),
        _ => None,
    }
}
