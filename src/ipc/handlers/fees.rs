use crate::ipc::helpers::{
    get_optional_u32, get_required_str, parse_params, respond, store_ref, store_with_rng,
    HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Payment;
use crate::services::fees;
use serde_json::{json, Value};

const DEFAULT_RECENT_LIMIT: u32 = 20;

fn create(state: &mut AppState, params: &Value) -> Result<Payment, HandlerErr> {
    let draft: Payment = parse_params(params)?;
    let (store, rng, config) = store_with_rng(state)?;
    Ok(fees::add_payment(store, draft, rng, &config.codes)?)
}

fn recent(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let limit = get_optional_u32(params, "limit")?.unwrap_or(DEFAULT_RECENT_LIMIT);
    let rows = fees::recent_payments(store_ref(state)?, limit as usize)?;
    Ok(json!({ "payments": rows }))
}

fn by_student(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let rows = fees::payments_by_student(store_ref(state)?, &student_id)?;
    let total: f64 = rows.iter().map(|p| p.amount).sum();
    Ok(json!({ "payments": rows, "totalPaid": total }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    match req.method.as_str() {
        "fees.create" => Some(respond(&req.id, create(state, p))),
        "fees.recent" => Some(respond(&req.id, recent(state, p))),
        "fees.byStudent" => Some(respond(&req.id, by_student(state, p))),
        _ => None,
    }
}
