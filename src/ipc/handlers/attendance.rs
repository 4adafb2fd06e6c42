use crate::ipc::helpers::{
    get_required_str, parse_date, parse_month, parse_params, respond, store_mut, store_ref, today,
    HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::StaffAttendance;
use crate::services::staff;
use serde_json::{json, Value};

fn mark(state: &mut AppState, params: &Value) -> Result<Value, HandlerErr> {
    let raw = params
        .get("entries")
        .ok_or_else(|| HandlerErr::bad_params("missing entries"))?;
    let entries: Vec<StaffAttendance> = parse_params(raw)?;
    if entries.is_empty() {
        return Err(HandlerErr::bad_params("entries must not be empty"));
    }
    let saved = staff::mark_attendance(store_mut(state)?, entries)?;
    Ok(json!({ "saved": saved.len(), "entries": saved }))
}

fn for_date(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let date = parse_date(&get_required_str(params, "date")?, "date")?;
    let rows = staff::attendance_for_date(store_ref(state)?, date)?;
    Ok(json!({ "date": date, "entries": rows }))
}

fn monthly(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let staff_id = get_required_str(params, "staffId")?;
    let month = parse_month(params)?;
    let rows = staff::monthly_attendance(store_ref(state)?, &staff_id, month)?;
    let tally = crate::ledger::payroll::tally_attendance(&rows);
    Ok(json!({
        "entries": rows,
        "tally": tally,
        "markedDays": tally.marked_days(),
    }))
}

fn present_today(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let date = match params.get("date").and_then(|v| v.as_str()) {
        Some(raw) => parse_date(raw, "date")?,
        None => today(params)?,
    };
    let count = staff::present_today_count(store_ref(state)?, date)?;
    Ok(json!({ "date": date, "present": count }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    match req.method.as_str() {
        "attendance.mark" => Some(respond(&req.id, mark(state, p))),
        "attendance.forDate" => Some(respond(&req.id, for_date(state, p))),
        "attendance.monthly" => Some(respond(&req.id, monthly(state, p))),
        "attendance.presentToday" => Some(respond(&req.id, present_today(state, p))),
        _ => None,
    }
}
