use crate::ipc::helpers::{
    get_optional_u32, get_required_str, parse_month, respond, store_mut, store_ref, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::StaffSalary;
use crate::services::staff::{self, SalaryPreview};
use serde_json::{json, Value};

fn preview(state: &AppState, params: &Value) -> Result<SalaryPreview, HandlerErr> {
    let staff_id = get_required_str(params, "staffId")?;
    let month = parse_month(params)?;
    let total = get_optional_u32(params, "totalWorkingDays")?;
    Ok(staff::preview_salary(
        store_ref(state)?,
        &staff_id,
        month,
        total,
        &state.config.payroll,
    )?)
}

fn generate(state: &mut AppState, params: &Value) -> Result<StaffSalary, HandlerErr> {
    let staff_id = get_required_str(params, "staffId")?;
    let month = parse_month(params)?;
    let total = get_optional_u32(params, "totalWorkingDays")?;
    let payroll = state.config.payroll.clone();
    Ok(staff::generate_salary(
        store_mut(state)?,
        &staff_id,
        month,
        total,
        &payroll,
    )?)
}

fn mark_paid(state: &mut AppState, params: &Value) -> Result<StaffSalary, HandlerErr> {
    let id = get_required_str(params, "id")?;
    Ok(staff::mark_salary_paid(store_mut(state)?, &id)?)
}

fn history(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let staff_id = get_required_str(params, "staffId")?;
    Ok(json!({ "salaries": staff::salary_history(store_ref(state)?, &staff_id)? }))
}

fn monthly(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let month = parse_month(params)?;
    let rows = staff::monthly_salaries(store_ref(state)?, month)?;
    let total_net: f64 = rows.iter().map(|s| s.net_salary).sum();
    Ok(json!({ "salaries": rows, "totalNetSalary": total_net }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    match req.method.as_str() {
        "salary.preview" => Some(respond(&req.id, preview(state, p))),
        "salary.generate" => Some(respond(&req.id, generate(state, p))),
        "salary.markPaid" => Some(respond(&req.id, mark_paid(state, p))),
        "salary.history" => Some(respond(&req.id, history(state, p))),
        "salary.monthly" => Some(respond(&req.id, monthly(state, p))),
        _ => None,
    }
}
