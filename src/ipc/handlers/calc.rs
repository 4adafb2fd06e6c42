//! Stateless previews; these work without a workspace.

use crate::ipc::helpers::{parse_params, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::ledger::payroll::{self, SalaryBreakdown, SalaryInput};
use crate::ledger::scoring;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreParams {
    obtained: f64,
    max: f64,
    #[serde(default)]
    passing_percentage: Option<i64>,
}

fn score(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let p: ScoreParams = parse_params(params)?;
    let passing = p
        .passing_percentage
        .unwrap_or(state.config.scoring.passing_percentage);
    let pct = scoring::percentage(p.obtained, p.max);
    Ok(json!({
        "percentage": pct,
        "grade": scoring::letter_grade(pct),
        "status": scoring::pass_status(pct, passing),
    }))
}

fn net_salary(state: &AppState, params: &Value) -> Result<SalaryBreakdown, HandlerErr> {
    let input: SalaryInput = parse_params(params)?;
    Ok(payroll::calculate_net_salary(
        &input,
        state.config.payroll.hours_per_day,
    )?)
}

fn validate_marks(params: &Value) -> Result<Value, HandlerErr> {
    let p: ScoreParams = parse_params(params)?;
    scoring::validate_marks(p.obtained, p.max)?;
    Ok(json!({ "valid": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    match req.method.as_str() {
        "calc.score" => Some(respond(&req.id, score(state, p))),
        "calc.netSalary" => Some(respond(&req.id, net_salary(state, p))),
        "calc.validateMarks" => Some(respond(&req.id, validate_marks(p))),
        _ => None,
    }
}
