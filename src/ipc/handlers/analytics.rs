use crate::ipc::helpers::{respond, store_ref, today, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::ledger::aggregate::DashboardSummary;
use crate::services::dashboard::{self, AnalyticsOverview};
use serde_json::Value;

fn summary(state: &AppState, params: &Value) -> Result<DashboardSummary, HandlerErr> {
    let today = today(params)?;
    Ok(dashboard::dashboard_summary(
        store_ref(state)?,
        today,
        &state.config.dashboard,
    )?)
}

fn overview(state: &AppState, params: &Value) -> Result<AnalyticsOverview, HandlerErr> {
    let today = today(params)?;
    Ok(dashboard::analytics_overview(
        store_ref(state)?,
        today,
        &state.config.dashboard,
    )?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    match req.method.as_str() {
        "dashboard.summary" => Some(respond(&req.id, summary(state, p))),
        "analytics.overview" => Some(respond(&req.id, overview(state, p))),
        _ => None,
    }
}
