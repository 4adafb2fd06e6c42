use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;
use tracing::debug;

type Handler = fn(&mut AppState, &Request) -> Option<serde_json::Value>;

const HANDLERS: [Handler; 10] = [
    handlers::core::try_handle,
    handlers::students::try_handle,
    handlers::staff::try_handle,
    handlers::attendance::try_handle,
    handlers::salary::try_handle,
    handlers::fees::try_handle,
    handlers::exams::try_handle,
    handlers::analytics::try_handle,
    handlers::calc::try_handle,
    handlers::backup::try_handle,
];

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    debug!(id = %req.id, method = %req.method, "request");
    for handler in HANDLERS {
        if let Some(resp) = handler(state, &req) {
            return resp;
        }
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
