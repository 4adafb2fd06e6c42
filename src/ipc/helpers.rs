use crate::config::Config;
use crate::error::LedgerError;
use crate::ipc::error::{err, ok};
use crate::ipc::types::AppState;
use crate::model::MonthKey;
use crate::store::SqliteStore;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<LedgerError> for HandlerErr {
    fn from(e: LedgerError) -> Self {
        let details = match &e {
            LedgerError::NotFound { collection, id } => {
                Some(json!({ "collection": collection, "id": id }))
            }
            LedgerError::MalformedRecord { collection, id, .. } => {
                Some(json!({ "collection": collection, "id": id }))
            }
            LedgerError::MarksExceedMaximum { obtained, max } => {
                Some(json!({ "marksObtained": obtained, "maxMarks": max }))
            }
            _ => None,
        };
        match &e {
            LedgerError::Storage(_)
            | LedgerError::Serialization(_)
            | LedgerError::MalformedRecord { .. } => error!(error = %e, "storage failure"),
            _ => warn!(error = %e, "request rejected"),
        }
        Self {
            code: e.code(),
            message: e.to_string(),
            details,
        }
    }
}

/// Turns a handler result into a response line.
pub fn respond<T: Serialize>(id: &str, res: Result<T, HandlerErr>) -> serde_json::Value {
    match res.and_then(|v| to_value(&v)) {
        Ok(v) => ok(id, v),
        Err(e) => e.response(id),
    }
}

pub fn to_value<T: Serialize>(v: &T) -> Result<serde_json::Value, HandlerErr> {
    serde_json::to_value(v).map_err(|e| HandlerErr {
        code: "malformed_record",
        message: e.to_string(),
        details: None,
    })
}

pub fn parse_params<T: DeserializeOwned>(params: &serde_json::Value) -> Result<T, HandlerErr> {
    serde_json::from_value(params.clone()).map_err(|e| HandlerErr::bad_params(e.to_string()))
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

pub fn get_optional_u32(params: &serde_json::Value, key: &str) -> Result<Option<u32>, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                HandlerErr::bad_params(format!("{} must be a non-negative integer", key))
            }),
    }
}

pub fn parse_date(raw: &str, key: &str) -> Result<NaiveDate, HandlerErr> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))
}

/// `params.today` when given, otherwise the current UTC date.
pub fn today(params: &serde_json::Value) -> Result<NaiveDate, HandlerErr> {
    match get_optional_str(params, "today") {
        Some(raw) => parse_date(&raw, "today"),
        None => Ok(chrono::Utc::now().date_naive()),
    }
}

#[derive(Deserialize)]
struct MonthParams {
    year: i32,
    month: u32,
}

pub fn parse_month(params: &serde_json::Value) -> Result<MonthKey, HandlerErr> {
    let p: MonthParams = parse_params(params)?;
    MonthKey::new(p.year, p.month)
        .ok_or_else(|| HandlerErr::bad_params("month must be between 1 and 12"))
}

pub fn store_ref(state: &AppState) -> Result<&SqliteStore, HandlerErr> {
    state.store.as_ref().ok_or_else(no_workspace)
}

pub fn store_mut(state: &mut AppState) -> Result<&mut SqliteStore, HandlerErr> {
    state.store.as_mut().ok_or_else(no_workspace)
}

/// The open store together with the random source and config, borrowed
/// side by side for operations that issue codes.
pub fn store_with_rng(
    state: &mut AppState,
) -> Result<(&mut SqliteStore, &mut StdRng, &Config), HandlerErr> {
    let AppState {
        store, rng, config, ..
    } = state;
    let store = store.as_mut().ok_or_else(no_workspace)?;
    Ok((store, rng, &*config))
}

fn no_workspace() -> HandlerErr {
    HandlerErr {
        code: "no_workspace",
        message: "select a workspace first".to_string(),
        details: None,
    }
}
