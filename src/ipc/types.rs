use crate::config::Config;
use crate::store::SqliteStore;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<SqliteStore>,
    pub config: Config,
    /// Source for staff codes and receipt numbers.
    pub rng: StdRng,
}

impl AppState {
    pub fn new(config: Config, rng: StdRng) -> Self {
        Self {
            workspace: None,
            store: None,
            config,
            rng,
        }
    }
}
