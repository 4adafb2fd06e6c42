//! JSON-lines request handling for the `tuitiond` sidecar.

mod error;
mod handlers;
mod helpers;
mod router;
mod types;

pub use error::bad_json;
pub use handlers::core::open_workspace;
pub use router::handle_request;
pub use types::{AppState, Request};
