//! Record keeping for a small tuition institution.
//!
//! The [`ledger`] module holds the pure computations (scoring, payroll,
//! identifiers and monthly aggregation). [`services`] wires them to a
//! [`store::RecordStore`], and the `tuitiond` binary exposes the services over
//! a JSON-lines protocol on stdin/stdout.

pub mod backup;
pub mod config;
pub mod error;
pub mod ipc;
pub mod ledger;
pub mod model;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{LedgerError, Result};
