//! # Dispatch
//!
//! The dispatch-and-retry orchestrator.
//!
//! Responsibilities:
//! - Accept named events and deliver them through a worker pool
//! - Divert failed sends into the retry store, re-deliver on request
//! - Track every scheduled task in a ledger so a flush can drain it
//! - Serve the core as a registry-held singleton with renew/release
//!
//! Every public operation absorbs its own failures: telemetry must never
//! break the host application.

mod core;
mod error;
mod ledger;
mod metrics;
mod pool;
mod registry;

pub use crate::core::DispatchCore;
pub use crate::ledger::{TaskBody, TaskLedger, TaskRecord};
pub use crate::metrics::{DispatchMetrics, MetricsSnapshot};
pub use crate::registry::{Access, CoreRegistry};
pub use error::DispatchError;
