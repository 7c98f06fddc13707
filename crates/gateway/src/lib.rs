//! Warden capability gateway, the host side of the sandbox boundary.
//!
//! The untrusted driver reaches the outside world through exactly two
//! operations: [`Gateway::read_resource`] and [`Gateway::open_connection`].
//! Nothing else exists on the type; process spawn, environment access, and
//! filesystem writes are absent by construction, not merely denied.
//!
//! # Overview
//!
//! - **[`Gateway`]**: consults the policy snapshot per call, resolves reads
//!   against the [`ResourceTable`], and emits one audit record per decision.
//! - **[`ResourceTable`]**: the host's deny-by-default filesystem, a single
//!   preopened logical root under which only granted entries resolve.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use audit::{MemorySink, RunId};
//! use gateway::{Gateway, ResourceTable, SENSOR_DATA_PATH};
//! use policy::{Mode, PolicyStore, Whitelist};
//!
//! let store = PolicyStore::new(Whitelist::new());
//! store.apply(Mode::DataDiode);
//! let gateway = Gateway::new(store, ResourceTable::builtin(), Arc::new(MemorySink::new()));
//!
//! let run = RunId::new();
//! assert!(gateway.read_resource(run, SENSOR_DATA_PATH).is_ok());
//! assert!(gateway.open_connection(run, "1.1.1.1:80".parse().unwrap()).is_err());
//! ```

mod gateway;
mod resources;

pub use gateway::Gateway;
pub use resources::{ResourceTable, SENSOR_DATA_PATH, SensorData};
