//! Decision-record audit trail for the Warden gateway.
//!
//! Every capability call produces exactly one [`DecisionRecord`], delivered
//! to an [`AuditSink`] in decision order. Sinks are side-channel only: a
//! failing sink is logged and swallowed, never allowed to change a
//! capability decision.
//!
//! Two sinks ship here, [`MemorySink`] keeping one run's records in memory
//! for display and [`StoreSink`] persisting them through the SQLite-backed
//! [`AuditStore`], plus [`FanoutSink`] to compose them.

mod error;
mod record;
mod sink;
mod store;

pub use error::{Error, Result};
pub use record::{DecisionRecord, RunId};
pub use sink::{AuditSink, FanoutSink, MemorySink, StoreSink};
pub use store::{AuditStore, RunSummary};
