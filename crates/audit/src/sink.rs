//! Audit sinks consuming decision records.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{AuditStore, DecisionRecord};

/// Consumer of decision records.
///
/// Append is fire-and-forget from the gateway's perspective: the trait
/// surface is infallible and implementations deal with their own failures.
/// Records must be delivered in the order decisions were made, per caller.
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &DecisionRecord);
}

/// In-memory sink retaining one run's records in decision order.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<DecisionRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records so far, in append order.
    pub fn records(&self) -> Vec<DecisionRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl AuditSink for MemorySink {
    fn append(&self, record: &DecisionRecord) {
        self.records.lock().push(record.clone());
    }
}

/// Persists records through an [`AuditStore`].
///
/// Store failures are logged and swallowed: logging is best-effort and
/// must never change the outcome of a capability decision.
pub struct StoreSink {
    store: Mutex<AuditStore>,
}

impl StoreSink {
    pub fn new(store: AuditStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }
}

impl AuditSink for StoreSink {
    fn append(&self, record: &DecisionRecord) {
        if let Err(e) = self.store.lock().append(record) {
            tracing::warn!(error = %e, record = %record.id, "audit store append failed");
        }
    }
}

/// Delivers every record to several sinks, in order.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }
}

impl AuditSink for FanoutSink {
    fn append(&self, record: &DecisionRecord) {
        for sink in &self.sinks {
            sink.append(record);
        }
    }
}
