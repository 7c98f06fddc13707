//! The capability gateway.

use std::sync::Arc;

use audit::{AuditSink, DecisionRecord, RunId};
use policy::{Denial, Endpoint, PolicyStore, Reason, ResourceRequest, Verdict};

use crate::ResourceTable;

/// Brokers filesystem and network access for the untrusted driver.
///
/// Both operations take a policy snapshot, decide, and append one audit
/// record (allow or deny) before returning. Decisions are synchronous,
/// bounded-time functions over in-memory state; no retry would ever change
/// an outcome unless the policy itself changed.
///
/// Operations take `&self` and may run concurrently from several driver
/// instances: each call reads an immutable snapshot, and the only writer is
/// the policy store's atomic replace.
pub struct Gateway {
    store: PolicyStore,
    resources: ResourceTable,
    sink: Arc<dyn AuditSink>,
}

impl Gateway {
    pub fn new(store: PolicyStore, resources: ResourceTable, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            store,
            resources,
            sink,
        }
    }

    /// Read a granted resource.
    ///
    /// Denied outright when the active mode blocks filesystem access;
    /// otherwise the path must resolve against the resource table, or the
    /// result is `NotFound`, a distinct outcome rather than a policy denial.
    pub fn read_resource(&self, run: RunId, path: &str) -> Result<Vec<u8>, Denial> {
        let config = self.store.snapshot();
        let request = ResourceRequest::file(path);

        if !config.filesystem_allowed {
            return Err(self.deny(
                run,
                request,
                Denial::FilesystemBlocked {
                    path: path.to_string(),
                },
            ));
        }

        match self.resources.resolve(path) {
            Some(bytes) => {
                self.record(run, request, Verdict::Allow, Reason::FilesystemGranted);
                Ok(bytes.to_vec())
            }
            None => Err(self.deny(
                run,
                request,
                Denial::NotFound {
                    path: path.to_string(),
                },
            )),
        }
    }

    /// Open an outbound connection.
    ///
    /// The deny happens here, before any byte could be transmitted: on
    /// allow the caller gets unit, never a socket. An embedder that dials
    /// for real behind an allow owns that I/O, with its own timeout and
    /// error channel, separately from this decision.
    pub fn open_connection(&self, run: RunId, endpoint: Endpoint) -> Result<(), Denial> {
        let config = self.store.snapshot();
        let request = ResourceRequest::connect(endpoint);

        match config.evaluate_connect(&endpoint) {
            Ok(reason) => {
                self.record(run, request, Verdict::Allow, reason);
                Ok(())
            }
            Err(denial) => Err(self.deny(run, request, denial)),
        }
    }

    fn deny(&self, run: RunId, request: ResourceRequest, denial: Denial) -> Denial {
        self.record(run, request, Verdict::Deny, denial.reason());
        denial
    }

    fn record(&self, run: RunId, request: ResourceRequest, verdict: Verdict, reason: Reason) {
        tracing::debug!(%request, verdict = verdict.as_str(), reason = reason.as_str(), "capability decision");
        self.sink.append(&DecisionRecord::new(run, request, verdict, reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit::MemorySink;
    use policy::{Mode, PolicyConfig, Whitelist};

    use crate::SENSOR_DATA_PATH;

    fn gateway_with(config: PolicyConfig) -> (Gateway, Arc<MemorySink>) {
        let store = PolicyStore::new(Whitelist::new());
        store.replace(config);
        let sink = Arc::new(MemorySink::new());
        let gateway = Gateway::new(store, ResourceTable::builtin(), sink.clone());
        (gateway, sink)
    }

    #[test]
    fn filesystem_block_denies_even_the_granted_path() {
        let (gateway, _) = gateway_with(Mode::FullLockdown.config(Whitelist::new()));
        let result = gateway.read_resource(RunId::new(), SENSOR_DATA_PATH);
        assert!(matches!(result, Err(Denial::FilesystemBlocked { .. })));
    }

    #[test]
    fn unknown_path_is_not_found_not_a_policy_denial() {
        let (gateway, _) = gateway_with(Mode::DataDiode.config(Whitelist::new()));
        let result = gateway.read_resource(RunId::new(), "mnt/secrets.json");
        assert!(matches!(result, Err(Denial::NotFound { .. })));
    }

    #[test]
    fn denied_calls_still_leave_a_record() {
        let (gateway, sink) = gateway_with(Mode::FullLockdown.config(Whitelist::new()));
        let run = RunId::new();
        let _ = gateway.read_resource(run, SENSOR_DATA_PATH);
        let _ = gateway.open_connection(run, "1.1.1.1:80".parse().unwrap());

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].reason, Reason::FilesystemBlocked);
        assert_eq!(records[1].reason, Reason::NetworkBlocked);
    }

    #[test]
    fn mode_change_applies_to_the_next_call() {
        let store = PolicyStore::new(Whitelist::new());
        store.apply(Mode::DataDiode);
        let gateway = Gateway::new(
            store.clone(),
            ResourceTable::builtin(),
            Arc::new(MemorySink::new()),
        );

        let run = RunId::new();
        assert!(gateway.read_resource(run, SENSOR_DATA_PATH).is_ok());
        store.apply(Mode::FullLockdown);
        assert!(gateway.read_resource(run, SENSOR_DATA_PATH).is_err());
    }
}
