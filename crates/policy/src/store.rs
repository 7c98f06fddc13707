//! Shared policy state with atomic replacement.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::{Mode, PolicyConfig, Whitelist};

/// Holds the active policy configuration.
///
/// Readers take an immutable snapshot; writers replace the whole
/// configuration in one step. There is no merge or patch operation, so an
/// in-flight decision can never observe `filesystem_allowed` from one mode
/// paired with `network_allowed` from another.
///
/// The store is an owned value (cheaply cloneable, clones share state), not
/// a process-wide singleton, so tests and parallel simulated runs each hold
/// their own.
#[derive(Clone)]
pub struct PolicyStore {
    active: Arc<RwLock<Arc<PolicyConfig>>>,
    whitelist: Whitelist,
}

impl PolicyStore {
    /// Create a store over the given whitelist, starting in the default
    /// data-diode configuration.
    pub fn new(whitelist: Whitelist) -> Self {
        let initial = Mode::DataDiode.config(whitelist.clone());
        Self {
            active: Arc::new(RwLock::new(Arc::new(initial))),
            whitelist,
        }
    }

    /// The current configuration. Non-blocking; the returned snapshot is
    /// immutable and unaffected by later replacements.
    pub fn snapshot(&self) -> Arc<PolicyConfig> {
        self.active.read().clone()
    }

    /// Atomically replace the active configuration.
    pub fn replace(&self, config: PolicyConfig) {
        *self.active.write() = Arc::new(config);
    }

    /// Apply a mode: build its template over the configured whitelist and
    /// make it the active configuration. Returns the applied snapshot.
    pub fn apply(&self, mode: Mode) -> Arc<PolicyConfig> {
        let config = Arc::new(mode.config(self.whitelist.clone()));
        tracing::debug!(%mode, "policy configuration replaced");
        *self.active.write() = config.clone();
        config
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new(Whitelist::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Endpoint;

    fn store() -> PolicyStore {
        let whitelist = ["10.0.0.50:502".parse::<Endpoint>().unwrap()]
            .into_iter()
            .collect();
        PolicyStore::new(whitelist)
    }

    #[test]
    fn starts_as_data_diode() {
        let snapshot = store().snapshot();
        assert!(snapshot.filesystem_allowed);
        assert!(!snapshot.network_allowed);
        assert!(!snapshot.restricted_network_allowed);
        assert_eq!(snapshot.whitelist.len(), 1);
    }

    #[test]
    fn apply_is_idempotent() {
        let store = store();
        let first = store.apply(Mode::SecureChannel);
        let second = store.apply(Mode::SecureChannel);
        assert_eq!(*first, *second);
    }

    #[test]
    fn snapshots_are_isolated_from_later_changes() {
        let store = store();
        let before = store.snapshot();
        store.apply(Mode::FullLockdown);
        // The earlier snapshot still shows the old configuration.
        assert!(before.filesystem_allowed);
        assert!(!store.snapshot().filesystem_allowed);
    }

    #[test]
    fn clones_share_the_active_configuration() {
        let store = store();
        let clone = store.clone();
        store.apply(Mode::Breach);
        assert!(clone.snapshot().network_allowed);
    }

    #[test]
    fn replace_is_total() {
        let store = store();
        store.replace(PolicyConfig::default());
        let snapshot = store.snapshot();
        assert!(!snapshot.filesystem_allowed);
        assert!(snapshot.whitelist.is_empty());
    }
}
