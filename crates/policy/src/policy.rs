//! Policy configuration and connection evaluation.

use serde::{Deserialize, Serialize};

use crate::{Denial, Endpoint, Reason};

/// The active ruleset: capability toggles plus the endpoint whitelist.
///
/// A configuration is replaced wholesale on mode change, never patched, so
/// no decision can observe flags from two different modes at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Filesystem reads permitted.
    pub filesystem_allowed: bool,

    /// Master allow-all for outbound connections.
    pub network_allowed: bool,

    /// Whitelist-only mode for outbound connections.
    pub restricted_network_allowed: bool,

    /// Approved endpoints, consulted only in whitelist-only mode.
    #[serde(default)]
    pub whitelist: Whitelist,
}

impl PolicyConfig {
    /// Evaluate an outbound connection request.
    ///
    /// The check order is a contract: the master switch is consulted first
    /// and short-circuits the whitelist entirely, whitelist-only mode then
    /// decides by exact match, and everything else is blocked.
    pub fn evaluate_connect(&self, endpoint: &Endpoint) -> Result<Reason, Denial> {
        if self.network_allowed {
            return Ok(Reason::FullAccess);
        }
        if self.restricted_network_allowed {
            if self.whitelist.contains(endpoint) {
                return Ok(Reason::WhitelistMatch);
            }
            return Err(Denial::NotWhitelisted {
                endpoint: *endpoint,
            });
        }
        Err(Denial::NetworkBlocked {
            endpoint: *endpoint,
        })
    }
}

/// Ordered set of approved endpoints.
///
/// Entries are unique and keep insertion order, so audit output and display
/// are deterministic. Matching is exact on the (address, port) pair: no
/// CIDR ranges, no wildcard ports. An endpoint whose address matches an
/// entry but whose port differs does not match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Whitelist {
    entries: Vec<Endpoint>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an endpoint. Returns false if it was already present.
    pub fn insert(&mut self, endpoint: Endpoint) -> bool {
        if self.entries.contains(&endpoint) {
            return false;
        }
        self.entries.push(endpoint);
        true
    }

    /// Exact-match lookup. Absence of a match is a normal false, never an
    /// error.
    pub fn contains(&self, endpoint: &Endpoint) -> bool {
        self.entries.contains(endpoint)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Endpoint> for Whitelist {
    fn from_iter<I: IntoIterator<Item = Endpoint>>(iter: I) -> Self {
        let mut whitelist = Self::new();
        for endpoint in iter {
            whitelist.insert(endpoint);
        }
        whitelist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(s: &str) -> Endpoint {
        s.parse().unwrap()
    }

    fn whitelist() -> Whitelist {
        ["10.0.0.50:502", "10.0.0.51:102", "192.168.100.10:443"]
            .into_iter()
            .map(ep)
            .collect()
    }

    #[test]
    fn whitelist_matches_exact_pairs_only() {
        let list = whitelist();
        assert!(list.contains(&ep("10.0.0.50:502")));
        // Approved address, wrong port.
        assert!(!list.contains(&ep("10.0.0.50:8080")));
        // Approved port, wrong address.
        assert!(!list.contains(&ep("10.0.0.99:502")));
    }

    #[test]
    fn whitelist_dedupes_and_keeps_insertion_order() {
        let mut list = whitelist();
        assert!(!list.insert(ep("10.0.0.50:502")));
        assert_eq!(list.len(), 3);
        let ports: Vec<u16> = list.iter().map(|e| e.port).collect();
        assert_eq!(ports, vec![502, 102, 443]);
    }

    #[test]
    fn full_access_short_circuits_the_whitelist() {
        // network_allowed wins even with restricted mode on and an empty
        // whitelist; the ordering is part of the contract.
        let config = PolicyConfig {
            filesystem_allowed: true,
            network_allowed: true,
            restricted_network_allowed: true,
            whitelist: Whitelist::new(),
        };
        assert_eq!(
            config.evaluate_connect(&ep("203.0.113.9:4444")),
            Ok(Reason::FullAccess)
        );
    }

    #[test]
    fn restricted_mode_allows_only_whitelisted() {
        let config = PolicyConfig {
            filesystem_allowed: true,
            network_allowed: false,
            restricted_network_allowed: true,
            whitelist: whitelist(),
        };
        assert_eq!(
            config.evaluate_connect(&ep("10.0.0.51:102")),
            Ok(Reason::WhitelistMatch)
        );
        assert_eq!(
            config.evaluate_connect(&ep("10.0.0.99:80")),
            Err(Denial::NotWhitelisted {
                endpoint: ep("10.0.0.99:80")
            })
        );
    }

    #[test]
    fn default_config_blocks_all_connections() {
        let config = PolicyConfig::default();
        for target in ["1.1.1.1:80", "10.0.0.50:502", "127.0.0.1:22"] {
            assert_eq!(
                config.evaluate_connect(&ep(target)),
                Err(Denial::NetworkBlocked {
                    endpoint: ep(target)
                })
            );
        }
    }
}
