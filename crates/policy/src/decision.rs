//! Decision outcomes: verdicts, reason codes, and the typed denial.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Endpoint;

/// The outcome of one capability decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Allow,
    Deny,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

/// Stable reason codes attached to every decision record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Filesystem reads are permitted and the path resolved.
    FilesystemGranted,
    /// Filesystem reads are disabled by the active mode.
    FilesystemBlocked,
    /// The path was permitted but resolves to no granted resource.
    NotFound,
    /// The network master switch is on; everything connects.
    FullAccess,
    /// Whitelist-only mode and the endpoint matched an entry.
    WhitelistMatch,
    /// Whitelist-only mode and the endpoint matched nothing.
    NotWhitelisted,
    /// All outbound connections are disabled by the active mode.
    NetworkBlocked,
}

impl Reason {
    pub fn verdict(self) -> Verdict {
        match self {
            Self::FilesystemGranted | Self::FullAccess | Self::WhitelistMatch => Verdict::Allow,
            Self::FilesystemBlocked | Self::NotFound | Self::NotWhitelisted | Self::NetworkBlocked => {
                Verdict::Deny
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FilesystemGranted => "filesystem_granted",
            Self::FilesystemBlocked => "filesystem_blocked",
            Self::NotFound => "not_found",
            Self::FullAccess => "full_access",
            Self::WhitelistMatch => "whitelist_match",
            Self::NotWhitelisted => "not_whitelisted",
            Self::NetworkBlocked => "network_blocked",
        }
    }
}

/// A refused capability request, as returned to the driver.
///
/// Denial is an expected outcome, not an exception: the driver receives it
/// as a value and cannot distinguish a missing capability from a runtime
/// failure. `NotFound` is separate from policy denial: the path was
/// syntactically permitted but names no granted resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("filesystem access blocked by policy: {path}")]
    FilesystemBlocked { path: String },

    #[error("no such resource: {path}")]
    NotFound { path: String },

    #[error("network access blocked by policy: {endpoint}")]
    NetworkBlocked { endpoint: Endpoint },

    #[error("endpoint not on whitelist: {endpoint}")]
    NotWhitelisted { endpoint: Endpoint },
}

impl Denial {
    /// The reason code recorded in the audit trail for this denial.
    pub fn reason(&self) -> Reason {
        match self {
            Self::FilesystemBlocked { .. } => Reason::FilesystemBlocked,
            Self::NotFound { .. } => Reason::NotFound,
            Self::NetworkBlocked { .. } => Reason::NetworkBlocked,
            Self::NotWhitelisted { .. } => Reason::NotWhitelisted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_reason_maps_to_a_verdict() {
        assert_eq!(Reason::FilesystemGranted.verdict(), Verdict::Allow);
        assert_eq!(Reason::FullAccess.verdict(), Verdict::Allow);
        assert_eq!(Reason::WhitelistMatch.verdict(), Verdict::Allow);
        assert_eq!(Reason::FilesystemBlocked.verdict(), Verdict::Deny);
        assert_eq!(Reason::NotFound.verdict(), Verdict::Deny);
        assert_eq!(Reason::NotWhitelisted.verdict(), Verdict::Deny);
        assert_eq!(Reason::NetworkBlocked.verdict(), Verdict::Deny);
    }

    #[test]
    fn denial_reason_codes_are_stable() {
        let denial = Denial::NotWhitelisted {
            endpoint: "10.0.0.99:80".parse().unwrap(),
        };
        assert_eq!(denial.reason(), Reason::NotWhitelisted);
        assert_eq!(denial.reason().as_str(), "not_whitelisted");
    }
}
