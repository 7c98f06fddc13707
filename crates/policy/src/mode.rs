//! Named operating modes and their policy templates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, PolicyConfig, Whitelist};

/// The operating modes of the host.
///
/// Each maps to a fixed [`PolicyConfig`] template; there is no fifth mode
/// and no fallback. The enum is exhaustive by construction and parsing an
/// unknown name is an error, never a silent default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Inbound reads only; no outbound connections of any kind.
    #[default]
    DataDiode,
    /// Outbound connections only to the configured whitelist.
    SecureChannel,
    /// Nothing in, nothing out.
    FullLockdown,
    /// Everything open. Documents the failure mode; never recommended.
    Breach,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::DataDiode,
        Mode::SecureChannel,
        Mode::FullLockdown,
        Mode::Breach,
    ];

    /// The fixed policy template for this mode over the given whitelist.
    ///
    /// Deterministic and idempotent: applying the same mode twice yields
    /// the same configuration.
    pub fn config(self, whitelist: Whitelist) -> PolicyConfig {
        let (filesystem_allowed, network_allowed, restricted_network_allowed) = match self {
            Mode::DataDiode => (true, false, false),
            Mode::SecureChannel => (true, false, true),
            Mode::FullLockdown => (false, false, false),
            Mode::Breach => (true, true, false),
        };
        PolicyConfig {
            filesystem_allowed,
            network_allowed,
            restricted_network_allowed,
            whitelist,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::DataDiode => "data-diode",
            Mode::SecureChannel => "secure-channel",
            Mode::FullLockdown => "full-lockdown",
            Mode::Breach => "breach",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| Error::UnknownMode(s.to_string()))
    }
}
