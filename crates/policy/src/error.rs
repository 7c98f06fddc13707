//! Policy error types.
//!
//! These cover contract violations only; a refused request is a
//! [`Denial`](crate::Denial), not an error.

use thiserror::Error;

/// Policy errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An endpoint string did not parse as `address:port`.
    #[error("malformed endpoint '{0}': expected address:port")]
    MalformedEndpoint(String),

    /// A mode name matched none of the known modes.
    #[error("unknown mode '{0}' (expected one of: data-diode, secure-channel, full-lockdown, breach)")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
