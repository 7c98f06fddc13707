use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A network destination: IPv4 address plus port.
///
/// Parses from the `"address:port"` form used in whitelist configuration.
/// A string that does not parse is a contract violation surfaced as
/// [`Error::MalformedEndpoint`], distinct from a policy denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub addr: Ipv4Addr,
    pub port: u16,
}

impl Endpoint {
    pub const fn new(addr: Ipv4Addr, port: u16) -> Self {
        Self { addr, port }
    }

    /// Build from the raw octets the driver hands across the capability
    /// boundary.
    pub const fn from_octets(octets: [u8; 4], port: u16) -> Self {
        Self {
            addr: Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.addr, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let malformed = || Error::MalformedEndpoint(s.to_string());
        let (addr, port) = s.rsplit_once(':').ok_or_else(malformed)?;
        Ok(Self {
            addr: addr.parse().map_err(|_| malformed())?,
            port: port.parse().map_err(|_| malformed())?,
        })
    }
}

/// What the driver is asking for. Constructed once per call, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceRequest {
    /// A filesystem read, identified by path.
    File { path: String },
    /// An outbound connection to a network endpoint.
    Connect { endpoint: Endpoint },
}

impl ResourceRequest {
    pub fn file(path: impl Into<String>) -> Self {
        Self::File { path: path.into() }
    }

    pub fn connect(endpoint: Endpoint) -> Self {
        Self::Connect { endpoint }
    }
}

impl fmt::Display for ResourceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path } => write!(f, "file {path}"),
            Self::Connect { endpoint } => write!(f, "connect {endpoint}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_parses_address_and_port() {
        let ep: Endpoint = "10.0.0.50:502".parse().unwrap();
        assert_eq!(ep.addr, Ipv4Addr::new(10, 0, 0, 50));
        assert_eq!(ep.port, 502);
    }

    #[test]
    fn endpoint_display_round_trips() {
        let ep = Endpoint::from_octets([192, 168, 100, 10], 443);
        assert_eq!(ep.to_string().parse::<Endpoint>().unwrap(), ep);
    }

    #[test]
    fn malformed_endpoints_are_rejected() {
        for bad in ["", "10.0.0.50", "not-an-address:80", "10.0.0.50:-1", "10.0.0.50:99999"] {
            assert!(
                matches!(bad.parse::<Endpoint>(), Err(Error::MalformedEndpoint(_))),
                "expected {bad:?} to be malformed"
            );
        }
    }

    #[test]
    fn request_serializes_tagged() {
        let json = serde_json::to_value(ResourceRequest::file("mnt/sensor_data.json")).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["path"], "mnt/sensor_data.json");
    }
}
