//! Host-granted resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// The one path the builtin table serves.
pub const SENSOR_DATA_PATH: &str = "mnt/sensor_data.json";

/// Wellhead telemetry, as served from the sensor resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorData {
    pub well_id: String,
    pub pressure_psi: f64,
    pub temp_celsius: f64,
    pub flow_rate: f64,
    pub timestamp: DateTime<Utc>,
}

/// The host's deny-by-default filesystem.
///
/// One logical root is preopened for the driver; under it, only explicitly
/// granted entries resolve. Everything else is absent: there is no
/// directory listing, no write path, no way to reach outside the table.
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    entries: Vec<(String, Vec<u8>)>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a resource at the given path (relative to the root).
    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.entries.push((path.into(), bytes));
    }

    /// The default table: the single wellhead telemetry resource.
    pub fn builtin() -> Self {
        let payload = json!({
            "well_id": "WLD-4721",
            "pressure_psi": 2847.3,
            "temp_celsius": 67.8,
            "flow_rate": 1250.0,
            "timestamp": Utc::now().to_rfc3339(),
        });
        let mut table = Self::new();
        table.insert(SENSOR_DATA_PATH, payload.to_string().into_bytes());
        table
    }

    /// Resolve a path to its granted bytes.
    ///
    /// Paths are relative to the preopened root; a leading slash is
    /// tolerated. Anything not granted resolves to `None`.
    pub fn resolve(&self, path: &str) -> Option<&[u8]> {
        let relative = path.trim_start_matches('/');
        self.entries
            .iter()
            .find(|(granted, _)| granted == relative)
            .map(|(_, bytes)| bytes.as_slice())
    }
}
