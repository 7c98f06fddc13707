//! Decision records: one immutable entry per capability call.

use chrono::{DateTime, Utc};
use policy::{Reason, ResourceRequest, Verdict};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for one driver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An audit entry describing one capability decision.
///
/// Created by the gateway on every call, allowed or denied, and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: Uuid,
    pub run_id: RunId,
    pub timestamp: DateTime<Utc>,
    pub request: ResourceRequest,
    pub verdict: Verdict,
    pub reason: Reason,
}

impl DecisionRecord {
    pub fn new(run_id: RunId, request: ResourceRequest, verdict: Verdict, reason: Reason) -> Self {
        Self {
            id: Uuid::new_v4(),
            run_id,
            timestamp: Utc::now(),
            request,
            verdict,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_with_stable_codes() {
        let record = DecisionRecord::new(
            RunId::new(),
            ResourceRequest::connect("1.1.1.1:80".parse().unwrap()),
            Verdict::Deny,
            Reason::NetworkBlocked,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["verdict"], "deny");
        assert_eq!(json["reason"], "network_blocked");
        assert_eq!(json["request"]["kind"], "connect");
    }
}
