//! SQLite-backed audit trail.

use chrono::{DateTime, Utc};
use policy::Verdict;
use rusqlite::{Connection, params};
use std::path::Path;

use crate::{DecisionRecord, Result, RunId};

/// SQLite-backed store of decision records.
pub struct AuditStore {
    conn: Connection,
}

impl AuditStore {
    /// Open or create an audit store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory audit store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS decisions (
                id TEXT PRIMARY KEY,
                run_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                verdict TEXT NOT NULL,
                data TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_decisions_run
                ON decisions(run_id, timestamp);
            "#,
        )?;
        Ok(())
    }

    /// Append a decision record to the store.
    pub fn append(&self, record: &DecisionRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO decisions (id, run_id, timestamp, verdict, data) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id.to_string(),
                record.run_id.to_string(),
                record.timestamp.to_rfc3339(),
                record.verdict.as_str(),
                serde_json::to_string(record)?,
            ],
        )?;
        Ok(())
    }

    /// Load the records of a run in decision order, optionally filtered by
    /// verdict.
    pub fn load_run(&self, run_id: RunId, verdict: Option<Verdict>) -> Result<Vec<DecisionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT data FROM decisions
             WHERE run_id = ?1 AND (?2 IS NULL OR verdict = ?2)
             ORDER BY timestamp",
        )?;

        let records = stmt
            .query_map(
                params![run_id.to_string(), verdict.map(Verdict::as_str)],
                |row| row.get::<_, String>(0),
            )?
            .filter_map(|r| r.ok())
            .filter_map(|data| serde_json::from_str(&data).ok())
            .collect();

        Ok(records)
    }

    /// Summaries of all recorded runs, most recent first.
    pub fn list_runs(&self) -> Result<Vec<RunSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, MIN(timestamp), COUNT(*),
                    SUM(CASE WHEN verdict = 'deny' THEN 1 ELSE 0 END)
             FROM decisions GROUP BY run_id ORDER BY MIN(timestamp) DESC",
        )?;

        let summaries = stmt
            .query_map([], |row| {
                let run_id: String = row.get(0)?;
                let started_at: String = row.get(1)?;
                let decisions: usize = row.get::<_, i64>(2)? as usize;
                let denials: usize = row.get::<_, i64>(3)? as usize;
                Ok((run_id, started_at, decisions, denials))
            })?
            .filter_map(|r| r.ok())
            .filter_map(|(run_id, started_at, decisions, denials)| {
                Some(RunSummary {
                    id: RunId(run_id.parse().ok()?),
                    started_at: started_at.parse().ok()?,
                    decisions,
                    denials,
                })
            })
            .collect();

        Ok(summaries)
    }
}

/// Summary of one recorded run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub id: RunId,
    pub started_at: DateTime<Utc>,
    pub decisions: usize,
    pub denials: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy::{Reason, ResourceRequest};

    fn sample(run_id: RunId, verdict: Verdict, reason: Reason) -> DecisionRecord {
        DecisionRecord::new(
            run_id,
            ResourceRequest::connect("1.1.1.1:80".parse().unwrap()),
            verdict,
            reason,
        )
    }

    #[test]
    fn records_round_trip() {
        let store = AuditStore::in_memory().unwrap();
        let run_id = RunId::new();
        let record = sample(run_id, Verdict::Deny, Reason::NetworkBlocked);
        store.append(&record).unwrap();

        let loaded = store.load_run(run_id, None).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, record.id);
        assert_eq!(loaded[0].reason, Reason::NetworkBlocked);
    }

    #[test]
    fn verdict_filter_narrows_results() {
        let store = AuditStore::in_memory().unwrap();
        let run_id = RunId::new();
        store
            .append(&sample(run_id, Verdict::Allow, Reason::FullAccess))
            .unwrap();
        store
            .append(&sample(run_id, Verdict::Deny, Reason::NetworkBlocked))
            .unwrap();

        let denials = store.load_run(run_id, Some(Verdict::Deny)).unwrap();
        assert_eq!(denials.len(), 1);
        assert_eq!(denials[0].verdict, Verdict::Deny);
    }

    #[test]
    fn run_summaries_count_denials() {
        let store = AuditStore::in_memory().unwrap();
        let run_id = RunId::new();
        store
            .append(&sample(run_id, Verdict::Allow, Reason::FullAccess))
            .unwrap();
        store
            .append(&sample(run_id, Verdict::Deny, Reason::NetworkBlocked))
            .unwrap();
        store
            .append(&sample(run_id, Verdict::Deny, Reason::NotWhitelisted))
            .unwrap();

        let summaries = store.list_runs().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].decisions, 3);
        assert_eq!(summaries[0].denials, 2);
    }
}
