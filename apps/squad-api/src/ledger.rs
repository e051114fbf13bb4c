//! Score persistence seam.
//!
//! Squad state never depends on this layer: a ledger outage degrades the
//! scoreboard, nothing else.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;

/// Meters of accumulated distance worth one XP point.
const METERS_PER_XP: f64 = 10.0;

/// A player's accumulated score. Keyed by display name; accumulation only,
/// so both fields are monotonically non-decreasing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoreRecord {
    pub name: String,
    pub xp: u64,
    pub distance: f64,
}

/// Abstraction over the score store.
///
/// Backed by an in-memory map here; a database-backed implementation can
/// replace it without touching squad state. Implementations must use their
/// store's native conditional upsert rather than an application-level lock.
#[async_trait]
pub trait ScoreLedger: Send + Sync {
    /// Accumulate `distance` meters for `name`, creating the record if
    /// absent. Returns the updated record.
    async fn report(&self, name: &str, distance: f64) -> Result<ScoreRecord, ApiError>;

    /// Ranked top-N view, highest XP first.
    async fn top(&self, n: usize) -> Result<Vec<ScoreRecord>, ApiError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

pub struct MemoryLedger {
    data: Mutex<HashMap<String, ScoreRecord>>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
        }
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, ScoreRecord>>, ApiError> {
        // A panic while holding the lock poisons it; surface that as a ledger
        // outage instead of cascading the panic.
        self.data
            .lock()
            .map_err(|_| ApiError::internal("score ledger unavailable"))
    }
}

#[async_trait]
impl ScoreLedger for MemoryLedger {
    async fn report(&self, name: &str, distance: f64) -> Result<ScoreRecord, ApiError> {
        let mut data = self.locked()?;
        let record = data.entry(name.to_string()).or_insert_with(|| ScoreRecord {
            name: name.to_string(),
            xp: 0,
            distance: 0.0,
        });
        record.distance += distance;
        record.xp = (record.distance / METERS_PER_XP) as u64;
        Ok(record.clone())
    }

    async fn top(&self, n: usize) -> Result<Vec<ScoreRecord>, ApiError> {
        let data = self.locked()?;
        let mut rows: Vec<ScoreRecord> = data.values().cloned().collect();
        rows.sort_by(|a, b| b.xp.cmp(&a.xp).then_with(|| a.name.cmp(&b.name)));
        rows.truncate(n);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn report_creates_record_lazily() {
        let ledger = MemoryLedger::new();
        let record = ledger.report("Alice", 95.0).await.unwrap();
        assert_eq!(record.name, "Alice");
        assert_eq!(record.distance, 95.0);
        assert_eq!(record.xp, 9); // floor of 95 / 10
    }

    #[tokio::test]
    async fn report_accumulates() {
        let ledger = MemoryLedger::new();
        ledger.report("Alice", 95.0).await.unwrap();
        let record = ledger.report("Alice", 10.0).await.unwrap();
        assert_eq!(record.distance, 105.0);
        assert_eq!(record.xp, 10);
    }

    #[tokio::test]
    async fn top_ranks_by_xp_then_name() {
        let ledger = MemoryLedger::new();
        ledger.report("Carol", 300.0).await.unwrap();
        ledger.report("Alice", 100.0).await.unwrap();
        ledger.report("Bob", 100.0).await.unwrap();

        let rows = ledger.top(10).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Carol", "Alice", "Bob"]);
    }

    #[tokio::test]
    async fn top_truncates_to_n() {
        let ledger = MemoryLedger::new();
        for i in 0..20 {
            ledger
                .report(&format!("player{i:02}"), (i as f64) * 10.0)
                .await
                .unwrap();
        }
        let rows = ledger.top(5).await.unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].xp, 19);
    }

    #[tokio::test]
    async fn top_on_empty_ledger_is_empty() {
        let ledger = MemoryLedger::new();
        assert!(ledger.top(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn poisoned_ledger_degrades_to_internal_error() {
        use axum::http::StatusCode;

        let ledger = std::sync::Arc::new(MemoryLedger::new());
        let poisoner = std::sync::Arc::clone(&ledger);
        std::thread::spawn(move || {
            let _guard = poisoner.data.lock().unwrap();
            panic!("poison the ledger lock");
        })
        .join()
        .unwrap_err();

        let err = ledger.report("Alice", 10.0).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        let err = ledger.top(10).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
