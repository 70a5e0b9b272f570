//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The training orchestration and tools call store methods — they never
//! execute SQL directly.

use crate::{
    error::ChurnResult,
    explain::RiskSegment,
    features::RawRecord,
    types::CustomerId,
};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

/// One row of the customers table, as written by the seeding side.
/// Every attribute is optional — the preparer handles the gaps.
#[derive(Debug, Clone, Default)]
pub struct CustomerRow {
    pub customer_id:           CustomerId,
    pub engagement_score:      Option<f64>,
    pub tenure:                Option<f64>,
    pub support_response_time: Option<f64>,
    pub revenue:               Option<f64>,
    pub last_activity_date:    Option<String>,
}

/// One row of the churn_predictions table.
#[derive(Debug, Clone)]
pub struct PredictionRow {
    pub customer_id:       CustomerId,
    pub churn_probability: f64,
    pub risk_segment:      String,
    pub model_version:     String,
    pub scored_at:         String,
}

pub struct CustomerStore {
    conn: Connection,
}

impl CustomerStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> ChurnResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only works for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ChurnResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ChurnResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_churn.sql"))?;
        Ok(())
    }

    // ── Customers ──────────────────────────────────────────────

    pub fn insert_customer(&self, row: &CustomerRow) -> ChurnResult<()> {
        self.conn.execute(
            "INSERT INTO customers (
                customer_id, engagement_score, tenure,
                support_response_time, revenue, last_activity_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                row.customer_id,
                row.engagement_score,
                row.tenure,
                row.support_response_time,
                row.revenue,
                row.last_activity_date,
            ],
        )?;
        Ok(())
    }

    pub fn customer_count(&self) -> ChurnResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
        Ok(count)
    }

    /// All customer rows as raw records, in insertion order. NULL columns
    /// are left out of the record so the preparer's defaulting policy
    /// applies to them.
    pub fn fetch_customers(&self) -> ChurnResult<Vec<RawRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, engagement_score, tenure,
                    support_response_time, revenue, last_activity_date
             FROM customers
             ORDER BY rowid ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let mut record = RawRecord::new();
            let customer_id: String = row.get(0)?;
            record.insert("customer_id".into(), customer_id.into());

            let numeric_columns = [
                (1, "engagement_score"),
                (2, "tenure"),
                (3, "support_response_time"),
                (4, "revenue"),
            ];
            for (idx, key) in numeric_columns {
                if let Some(value) = row.get::<_, Option<f64>>(idx)? {
                    record.insert(key.into(), value.into());
                }
            }
            if let Some(date) = row.get::<_, Option<String>>(5)? {
                record.insert("last_activity_date".into(), date.into());
            }
            Ok(record)
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ── Predictions ────────────────────────────────────────────

    /// Write the live prediction for a customer. A single conditional
    /// write replaces any prior row atomically — there is no window in
    /// which the customer has no prediction.
    pub fn upsert_prediction(
        &self,
        customer_id: &str,
        churn_probability: f64,
        risk_segment: RiskSegment,
        model_version: &str,
    ) -> ChurnResult<()> {
        self.conn.execute(
            "INSERT INTO churn_predictions (
                customer_id, churn_probability, risk_segment, model_version, scored_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(customer_id) DO UPDATE SET
                churn_probability = excluded.churn_probability,
                risk_segment      = excluded.risk_segment,
                model_version     = excluded.model_version,
                scored_at         = excluded.scored_at",
            params![
                customer_id,
                churn_probability,
                risk_segment.as_str(),
                model_version,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn prediction_for(&self, customer_id: &str) -> ChurnResult<Option<PredictionRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT customer_id, churn_probability, risk_segment, model_version, scored_at
                 FROM churn_predictions
                 WHERE customer_id = ?1",
                params![customer_id],
                |row| {
                    Ok(PredictionRow {
                        customer_id:       row.get(0)?,
                        churn_probability: row.get(1)?,
                        risk_segment:      row.get(2)?,
                        model_version:     row.get(3)?,
                        scored_at:         row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn prediction_count(&self) -> ChurnResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM churn_predictions", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn segment_count(&self, segment: RiskSegment) -> ChurnResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM churn_predictions WHERE risk_segment = ?1",
            params![segment.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
