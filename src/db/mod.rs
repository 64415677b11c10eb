//! Local SQLite persistence for signals and user preferences.
//!
//! Stores the two upstream inputs the calculator is seeded from:
//! - Published signals (ticker, entry band, stop, target, bid count)
//! - The user's default risk budget
//!
//! Calculator results are never persisted; a ladder is a derived value
//! recomputed from its inputs.

use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::models::{Direction, Signal, SignalStatus};

const DEFAULT_RISK_KEY: &str = "default_risk";

/// Database connection pool for the signal and preference store.
pub struct Database {
    pool: SqlitePool,
}

/// Raw signal row; decimals are stored as text to avoid float drift.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SignalRow {
    pub id: i64,
    pub ticker: String,
    pub direction: String,
    pub entry1: String,
    pub entry2: Option<String>,
    pub stop_loss: String,
    pub target: String,
    pub profile: Option<String>,
    pub bids: Option<i64>,
    pub status: String,
    pub created_at: String,
}

impl TryFrom<SignalRow> for Signal {
    type Error = anyhow::Error;

    fn try_from(row: SignalRow) -> Result<Self> {
        let parse = |field: &str, value: &str| -> Result<Decimal> {
            Decimal::from_str(value)
                .with_context(|| format!("Invalid {field} in signal {}: {value}", row.id))
        };

        Ok(Signal {
            id: row.id,
            direction: Direction::from_str(&row.direction)
                .ok_or_else(|| anyhow!("Invalid direction in signal {}: {}", row.id, row.direction))?,
            entry1: parse("entry1", &row.entry1)?,
            entry2: row.entry2.as_deref().map(|v| parse("entry2", v)).transpose()?,
            stop_loss: parse("stop_loss", &row.stop_loss)?,
            target: parse("target", &row.target)?,
            bids: row.bids.map(|b| b as u32),
            status: SignalStatus::from_str(&row.status)
                .ok_or_else(|| anyhow!("Invalid status in signal {}: {}", row.id, row.status))?,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .with_context(|| format!("Invalid timestamp in signal {}", row.id))?
                .with_timezone(&Utc),
            ticker: row.ticker,
            profile: row.profile,
        })
    }
}

impl Database {
    /// Create a new database connection and run migrations.
    pub async fn new(database_url: &str) -> Result<Self> {
        // One connection: queries are sequential, and in-memory
        // databases exist per connection
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run all database migrations.
    async fn run_migrations(&self) -> Result<()> {
        // Published signals
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS signals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL,
                direction TEXT NOT NULL,
                entry1 TEXT NOT NULL,
                entry2 TEXT,
                stop_loss TEXT NOT NULL,
                target TEXT NOT NULL,
                profile TEXT,
                bids INTEGER,
                status TEXT NOT NULL DEFAULT 'open',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // User preferences (key/value)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_signals_status ON signals(status)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ==================== Signals ====================

    /// Insert a new signal and return its id.
    pub async fn save_signal(&self, signal: &Signal) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO signals (ticker, direction, entry1, entry2, stop_loss, target, profile, bids, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&signal.ticker)
        .bind(signal.direction.as_str())
        .bind(signal.entry1.to_string())
        .bind(signal.entry2.map(|e| e.to_string()))
        .bind(signal.stop_loss.to_string())
        .bind(signal.target.to_string())
        .bind(&signal.profile)
        .bind(signal.bids.map(|b| b as i64))
        .bind(signal.status.as_str())
        .bind(signal.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save signal")?;

        Ok(result.last_insert_rowid())
    }

    /// Fetch one signal by id.
    pub async fn get_signal(&self, id: i64) -> Result<Signal> {
        let row: SignalRow = sqlx::query_as("SELECT * FROM signals WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| anyhow!("Signal {id} not found"))?;

        row.try_into()
    }

    /// List all signals, newest first.
    pub async fn list_signals(&self) -> Result<Vec<Signal>> {
        let rows: Vec<SignalRow> =
            sqlx::query_as("SELECT * FROM signals ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Signal::try_from).collect()
    }

    /// Update a signal's lifecycle status.
    pub async fn set_signal_status(&self, id: i64, status: SignalStatus) -> Result<()> {
        let result = sqlx::query("UPDATE signals SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("Signal {id} not found"));
        }

        Ok(())
    }

    /// Delete a signal.
    pub async fn remove_signal(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM signals WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("Signal {id} not found"));
        }

        Ok(())
    }

    // ==================== Preferences ====================

    /// Get the persisted default risk budget, if any.
    pub async fn get_default_risk(&self) -> Result<Option<Decimal>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM preferences WHERE key = ?")
                .bind(DEFAULT_RISK_KEY)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(value,)| {
            Decimal::from_str(&value)
                .with_context(|| format!("Invalid stored default risk: {value}"))
        })
        .transpose()
    }

    /// Persist the default risk budget.
    pub async fn set_default_risk(&self, risk: Decimal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO preferences (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
        )
        .bind(DEFAULT_RISK_KEY)
        .bind(risk.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to save default risk")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_signal() -> Signal {
        Signal {
            id: 0,
            ticker: "BTCUSDT".to_string(),
            direction: Direction::Long,
            entry1: dec!(50000),
            entry2: Some(dec!(49000)),
            stop_loss: dec!(48500),
            target: dec!(52000),
            profile: Some("SCALP".to_string()),
            bids: Some(4),
            status: SignalStatus::Open,
            created_at: Utc::now(),
        }
    }

    async fn test_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_signal_round_trip() {
        let db = test_db().await;

        let id = db.save_signal(&sample_signal()).await.unwrap();
        let loaded = db.get_signal(id).await.unwrap();

        assert_eq!(loaded.ticker, "BTCUSDT");
        assert_eq!(loaded.direction, Direction::Long);
        assert_eq!(loaded.entry1, dec!(50000));
        assert_eq!(loaded.entry2, Some(dec!(49000)));
        assert_eq!(loaded.stop_loss, dec!(48500));
        assert_eq!(loaded.target, dec!(52000));
        assert_eq!(loaded.bids, Some(4));
        assert_eq!(loaded.status, SignalStatus::Open);
    }

    #[tokio::test]
    async fn test_signal_status_update_and_remove() {
        let db = test_db().await;
        let id = db.save_signal(&sample_signal()).await.unwrap();

        db.set_signal_status(id, SignalStatus::Filled).await.unwrap();
        assert_eq!(db.get_signal(id).await.unwrap().status, SignalStatus::Filled);

        db.remove_signal(id).await.unwrap();
        assert!(db.get_signal(id).await.is_err());
        assert!(db.set_signal_status(id, SignalStatus::Closed).await.is_err());
    }

    #[tokio::test]
    async fn test_list_signals() {
        let db = test_db().await;
        db.save_signal(&sample_signal()).await.unwrap();

        let mut second = sample_signal();
        second.ticker = "ETHUSDT".to_string();
        db.save_signal(&second).await.unwrap();

        let signals = db.list_signals().await.unwrap();
        assert_eq!(signals.len(), 2);
    }

    #[tokio::test]
    async fn test_default_risk_preference() {
        let db = test_db().await;

        assert_eq!(db.get_default_risk().await.unwrap(), None);

        db.set_default_risk(dec!(40)).await.unwrap();
        assert_eq!(db.get_default_risk().await.unwrap(), Some(dec!(40)));

        db.set_default_risk(dec!(75.5)).await.unwrap();
        assert_eq!(db.get_default_risk().await.unwrap(), Some(dec!(75.5)));
    }
}
