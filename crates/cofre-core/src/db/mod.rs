//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `categories` - Category CRUD and default seeding
//! - `movements` - Movement recording (normalized) and queries
//! - `vaults` - Vault deposits and re-validated withdrawals
//! - `recurring` - Recurring rules, confirmation and automatic processing
//! - `goals` - Savings goals and contributions
//! - `reports` - Snapshots built from the whole ledger
//! - `settings` - Opening balance and currency
//! - `audit` - Audit log

use chrono::{DateTime, NaiveDate, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use tracing::info;

use crate::error::Result;

mod audit;
mod categories;
mod goals;
mod movements;
mod recurring;
mod reports;
mod settings;
mod vaults;

pub use audit::AuditEntry;
pub use movements::MovementFilter;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Read a `YYYY-MM-DD` column
pub(crate) fn get_date(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) the database at `path` and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
        });
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "cofre_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the single writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Categories (income/expense buckets, vaults when vault_kind != 'none')
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                nature TEXT NOT NULL CHECK (nature IN ('income', 'expense')),
                vault_kind TEXT NOT NULL DEFAULT 'none'
                    CHECK (vault_kind IN ('none', 'investment', 'emergency')),
                monthly_limit INTEGER NOT NULL DEFAULT 0 CHECK (monthly_limit >= 0),
                color TEXT NOT NULL DEFAULT '#64748b',
                icon TEXT NOT NULL DEFAULT 'tag',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Movements (amount in signed minor units, never zero)
            CREATE TABLE IF NOT EXISTS movements (
                id INTEGER PRIMARY KEY,
                amount INTEGER NOT NULL CHECK (amount <> 0),
                description TEXT NOT NULL,
                category_id INTEGER REFERENCES categories(id),
                date DATE NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_movements_date ON movements(date);
            CREATE INDEX IF NOT EXISTS idx_movements_category ON movements(category_id);

            -- Recurring rules (state is derived from movements, never stored)
            CREATE TABLE IF NOT EXISTS recurring_rules (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                amount INTEGER NOT NULL CHECK (amount <> 0),
                day_of_month INTEGER NOT NULL CHECK (day_of_month BETWEEN 1 AND 31),
                category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
                active BOOLEAN NOT NULL DEFAULT 1,
                process_automatically BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Savings goals (saved amount tracked on the goal, not derived from vaults)
            CREATE TABLE IF NOT EXISTS savings_goals (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                target_amount INTEGER NOT NULL CHECK (target_amount > 0),
                current_amount INTEGER NOT NULL DEFAULT 0 CHECK (current_amount >= 0),
                target_date DATE NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Ledger settings (opening balance, currency)
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Audit log (every write through the CLI or API)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                actor TEXT NOT NULL,
                action TEXT NOT NULL,
                entity_type TEXT,
                entity_id INTEGER,
                details TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_audit_log_timestamp ON audit_log(timestamp);
            CREATE INDEX IF NOT EXISTS idx_audit_log_action ON audit_log(action);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
