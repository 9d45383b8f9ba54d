//! # stockask warehouse
//!
//! DuckDB-backed store of daily price records and company names.
//!
//! ## Overview
//!
//! The warehouse is the relational side of stockask: it answers
//! "which price records does `SYMBOL` have between two dates" and
//! "what is the display name of `SYMBOL`". Everything user-supplied reaches
//! DuckDB as a bound parameter.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stockask_warehouse::{PriceRecord, Warehouse};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let warehouse = Warehouse::open_default()?;
//!
//!     warehouse.ingest_prices(
//!         "manual",
//!         &[PriceRecord {
//!             symbol: "AAPL".to_string(),
//!             date: "2015-01-02".to_string(),
//!             open: 111.39,
//!             high: 111.44,
//!             low: 107.35,
//!             close: 109.33,
//!         }],
//!     )?;
//!
//!     let rows = warehouse.prices_in_range("AAPL", "2015-01-01", "2015-12-31")?;
//!     println!("{} rows", rows.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `companies` | Symbol to display name |
//! | `daily_prices` | One OHLC row per symbol and trading day |
//! | `schema_migrations` | Applied migration versions |

pub mod duckdb;
pub mod migrations;

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::Connection;
use ::duckdb::ToSql;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use duckdb::{AccessMode, DuckDbConnectionManager, PooledConnection};

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (file system operations).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A record was rejected before reaching the database.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Configuration for the warehouse database.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Root directory for stockask data.
    pub stockask_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept per access mode.
    pub max_pool_size: usize,
}

impl WarehouseConfig {
    /// Build a configuration rooted at `home`, using the standard layout.
    pub fn in_home(home: impl Into<PathBuf>) -> Self {
        let stockask_home = home.into();
        let db_path = stockask_home.join("cache").join("warehouse.duckdb");
        Self {
            stockask_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self::in_home(resolve_stockask_home())
    }
}

/// One daily price row as stored in `daily_prices`.
///
/// Dates travel as ISO `YYYY-MM-DD` strings; DuckDB casts them on the way in
/// and out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Ticker symbol (e.g., "AAPL").
    pub symbol: String,
    /// Trading day as `YYYY-MM-DD`.
    pub date: String,
    /// Opening price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
}

/// Display name for a ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub symbol: String,
    pub name: String,
}

/// The main warehouse interface for price storage.
#[derive(Clone)]
pub struct Warehouse {
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    /// Open a warehouse with default configuration.
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    /// Open a warehouse with the specified configuration.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::new(config.db_path.clone(), config.max_pool_size);
        let warehouse = Self { manager };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    /// Initialize database schema.
    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire(AccessMode::ReadWrite)?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    /// Get the path to the database file.
    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Insert or replace daily price rows inside a single transaction.
    ///
    /// Rows are checked for an empty symbol before anything is written; one
    /// bad row rejects the whole batch. When a batch repeats a symbol and day,
    /// the last row wins. Returns the number of distinct rows written.
    pub fn ingest_prices(
        &self,
        source: &str,
        rows: &[PriceRecord],
    ) -> Result<usize, WarehouseError> {
        if rows.is_empty() {
            return Ok(0);
        }
        if let Some(row) = rows.iter().find(|row| row.symbol.trim().is_empty()) {
            return Err(WarehouseError::InvalidRecord(format!(
                "price row dated '{}' has an empty symbol",
                row.date
            )));
        }

        let mut latest: BTreeMap<(&str, &str), &PriceRecord> = BTreeMap::new();
        for row in rows {
            latest.insert((row.symbol.as_str(), row.date.as_str()), row);
        }

        let connection = self.manager.acquire(AccessMode::ReadWrite)?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<usize, WarehouseError> {
            for row in latest.values() {
                let params: [&dyn ToSql; 7] = [
                    &row.symbol,
                    &row.date,
                    &row.open,
                    &row.high,
                    &row.low,
                    &row.close,
                    &source,
                ];
                connection.execute(
                    "INSERT OR REPLACE INTO daily_prices \
                     (symbol, date, open, high, low, close, source, updated_at) \
                     VALUES (?, CAST(? AS DATE), ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)",
                    params.as_slice(),
                )?;
            }
            Ok(latest.len())
        })();

        let written = finalize_transaction(&connection, result)?;
        debug!(source, rows = written, "ingested daily prices");
        Ok(written)
    }

    /// Insert or replace company display names.
    pub fn upsert_companies(&self, rows: &[CompanyRecord]) -> Result<usize, WarehouseError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let connection = self.manager.acquire(AccessMode::ReadWrite)?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<usize, WarehouseError> {
            for row in rows {
                let params: [&dyn ToSql; 2] = [&row.symbol, &row.name];
                connection.execute(
                    "INSERT OR REPLACE INTO companies (symbol, name, updated_at) \
                     VALUES (?, ?, CURRENT_TIMESTAMP)",
                    params.as_slice(),
                )?;
            }
            Ok(rows.len())
        })();

        finalize_transaction(&connection, result)
    }

    /// All price rows for `symbol` with `start <= date <= end`, oldest first.
    pub fn prices_in_range(
        &self,
        symbol: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<PriceRecord>, WarehouseError> {
        let connection = self.manager.acquire(AccessMode::ReadOnly)?;
        let mut statement = connection.prepare(
            "SELECT symbol, CAST(date AS VARCHAR), open, high, low, close \
             FROM daily_prices \
             WHERE symbol = ? AND date BETWEEN CAST(? AS DATE) AND CAST(? AS DATE) \
             ORDER BY date",
        )?;
        let params: [&dyn ToSql; 3] = [&symbol, &start, &end];
        let rows = statement.query_map(params.as_slice(), |row| {
            Ok(PriceRecord {
                symbol: row.get(0)?,
                date: row.get(1)?,
                open: row.get(2)?,
                high: row.get(3)?,
                low: row.get(4)?,
                close: row.get(5)?,
            })
        })?;

        let records = rows.collect::<Result<Vec<_>, _>>()?;
        debug!(symbol, start, end, rows = records.len(), "read price range");
        Ok(records)
    }

    /// Display name recorded for `symbol`, if any.
    pub fn company_name(&self, symbol: &str) -> Result<Option<String>, WarehouseError> {
        let connection = self.manager.acquire(AccessMode::ReadOnly)?;
        let mut statement = connection.prepare("SELECT name FROM companies WHERE symbol = ?")?;
        let params: [&dyn ToSql; 1] = [&symbol];
        let mut rows = statement.query(params.as_slice())?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Distinct symbols that have at least one price row.
    pub fn symbols(&self) -> Result<Vec<String>, WarehouseError> {
        let connection = self.manager.acquire(AccessMode::ReadOnly)?;
        let mut statement =
            connection.prepare("SELECT DISTINCT symbol FROM daily_prices ORDER BY symbol")?;
        let rows = statement.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Finalize a transaction, committing on success or rolling back on failure.
fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

/// Resolve the stockask home directory from environment or default.
pub fn resolve_stockask_home() -> PathBuf {
    if let Some(path) = env::var_os("STOCKASK_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".stockask");
    }

    PathBuf::from(".stockask")
}
