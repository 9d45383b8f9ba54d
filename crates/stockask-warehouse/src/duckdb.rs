//! `DuckDB` connection reuse.
//!
//! Every connection is a clone of one lazily opened database instance, so
//! rows written through a read-write connection are visible to readers
//! straight away. Idle clones are parked per access mode.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ::duckdb::Connection;

/// Access mode for database connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Read-only access.
    ReadOnly,
    /// Read-write access.
    ReadWrite,
}

#[derive(Default)]
struct IdleConnections {
    read_only: Vec<Connection>,
    read_write: Vec<Connection>,
}

impl IdleConnections {
    fn slot(&mut self, mode: AccessMode) -> &mut Vec<Connection> {
        match mode {
            AccessMode::ReadOnly => &mut self.read_only,
            AccessMode::ReadWrite => &mut self.read_write,
        }
    }
}

struct PoolInner {
    db_path: PathBuf,
    max_pool_size: usize,
    root: Mutex<Option<Connection>>,
    idle: Mutex<IdleConnections>,
}

impl PoolInner {
    // A panic while holding the lock can only leave a Vec half-pushed, which
    // is still a valid list of connections.
    fn idle(&self) -> MutexGuard<'_, IdleConnections> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(&self) -> Result<Connection, ::duckdb::Error> {
        let mut root = self.root.lock().unwrap_or_else(PoisonError::into_inner);
        let connection = match root.as_ref() {
            Some(root) => root.try_clone()?,
            None => {
                let opened = Connection::open(self.db_path.as_path())?;
                let clone = opened.try_clone()?;
                *root = Some(opened);
                clone
            }
        };
        drop(root);

        configure_connection(&connection)?;
        Ok(connection)
    }
}

/// Hands out connections to one `DuckDB` file, keeping up to
/// `max_pool_size` idle connections per access mode.
#[derive(Clone)]
pub struct DuckDbConnectionManager {
    inner: Arc<PoolInner>,
}

impl DuckDbConnectionManager {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, max_pool_size: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                db_path: path.into(),
                max_pool_size: max_pool_size.max(1),
                root: Mutex::new(None),
                idle: Mutex::new(IdleConnections::default()),
            }),
        }
    }

    /// Reuse an idle connection for `mode` or open a new one.
    ///
    /// # Errors
    /// Returns an error if the database file cannot be opened or configured.
    pub fn acquire(&self, mode: AccessMode) -> Result<PooledConnection, ::duckdb::Error> {
        let parked = self.inner.idle().slot(mode).pop();

        let connection = match parked {
            Some(connection) => connection,
            None => self.inner.open()?,
        };

        Ok(PooledConnection {
            mode,
            pool: Arc::clone(&self.inner),
            connection: Some(connection),
        })
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        self.inner.db_path.as_path()
    }

    /// Number of idle connections currently parked for `mode`.
    #[must_use]
    pub fn idle_count(&self, mode: AccessMode) -> usize {
        self.inner.idle().slot(mode).len()
    }
}

/// A connection that goes back to its manager when dropped.
pub struct PooledConnection {
    mode: AccessMode,
    pool: Arc<PoolInner>,
    // Always `Some` until `drop` takes it.
    connection: Option<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    #[allow(clippy::expect_used)]
    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("pooled connection taken before drop")
    }
}

impl DerefMut for PooledConnection {
    #[allow(clippy::expect_used)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("pooled connection taken before drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        let mut idle = self.pool.idle();
        let slot = idle.slot(self.mode);
        if slot.len() < self.pool.max_pool_size {
            slot.push(connection);
        }
    }
}

// access_mode is fixed when the instance opens, so read-only connections are
// read-only by convention: the warehouse only issues SELECTs on them.
fn configure_connection(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch("PRAGMA disable_progress_bar;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn dropped_connections_are_parked_up_to_the_limit() {
        let temp = tempdir().expect("tempdir");
        let manager = DuckDbConnectionManager::new(temp.path().join("pool.duckdb"), 1);

        let first = manager.acquire(AccessMode::ReadWrite).expect("first");
        let second = manager.acquire(AccessMode::ReadWrite).expect("second");
        drop(first);
        drop(second);

        assert_eq!(manager.idle_count(AccessMode::ReadWrite), 1);
        assert_eq!(manager.idle_count(AccessMode::ReadOnly), 0);
    }

    #[test]
    fn readers_see_rows_written_through_another_connection() {
        let temp = tempdir().expect("tempdir");
        let manager = DuckDbConnectionManager::new(temp.path().join("pool.duckdb"), 2);

        let writer = manager.acquire(AccessMode::ReadWrite).expect("writer");
        writer
            .execute_batch("CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (1), (2);")
            .expect("write");

        let reader = manager.acquire(AccessMode::ReadOnly).expect("reader");
        let count: i64 = reader
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 2);
    }
}
