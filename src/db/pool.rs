//! SQLite connection wrapper (lightweight for CLI usage).
//!
//! Every call into the database goes through [`DbPool::run`] or
//! [`DbPool::run_mut`], which apply the retry policy.

use crate::core::retry::RetryPolicy;
use crate::errors::AppResult;
use crate::utils::path::expand_tilde;
use rusqlite::{Connection, Transaction};

pub struct DbPool {
    pub conn: Connection,
    retry: RetryPolicy,
}

impl DbPool {
    pub fn new(path: &str) -> AppResult<Self> {
        Self::with_policy(path, RetryPolicy::default())
    }

    pub fn with_policy(path: &str, retry: RetryPolicy) -> AppResult<Self> {
        let conn = Connection::open(expand_tilde(path))?;
        Self::from_connection(conn, retry)
    }

    /// Private in-memory database, mostly for tests.
    pub fn in_memory() -> AppResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, RetryPolicy::default())
    }

    fn from_connection(conn: Connection, retry: RetryPolicy) -> AppResult<Self> {
        // Per-attempt wait on a locked database; the policy bounds the total.
        conn.busy_timeout(retry.timeout / retry.max_attempts.max(1))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn, retry })
    }

    /// Execute a read or single-statement write with retries.
    pub fn run<T, F>(&self, mut op: F) -> AppResult<T>
    where
        F: FnMut(&Connection) -> AppResult<T>,
    {
        self.retry.run(|| op(&self.conn))
    }

    /// Execute with a mutable connection (transactions) with retries.
    pub fn run_mut<T, F>(&mut self, mut op: F) -> AppResult<T>
    where
        F: FnMut(&mut Connection) -> AppResult<T>,
    {
        let Self { conn, retry } = self;
        retry.run(|| op(&mut *conn))
    }

    /// Run `op` inside a transaction, committed only when `op` succeeds.
    /// A transient failure rolls back and retries the whole unit.
    pub fn transaction<T, F>(&mut self, mut op: F) -> AppResult<T>
    where
        F: FnMut(&Transaction<'_>) -> AppResult<T>,
    {
        self.run_mut(|conn| {
            let tx = conn.transaction()?;
            let value = op(&tx)?;
            tx.commit()?;
            Ok(value)
        })
    }
}
