pub mod channels;
pub mod error;
pub mod functions;
pub mod migrations;
pub mod models;
pub mod password;
pub mod posts;
pub mod users;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

pub use error::{DbError, OptionalExt, Result};
pub use models::{Channel, Post, User};

/// Shared handle over the single SQLite file backing the service.
///
/// One connection behind a mutex: SQLite serializes writers anyway, and
/// every repository call is a short synchronous round trip. Callers on an
/// async runtime should go through `spawn_blocking`.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        functions::register(&conn)?;
        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        functions::register(&conn)?;
        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Release the underlying connection. Meant to be called once, at shutdown.
    pub fn close(self) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|e| DbError::LockPoisoned(e.to_string()))?;
        conn.close().map_err(|(_, e)| DbError::Sqlite(e))?;
        info!("Database closed");
        Ok(())
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DbError::LockPoisoned(e.to_string()))?;
        f(&conn)
    }

    /// Like `with_conn`, but hands out `&mut Connection` so the closure can
    /// open a transaction.
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DbError::LockPoisoned(e.to_string()))?;
        f(&mut conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_file_runs_migrations_and_closes() {
        let path = std::env::temp_dir().join(format!(
            "finch-test-{}-{}.db",
            std::process::id(),
            uuid::Uuid::new_v4()
        ));

        let db = Database::open(&path).unwrap();
        db.create_user("alice", "pw1").unwrap();
        db.close().unwrap();

        // Reopening keeps the data and does not re-apply migrations
        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_user_by_name("alice").unwrap().username, "alice");
        db.close().unwrap();

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn open_fails_for_unreachable_location() {
        let path = std::env::temp_dir()
            .join(format!("finch-missing-{}", uuid::Uuid::new_v4()))
            .join("nested")
            .join("finch.db");
        assert!(Database::open(&path).is_err());
    }
}
