use rusqlite::{Connection, Row};
use tracing::info;

use crate::error::NotFoundExt;
use crate::models::User;
use crate::{Database, Result, password};

impl Database {
    pub fn get_user_by_name(&self, username: &str) -> Result<User> {
        self.with_conn(|conn| query_user_by_name(conn, username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<User> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    /// Hashes `plaintext`, inserts the user and reads the row back.
    ///
    /// A taken username fails on the `UNIQUE` constraint and comes back as
    /// `DbError::Sqlite`; nothing is written in that case.
    pub fn create_user(&self, username: &str, plaintext: &str) -> Result<User> {
        let hash = password::hash_password(plaintext)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                (username, &hash),
            )?;
            tx.commit()?;

            let user = query_user_by_name(conn, username)?;
            info!(user_id = user.id, username, "Created user");
            Ok(user)
        })
    }
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
    })
}

pub(crate) fn query_user_by_name(conn: &Connection, username: &str) -> Result<User> {
    let mut stmt = conn.prepare("SELECT id, username, password FROM users WHERE username = ?1")?;

    stmt.query_row([username], map_user)
        .or_not_found(|| format!("user '{}'", username))
}

pub(crate) fn query_user_by_id(conn: &Connection, id: i64) -> Result<User> {
    let mut stmt = conn.prepare("SELECT id, username, password FROM users WHERE id = ?1")?;

    stmt.query_row([id], map_user)
        .or_not_found(|| format!("user #{}", id))
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbError};

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn create_then_lookup_by_name() {
        let db = test_db();
        let created = db.create_user("alice", "pw1").unwrap();
        assert_eq!(created.username, "alice");
        assert!(created.id > 0);

        let loaded = db.get_user_by_name("alice").unwrap();
        assert_eq!(loaded, created);
        assert!(loaded.check_password("pw1"));
        assert!(!loaded.check_password("pw2"));
        assert!(!loaded.check_password("PW1"));
    }

    #[test]
    fn lookup_by_id() {
        let db = test_db();
        let alice = db.create_user("alice", "pw1").unwrap();
        let bob = db.create_user("bob", "pw2").unwrap();
        assert_ne!(alice.id, bob.id);

        assert_eq!(db.get_user_by_id(bob.id).unwrap().username, "bob");
    }

    #[test]
    fn missing_user_is_not_found() {
        let db = test_db();
        assert!(matches!(db.get_user_by_name("ghost"), Err(DbError::NotFound(_))));
        assert!(db.get_user_by_id(42).unwrap_err().is_not_found());
    }

    #[test]
    fn optional_turns_not_found_into_none() {
        use crate::OptionalExt;

        let db = test_db();
        db.create_user("alice", "pw1").unwrap();
        assert!(db.get_user_by_name("alice").optional().unwrap().is_some());
        assert!(db.get_user_by_name("ghost").optional().unwrap().is_none());
    }

    #[test]
    fn duplicate_username_fails_and_keeps_original() {
        let db = test_db();
        let first = db.create_user("alice", "pw1").unwrap();

        let err = db.create_user("alice", "other").unwrap_err();
        assert!(matches!(err, DbError::Sqlite(_)));
        assert!(err.is_unique_violation());
        assert!(!db.get_user_by_id(999).unwrap_err().is_unique_violation());

        let still = db.get_user_by_name("alice").unwrap();
        assert_eq!(still.id, first.id);
        assert!(still.check_password("pw1"));
    }
}
