use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS channel (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                slug        TEXT NOT NULL,
                label       TEXT NOT NULL,
                UNIQUE(user_id, slug)
            );

            CREATE TABLE IF NOT EXISTS post (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                uuid        TEXT NOT NULL UNIQUE,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                body        TEXT NOT NULL,
                posted      INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_post_posted
                ON post(posted);

            CREATE INDEX IF NOT EXISTS idx_post_user_posted
                ON post(user_id, posted);

            CREATE TABLE IF NOT EXISTS postchannel (
                post_id     INTEGER NOT NULL REFERENCES post(id),
                channel_id  INTEGER NOT NULL REFERENCES channel(id),
                PRIMARY KEY (post_id, channel_id)
            );

            CREATE INDEX IF NOT EXISTS idx_postchannel_channel
                ON postchannel(channel_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
