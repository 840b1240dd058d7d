use rusqlite::{Connection, Row, params};
use tracing::{info, warn};

use crate::error::NotFoundExt;
use crate::models::{Channel, User};
use crate::users::query_user_by_id;
use crate::{Database, Result};

impl Database {
    /// All channels owned by `user`, in insertion order.
    pub fn list_channels_for_user(&self, user: &User) -> Result<Vec<Channel>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, slug, label FROM channel WHERE user_id = ?1 ORDER BY id",
            )?;

            let rows = stmt
                .query_map([user.id], map_channel)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Create one channel per non-blank label inside a single transaction.
    ///
    /// Inserts are best-effort: a label whose slug already exists for this
    /// user (or that fails for any other reason) is logged and skipped, and
    /// the rest still commit. Only channels that were actually inserted are
    /// returned.
    pub fn create_channels<S: AsRef<str>>(
        &self,
        user: &User,
        labels: &[S],
    ) -> Result<Vec<Channel>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut created = Vec::new();

            {
                let mut stmt =
                    tx.prepare("INSERT INTO channel (user_id, slug, label) VALUES (?1, ?2, ?3)")?;

                for label in labels {
                    let label = label.as_ref().trim();
                    if label.is_empty() {
                        continue;
                    }
                    let slug = Channel::slugify(label);

                    if let Err(e) = stmt.execute(params![user.id, slug, label]) {
                        warn!(user_id = user.id, %slug, "Skipping channel: {}", e);
                        continue;
                    }

                    match query_channel_by_user_and_slug(&tx, user.id, &slug) {
                        Ok(channel) => created.push(channel),
                        Err(e) => {
                            warn!(user_id = user.id, %slug, "Inserted channel not readable: {}", e)
                        }
                    }
                }
            }

            tx.commit()?;

            if !created.is_empty() {
                info!(user_id = user.id, count = created.len(), "Created channels");
            }
            Ok(created)
        })
    }

    pub fn get_channel_by_user_and_slug(&self, user: &User, slug: &str) -> Result<Channel> {
        self.with_conn(|conn| query_channel_by_user_and_slug(conn, user.id, slug))
    }

    /// Look a channel up by id and resolve its owner. A dangling owner is
    /// reported as `NotFound` for the user.
    pub fn get_channel_by_id(&self, id: i64) -> Result<(Channel, User)> {
        self.with_conn(|conn| {
            let channel = conn
                .query_row(
                    "SELECT id, user_id, slug, label FROM channel WHERE id = ?1",
                    [id],
                    map_channel,
                )
                .or_not_found(|| format!("channel #{}", id))?;

            let owner = query_user_by_id(conn, channel.user_id)?;
            Ok((channel, owner))
        })
    }

    /// Channels a post was tagged into, in channel insertion order.
    pub fn get_post_channels(&self, post_id: i64) -> Result<Vec<Channel>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.user_id, c.slug, c.label
                 FROM channel c
                 JOIN postchannel pc ON pc.channel_id = c.id
                 WHERE pc.post_id = ?1
                 ORDER BY c.id",
            )?;

            let rows = stmt
                .query_map([post_id], map_channel)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn map_channel(row: &Row<'_>) -> rusqlite::Result<Channel> {
    Ok(Channel {
        id: row.get(0)?,
        user_id: row.get(1)?,
        slug: row.get(2)?,
        label: row.get(3)?,
    })
}

fn query_channel_by_user_and_slug(conn: &Connection, user_id: i64, slug: &str) -> Result<Channel> {
    conn.query_row(
        "SELECT id, user_id, slug, label FROM channel WHERE user_id = ?1 AND slug = ?2",
        params![user_id, slug],
        map_channel,
    )
    .or_not_found(|| format!("channel '{}' for user #{}", slug, user_id))
}
