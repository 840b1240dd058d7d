use std::collections::HashMap;

use chrono::Utc;
use rusqlite::{Connection, Row, params};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::NotFoundExt;
use crate::models::{Channel, Post, User};
use crate::users::query_user_by_id;
use crate::functions::fold_case;
use crate::{Database, Result};

/// A post row before its owner has been resolved.
struct PostRow {
    id: i64,
    uuid: String,
    user_id: i64,
    body: String,
    posted: i64,
}

impl PostRow {
    fn with_user(self, user: User) -> Post {
        Post {
            id: self.id,
            uuid: self.uuid,
            user,
            body: self.body,
            posted: self.posted,
        }
    }
}

impl Database {
    /// Load one post and its owner. Channel associations are not loaded;
    /// use `get_post_channels` for those.
    pub fn get_post(&self, id: i64) -> Result<Post> {
        self.with_conn(|conn| query_post(conn, id))
    }

    pub fn get_post_by_uuid(&self, uuid: &str) -> Result<Post> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, uuid, user_id, body, posted FROM post WHERE uuid = ?1",
                    [uuid],
                    map_post_row,
                )
                .or_not_found(|| format!("post '{}'", uuid))?;

            let user = query_user_by_id(conn, row.user_id)?;
            Ok(row.with_user(user))
        })
    }

    /// Global feed, newest first. Posts whose owner can't be resolved are
    /// dropped from the page rather than failing it.
    pub fn get_all_posts(&self, limit: u32, offset: u32) -> Result<Vec<Post>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, uuid, user_id, body, posted
                 FROM post
                 ORDER BY posted DESC, id DESC
                 LIMIT ?1 OFFSET ?2",
            )?;

            let rows = stmt
                .query_map(params![limit, offset], map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(resolve_owners(conn, rows))
        })
    }

    /// One user's posts, newest first.
    pub fn get_all_user_posts(&self, user: &User, limit: u32, offset: u32) -> Result<Vec<Post>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, uuid, user_id, body, posted
                 FROM post
                 WHERE user_id = ?1
                 ORDER BY posted DESC, id DESC
                 LIMIT ?2 OFFSET ?3",
            )?;

            let posts = stmt
                .query_map(params![user.id, limit, offset], map_post_row)?
                .map(|row| row.map(|r| r.with_user(user.clone())))
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(posts)
        })
    }

    /// Posts tagged into `channel`, newest first.
    pub fn get_channel_posts(
        &self,
        channel: &Channel,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Post>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.uuid, p.user_id, p.body, p.posted
                 FROM post p
                 JOIN postchannel pc ON pc.post_id = p.id
                 WHERE pc.channel_id = ?1
                 ORDER BY p.posted DESC, p.id DESC
                 LIMIT ?2 OFFSET ?3",
            )?;

            let rows = stmt
                .query_map(params![channel.id, limit, offset], map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(resolve_owners(conn, rows))
        })
    }

    /// Case-insensitive substring search over post bodies, newest first.
    ///
    /// Both sides are folded with Rust's Unicode lowercasing, so "über"
    /// matches "Über". The query is matched literally.
    pub fn search_posts(&self, query: &str, limit: u32, offset: u32) -> Result<Vec<Post>> {
        let needle = fold_case(query);

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, uuid, user_id, body, posted
                 FROM post
                 WHERE instr(fold_case(body), ?1) > 0
                 ORDER BY posted DESC, id DESC
                 LIMIT ?2 OFFSET ?3",
            )?;

            let rows = stmt
                .query_map(params![needle, limit, offset], map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(resolve_owners(conn, rows))
        })
    }

    /// Insert a post and its channel associations in one transaction, then
    /// read it back.
    ///
    /// Association inserts are best-effort: a failing join row is logged and
    /// the post still commits with whatever associations succeeded.
    pub fn create_post(&self, user: &User, body: &str, channels: &[Channel]) -> Result<Post> {
        let uuid = Uuid::new_v4().to_string();
        let posted = Utc::now().timestamp();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO post (uuid, user_id, body, posted) VALUES (?1, ?2, ?3, ?4)",
                params![uuid, user.id, body, posted],
            )?;
            let post_id = tx.last_insert_rowid();
            debug!(post_id, "Inserted post");

            {
                let mut stmt =
                    tx.prepare("INSERT INTO postchannel (post_id, channel_id) VALUES (?1, ?2)")?;
                for channel in channels {
                    if let Err(e) = stmt.execute(params![post_id, channel.id]) {
                        warn!(
                            post_id,
                            channel_id = channel.id,
                            "Failed to associate channel with post: {}",
                            e
                        );
                    }
                }
            }

            tx.commit()?;

            let post = query_post(conn, post_id)?;
            info!(post_id, user_id = user.id, channels = channels.len(), "Created post");
            Ok(post)
        })
    }
}

fn map_post_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        uuid: row.get(1)?,
        user_id: row.get(2)?,
        body: row.get(3)?,
        posted: row.get(4)?,
    })
}

fn query_post(conn: &Connection, id: i64) -> Result<Post> {
    let row = conn
        .query_row(
            "SELECT id, uuid, user_id, body, posted FROM post WHERE id = ?1",
            [id],
            map_post_row,
        )
        .or_not_found(|| format!("post #{}", id))?;

    let user = query_user_by_id(conn, row.user_id)?;
    Ok(row.with_user(user))
}

/// Attach owners to a page of rows, skipping rows whose owner lookup fails.
fn resolve_owners(conn: &Connection, rows: Vec<PostRow>) -> Vec<Post> {
    let mut users: HashMap<i64, User> = HashMap::new();
    let mut posts = Vec::with_capacity(rows.len());

    for row in rows {
        let user = match users.get(&row.user_id) {
            Some(user) => user.clone(),
            None => match query_user_by_id(conn, row.user_id) {
                Ok(user) => {
                    users.insert(user.id, user.clone());
                    user
                }
                Err(e) => {
                    warn!(post_id = row.id, user_id = row.user_id, "Skipping post: {}", e);
                    continue;
                }
            },
        };
        posts.push(row.with_user(user));
    }

    posts
}
