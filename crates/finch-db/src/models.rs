//! Records returned by the repositories. Plain data: every mutation goes
//! through a `Database` method.

use chrono::{DateTime, Utc};

use crate::password;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string, never the plaintext.
    pub password: String,
}

impl User {
    pub fn check_password(&self, plaintext: &str) -> bool {
        password::verify_password(plaintext, &self.password)
    }
}

/// A named bucket posts can be tagged into. `user_id` is only a lookup key
/// for the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: i64,
    pub user_id: i64,
    pub slug: String,
    pub label: String,
}

impl Channel {
    /// Lowercase, spaces to underscores. Unique per owning user.
    pub fn slugify(label: &str) -> String {
        label.replace(' ', "_").to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    /// Opaque external token used for permalinks.
    pub uuid: String,
    pub user: User,
    pub body: String,
    /// Seconds since the Unix epoch.
    pub posted: i64,
}

impl Post {
    pub fn posted_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.posted, 0).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_replaces_spaces() {
        assert_eq!(Channel::slugify("Tech News"), "tech_news");
        assert_eq!(Channel::slugify("Diary"), "diary");
        assert_eq!(Channel::slugify("a  b"), "a__b");
        assert_eq!(Channel::slugify("already_slugged"), "already_slugged");
    }

    #[test]
    fn posted_at_converts_epoch_seconds() {
        let post = Post {
            id: 1,
            uuid: "u".into(),
            user: User {
                id: 1,
                username: "alice".into(),
                password: String::new(),
            },
            body: String::new(),
            posted: 1_700_000_000,
        };
        assert_eq!(post.posted_at().timestamp(), 1_700_000_000);
    }
}
