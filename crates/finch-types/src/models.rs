use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public view of a user. The credential never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub slug: String,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub uuid: String,
    pub author: User,
    /// Raw Markdown as written.
    pub body: String,
    /// `body` rendered to an HTML fragment.
    pub body_html: String,
    pub posted: DateTime<Utc>,
    pub permalink: String,
    /// Only filled in on the permalink page.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<Channel>,
}
