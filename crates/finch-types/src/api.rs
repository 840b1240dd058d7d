use serde::{Deserialize, Serialize};

use crate::models::{Channel, Post, User};

// -- Session --

/// Claims carried by the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

// -- Channels --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateChannelsRequest {
    pub labels: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateChannelsResponse {
    pub created: Vec<Channel>,
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub body: String,
    /// Slugs of existing channels owned by the author.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Labels of channels to create and tag in one go.
    #[serde(default)]
    pub new_channels: Vec<String>,
}

// -- Feeds --

/// One page of posts. `next_page` is only set when this page came back full.
#[derive(Debug, Serialize, Deserialize)]
pub struct Feed {
    pub posts: Vec<Post>,
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u32>,
    /// The signed-in user, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<User>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserPage {
    pub user: User,
    pub channels: Vec<Channel>,
    #[serde(flatten)]
    pub feed: Feed,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelPage {
    pub owner: User,
    pub channel: Channel,
    #[serde(flatten)]
    pub feed: Feed,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchPage {
    pub query: String,
    #[serde(flatten)]
    pub feed: Feed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_post_defaults_channel_lists() {
        let req: CreatePostRequest = serde_json::from_str(r#"{"body":"hi"}"#).unwrap();
        assert_eq!(req.body, "hi");
        assert!(req.channels.is_empty());
        assert!(req.new_channels.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res = serde_json::from_str::<RegisterRequest>(
            r#"{"username":"a","password":"b","admin":true}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn feed_flattens_into_page_and_omits_empty_links() {
        let page = SearchPage {
            query: "rust".into(),
            feed: Feed {
                posts: vec![],
                page: 1,
                prev_page: None,
                next_page: None,
                viewer: None,
            },
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["query"], "rust");
        assert_eq!(json["page"], 1);
        assert!(json.get("next_page").is_none());
        assert!(json.get("prev_page").is_none());
        assert!(json.get("viewer").is_none());
    }
}
