//! Conversions from repository records to the public JSON shapes.

use finch_types::models;

use crate::markdown::render_markdown;

pub fn user(user: &finch_db::User) -> models::User {
    models::User {
        id: user.id,
        username: user.username.clone(),
    }
}

pub fn channel(channel: &finch_db::Channel, owner: &str, base_url: &str) -> models::Channel {
    models::Channel {
        id: channel.id,
        slug: channel.slug.clone(),
        label: channel.label.clone(),
        url: format!("{}/u/{}/c/{}/", base_url, owner, channel.slug),
    }
}

pub fn post(post: &finch_db::Post, base_url: &str) -> models::Post {
    models::Post {
        id: post.id,
        uuid: post.uuid.clone(),
        author: user(&post.user),
        body: post.body.clone(),
        body_html: render_markdown(&post.body),
        posted: post.posted_at(),
        permalink: format!("{}/post/{}", base_url, post.uuid),
        channels: Vec::new(),
    }
}

pub fn posts(posts: &[finch_db::Post], base_url: &str) -> Vec<models::Post> {
    posts.iter().map(|p| post(p, base_url)).collect()
}

/// The signed-in user as carried by the session, without a database trip.
pub fn viewer(claims: Option<finch_types::api::Claims>) -> Option<models::User> {
    claims.map(|c| models::User {
        id: c.sub,
        username: c.username,
    })
}
