use serde::Deserialize;

use finch_types::api::Feed;
use finch_types::models::{Post, User};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

/// A 1-based page number resolved into LIMIT/OFFSET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    /// Page numbers below 1 are clamped to 1, and numbers whose offset would
    /// not fit in a `u32` are clamped to the last representable page.
    pub fn new(number: u32, per_page: u32) -> Self {
        let last = (u32::MAX / per_page.max(1)).saturating_add(1);
        let number = number.clamp(1, last);
        Self {
            number,
            limit: per_page,
            offset: (number - 1) * per_page,
        }
    }

    pub fn feed(&self, posts: Vec<Post>, viewer: Option<User>) -> Feed {
        let full = posts.len() as u32 >= self.limit;
        Feed {
            posts,
            page: self.number,
            prev_page: (self.number > 1).then(|| self.number - 1),
            next_page: full.then(|| self.number + 1),
            viewer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_limit_and_offset() {
        assert_eq!(Page::new(1, 20), Page { number: 1, limit: 20, offset: 0 });
        assert_eq!(Page::new(3, 20), Page { number: 3, limit: 20, offset: 40 });
    }

    #[test]
    fn page_zero_is_first_page() {
        assert_eq!(Page::new(0, 10).offset, 0);
        assert_eq!(Page::new(0, 10).number, 1);
    }

    #[test]
    fn huge_page_is_capped_not_saturated() {
        let last = u32::MAX / 20 + 1;
        let page = Page::new(u32::MAX, 20);
        assert_eq!(page.number, last);
        assert_eq!(page.offset, (last - 1) * 20);

        // Distinct in-range pages keep distinct offsets
        assert_ne!(Page::new(last - 1, 20).offset, Page::new(last, 20).offset);
        assert_eq!(Page::new(u32::MAX, 1).offset, u32::MAX - 1);
    }

    fn dummy_post(id: i64) -> Post {
        Post {
            id,
            uuid: format!("uuid-{}", id),
            author: User {
                id: 1,
                username: "alice".into(),
            },
            body: String::new(),
            body_html: String::new(),
            posted: chrono::DateTime::default(),
            permalink: String::new(),
            channels: vec![],
        }
    }

    #[test]
    fn links_depend_on_position_and_fullness() {
        let feed = Page::new(1, 2).feed(vec![dummy_post(1)], None);
        assert_eq!(feed.prev_page, None);
        assert_eq!(feed.next_page, None);

        let feed = Page::new(2, 2).feed(vec![dummy_post(1), dummy_post(2)], None);
        assert_eq!(feed.page, 2);
        assert_eq!(feed.prev_page, Some(1));
        assert_eq!(feed.next_page, Some(3));
    }
}
