use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::warn;

use finch_db::Channel;
use finch_types::api::{Claims, CreatePostRequest, SearchPage};

use crate::auth::AppState;
use crate::blocking::run_db;
use crate::pagination::{Page, PageQuery, SearchQuery};
use crate::views;

/// Upper bound on a post body, in bytes.
const MAX_BODY_LEN: usize = 16 * 1024;

/// GET / — the global feed.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Extension(viewer): Extension<Option<Claims>>,
) -> Result<impl IntoResponse, StatusCode> {
    let page = Page::new(query.page, state.items_per_page);

    let posts = run_db(&state, move |db| db.get_all_posts(page.limit, page.offset)).await?;

    Ok(Json(page.feed(
        views::posts(&posts, &state.base_url),
        views::viewer(viewer),
    )))
}

/// GET /post/{uuid} — a single post with the channels it was tagged into.
pub async fn permalink(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let (post, channels) = run_db(&state, move |db| {
        let post = db.get_post_by_uuid(&uuid)?;
        let channels = db.get_post_channels(post.id)?;
        Ok((post, channels))
    })
    .await?;

    let mut view = views::post(&post, &state.base_url);
    view.channels = channels
        .iter()
        .map(|c| views::channel(c, &post.user.username, &state.base_url))
        .collect();

    Ok(Json(view))
}

/// GET /search/?q= — substring search over post bodies.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    Extension(viewer): Extension<Option<Claims>>,
) -> Result<impl IntoResponse, StatusCode> {
    let page = Page::new(query.page, state.items_per_page);
    let q = query.q.trim().to_string();

    let posts = if q.is_empty() {
        Vec::new()
    } else {
        let needle = q.clone();
        run_db(&state, move |db| db.search_posts(&needle, page.limit, page.offset)).await?
    };

    Ok(Json(SearchPage {
        query: q,
        feed: page.feed(views::posts(&posts, &state.base_url), views::viewer(viewer)),
    }))
}

/// POST /u/{username}/post/ — publish a post as the signed-in owner.
///
/// `new_channels` are created first; every slug in `channels` or derived from
/// `new_channels` is then tagged. Slugs the author doesn't own are skipped.
pub async fn create_post(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if claims.username != username {
        return Err(StatusCode::FORBIDDEN);
    }

    // Stored as submitted: leading indentation is meaningful Markdown
    let CreatePostRequest {
        body,
        channels: slugs,
        new_channels,
    } = req;
    if body.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if body.len() > MAX_BODY_LEN {
        return Err(StatusCode::PAYLOAD_TOO_LARGE);
    }

    let (post, channels) = run_db(&state, move |db| {
        let user = db.get_user_by_id(claims.sub)?;
        db.create_channels(&user, &new_channels)?;

        let wanted = slugs
            .iter()
            .map(|s| s.trim().to_string())
            .chain(new_channels.iter().map(|l| Channel::slugify(l.trim())));

        let mut channels: Vec<Channel> = Vec::new();
        for slug in wanted.filter(|s| !s.is_empty()) {
            if channels.iter().any(|c| c.slug == slug) {
                continue;
            }
            match db.get_channel_by_user_and_slug(&user, &slug) {
                Ok(channel) => channels.push(channel),
                Err(e) if e.is_not_found() => {
                    warn!(user_id = user.id, %slug, "Ignoring unknown channel on new post");
                }
                Err(e) => return Err(e),
            }
        }

        let post = db.create_post(&user, &body, &channels)?;
        Ok((post, channels))
    })
    .await?;

    let mut view = views::post(&post, &state.base_url);
    view.channels = channels
        .iter()
        .map(|c| views::channel(c, &post.user.username, &state.base_url))
        .collect();

    Ok((StatusCode::CREATED, Json(view)))
}
