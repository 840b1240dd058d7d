use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use finch_types::api::{Claims, UserPage};

use crate::auth::AppState;
use crate::blocking::run_db;
use crate::pagination::{Page, PageQuery};
use crate::views;

/// GET /u/{username}/ — a user's posts and channels.
pub async fn user_page(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
    Extension(viewer): Extension<Option<Claims>>,
) -> Result<impl IntoResponse, StatusCode> {
    let page = Page::new(query.page, state.items_per_page);

    let (user, channels, posts) = run_db(&state, move |db| {
        let user = db.get_user_by_name(&username)?;
        let channels = db.list_channels_for_user(&user)?;
        let posts = db.get_all_user_posts(&user, page.limit, page.offset)?;
        Ok((user, channels, posts))
    })
    .await?;

    Ok(Json(UserPage {
        user: views::user(&user),
        channels: channels
            .iter()
            .map(|c| views::channel(c, &user.username, &state.base_url))
            .collect(),
        feed: page.feed(views::posts(&posts, &state.base_url), views::viewer(viewer)),
    }))
}
