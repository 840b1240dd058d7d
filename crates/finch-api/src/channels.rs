use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use finch_types::api::{ChannelPage, Claims, CreateChannelsRequest, CreateChannelsResponse};

use crate::auth::AppState;
use crate::blocking::run_db;
use crate::pagination::{Page, PageQuery};
use crate::views;

/// Most labels accepted in one request.
const MAX_LABELS: usize = 32;

/// GET /u/{username}/c/{slug}/ — posts tagged into one of a user's channels.
pub async fn channel_page(
    State(state): State<AppState>,
    Path((username, slug)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
    Extension(viewer): Extension<Option<Claims>>,
) -> Result<impl IntoResponse, StatusCode> {
    let page = Page::new(query.page, state.items_per_page);

    let (owner, channel, posts) = run_db(&state, move |db| {
        let owner = db.get_user_by_name(&username)?;
        let channel = db.get_channel_by_user_and_slug(&owner, &slug)?;
        let posts = db.get_channel_posts(&channel, page.limit, page.offset)?;
        Ok((owner, channel, posts))
    })
    .await?;

    Ok(Json(ChannelPage {
        owner: views::user(&owner),
        channel: views::channel(&channel, &owner.username, &state.base_url),
        feed: page.feed(views::posts(&posts, &state.base_url), views::viewer(viewer)),
    }))
}

/// POST /u/{username}/c/ — create channels for the signed-in owner.
///
/// Blank labels and labels whose slug already exists are skipped; the
/// response lists only the channels actually created.
pub async fn create_channels(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateChannelsRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if claims.username != username {
        return Err(StatusCode::FORBIDDEN);
    }
    if req.labels.len() > MAX_LABELS {
        return Err(StatusCode::BAD_REQUEST);
    }

    let (user, created) = run_db(&state, move |db| {
        let user = db.get_user_by_id(claims.sub)?;
        let created = db.create_channels(&user, &req.labels)?;
        Ok((user, created))
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateChannelsResponse {
            created: created
                .iter()
                .map(|c| views::channel(c, &user.username, &state.base_url))
                .collect(),
        }),
    ))
}
