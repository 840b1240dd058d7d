use std::path::Path;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::middleware::{optional_auth, require_auth};
use crate::{channels, posts, users};

/// Assemble every route. Static files are served from `media_dir`.
pub fn router(state: AppState, media_dir: &Path) -> Router {
    let browse_routes = Router::new()
        .route("/", get(posts::index))
        .route("/post/{uuid}", get(posts::permalink))
        .route("/search/", get(posts::search))
        .route("/u/{username}/", get(users::user_page))
        .route("/u/{username}/c/{slug}/", get(channels::channel_page))
        .layer(middleware::from_fn_with_state(state.clone(), optional_auth))
        .with_state(state.clone());

    let auth_routes = Router::new()
        .route("/register/", post(auth::register))
        .route("/login/", post(auth::login))
        .route("/logout/", post(auth::logout))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/u/{username}/c/", post(channels::create_channels))
        .route("/u/{username}/post/", post(posts::create_post))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let static_routes = Router::new()
        .route_service("/favicon.ico", ServeFile::new(media_dir.join("favicon.ico")))
        .nest_service("/media", ServeDir::new(media_dir));

    Router::new()
        .merge(browse_routes)
        .merge(auth_routes)
        .merge(protected_routes)
        .merge(static_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
