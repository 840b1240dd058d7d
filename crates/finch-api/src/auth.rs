use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use finch_db::password::verify_against_dummy;
use finch_db::{Database, OptionalExt};
use finch_types::api::{AuthResponse, LoginRequest, RegisterRequest};

use crate::blocking::run_db;
use crate::middleware::{create_token, session_cookie, session_removal};
use crate::views;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session_secret: String,
    /// Absolute prefix for permalinks, without a trailing slash.
    pub base_url: String,
    pub items_per_page: u32,
}

const MIN_PASSWORD_LEN: usize = 8;

fn valid_username(username: &str) -> bool {
    (3..=32).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if !valid_username(&req.username) || req.password.len() < MIN_PASSWORD_LEN {
        return Err(StatusCode::BAD_REQUEST);
    }

    // Hashing and the insert both run on the blocking pool
    let RegisterRequest { username, password } = req;
    let user = run_db(&state, move |db| {
        if db.get_user_by_name(&username).optional()?.is_some() {
            return Ok(None);
        }
        // A concurrent registration can still win between the check and the insert
        match db.create_user(&username, &password) {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await?
    .ok_or(StatusCode::CONFLICT)?;

    let token = create_token(&state.session_secret, user.id, &user.username).map_err(|e| {
        warn!("Failed to sign session token: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    info!(user_id = user.id, "Registered {}", user.username);

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(token.clone())),
        Json(AuthResponse {
            user: views::user(&user),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let LoginRequest { username, password } = req;
    let user = run_db(&state, move |db| {
        match db.get_user_by_name(&username).optional()? {
            Some(user) => Ok(user.check_password(&password).then_some(user)),
            None => {
                verify_against_dummy(&password);
                Ok(None)
            }
        }
    })
    .await?
    .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = create_token(&state.session_secret, user.id, &user.username).map_err(|e| {
        warn!("Failed to sign session token: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((
        jar.add(session_cookie(token.clone())),
        Json(AuthResponse {
            user: views::user(&user),
            token,
        }),
    ))
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (StatusCode::NO_CONTENT, jar.remove(session_removal()))
}
