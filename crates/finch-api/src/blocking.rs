use axum::http::StatusCode;
use finch_db::{Database, DbError};
use tracing::{debug, error};

use crate::auth::AppState;

/// Run a repository call off the async runtime and map its error to a
/// status code: `NotFound` becomes 404, anything else is logged as a 500.
pub async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, StatusCode>
where
    F: FnOnce(&Database) -> finch_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(db_status)
}

pub fn db_status(e: DbError) -> StatusCode {
    match e {
        DbError::NotFound(what) => {
            debug!("Not found: {}", what);
            StatusCode::NOT_FOUND
        }
        other => {
            error!("Database error: {}", other);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
