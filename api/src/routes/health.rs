use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use diesel::prelude::*;
use serde::Serialize;

use project_tracker_db::PoolExt;

use crate::shared_state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    /// If the database connection is ok
    database: bool,
    /// If all the other fields indicate healthy status.
    healthy: bool,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db_result: Result<usize, crate::Error> = state
        .db
        .interact(|conn| {
            diesel::sql_query("SELECT 1")
                .execute(conn)
                .map_err(crate::Error::from)
        })
        .await;

    (
        StatusCode::OK,
        Json(HealthResponse {
            database: db_result.is_ok(),
            healthy: db_result.is_ok(),
        }),
    )
}

pub fn configure() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
