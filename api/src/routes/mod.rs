use axum::Router;

use crate::shared_state::AppState;

mod client;
mod health;
mod project;
mod subtask;
mod task;

pub fn configure_routes() -> Router<AppState> {
    Router::new()
        .merge(health::configure())
        .nest("/clients", client::configure())
        .nest("/projects", project::configure())
        .nest("/tasks", task::configure())
        .nest("/subtasks", subtask::configure())
}
