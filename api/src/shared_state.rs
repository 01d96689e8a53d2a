use std::sync::Arc;

use project_tracker_db as db;

pub struct InnerState {
    pub production: bool,
    pub db: db::Pool,
}

pub type AppState = Arc<InnerState>;
