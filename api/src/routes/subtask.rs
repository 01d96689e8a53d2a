use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::{prelude::*, PgConnection};
use serde::{Deserialize, Serialize};
use serde_json::json;

use db::{
    clients,
    object_id::{SubtaskId, TaskId},
    projects, subtasks, tasks, PoolExt,
};
use project_tracker_db as db;

use crate::{
    auth::Authenticated,
    ordering,
    policy::Action,
    shared_state::AppState,
    Error,
};

#[derive(Debug, Deserialize)]
pub struct SubtaskInput {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub task_id: TaskId,
}

#[derive(Debug, Serialize, Queryable, Selectable)]
#[diesel(table_name = db::subtasks)]
pub struct SubtaskOutput {
    id: SubtaskId,
    title: String,
    completed: bool,
    task_id: TaskId,
    created: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListSubtasksQuery {
    pub task: Option<TaskId>,
    pub completed: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

async fn list_subtasks(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Query(params): Query<ListSubtasksQuery>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::List)?;

    let objects = state
        .db
        .interact(move |conn| {
            use subtasks::dsl;

            let mut q = subtasks::table
                .inner_join(tasks::table.inner_join(projects::table.inner_join(clients::table)))
                .select(SubtaskOutput::as_select())
                .into_boxed();

            if !user.is_admin {
                q = q.filter(clients::email.eq(user.email.clone()));
            }

            if let Some(task) = params.task {
                q = q.filter(dsl::task_id.eq(task));
            }

            if let Some(completed) = params.completed {
                q = q.filter(dsl::completed.eq(completed));
            }

            if let Some(search) = params.search.as_deref() {
                let pattern = format!("%{search}%");
                q = q.filter(dsl::title.ilike(pattern));
            }

            let ord = ordering::parse(params.ordering.as_deref(), "-created");
            q = match (ord.field, ord.descending) {
                ("title", false) => q.order(dsl::title.asc()),
                ("title", true) => q.order(dsl::title.desc()),
                ("completed", false) => q.order(dsl::completed.asc()),
                ("completed", true) => q.order(dsl::completed.desc()),
                ("created", false) => q.order(dsl::created.asc()),
                ("created", true) => q.order(dsl::created.desc()),
                _ => {
                    return Err(Error::Validation {
                        field: "ordering",
                        message: format!("cannot order subtasks by {}", ord.field),
                    })
                }
            };

            q.load::<SubtaskOutput>(conn).map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::OK, Json(objects)))
}

async fn get_subtask(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(subtask_id): Path<SubtaskId>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Get)?;

    let object = state
        .db
        .interact(move |conn| {
            use subtasks::dsl;

            let mut q = subtasks::table
                .inner_join(tasks::table.inner_join(projects::table.inner_join(clients::table)))
                .select(SubtaskOutput::as_select())
                .filter(dsl::id.eq(subtask_id))
                .into_boxed();

            if !user.is_admin {
                q = q.filter(clients::email.eq(user.email.clone()));
            }

            q.first::<SubtaskOutput>(conn).map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::OK, Json(object)))
}

/// Every subtask must hang off an existing task; a dangling reference is a
/// validation failure rather than a 404.
fn task_must_exist(conn: &mut PgConnection, task_id: TaskId) -> Result<(), Error> {
    let exists: bool = diesel::select(diesel::dsl::exists(
        tasks::table.filter(tasks::id.eq(task_id)),
    ))
    .get_result(conn)?;

    if exists {
        Ok(())
    } else {
        Err(Error::Validation {
            field: "task_id",
            message: format!("task {task_id} does not exist"),
        })
    }
}

async fn new_subtask(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(body): Json<SubtaskInput>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Create)?;

    let value = db::subtasks::NewSubtask {
        id: SubtaskId::new(),
        title: body.title,
        completed: body.completed,
        task_id: body.task_id,
    };

    let result = state
        .db
        .transaction(move |conn| {
            task_must_exist(conn, value.task_id)?;

            diesel::insert_into(subtasks::table)
                .values(&value)
                .returning(SubtaskOutput::as_select())
                .get_result::<SubtaskOutput>(conn)
                .map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

async fn write_subtask(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(subtask_id): Path<SubtaskId>,
    Json(body): Json<SubtaskInput>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Update)?;

    let result = state
        .db
        .transaction(move |conn| {
            use subtasks::dsl;

            task_must_exist(conn, body.task_id)?;

            diesel::update(subtasks::table)
                .filter(dsl::id.eq(subtask_id))
                .set((
                    dsl::title.eq(body.title),
                    dsl::completed.eq(body.completed),
                    dsl::task_id.eq(body.task_id),
                ))
                .returning(SubtaskOutput::as_select())
                .get_result::<SubtaskOutput>(conn)
                .map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

async fn delete_subtask(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(subtask_id): Path<SubtaskId>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Delete)?;

    state
        .db
        .interact(move |conn| {
            use subtasks::dsl;

            let deleted =
                diesel::delete(subtasks::table.filter(dsl::id.eq(subtask_id))).execute(conn)?;

            if deleted == 0 {
                return Err(Error::NotFound);
            }

            Ok(())
        })
        .await?;

    Ok((StatusCode::OK, Json(json!({}))))
}

pub fn configure() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subtasks))
        .route("/", post(new_subtask))
        .route("/:subtask_id", get(get_subtask))
        .route("/:subtask_id", put(write_subtask))
        .route("/:subtask_id", patch(write_subtask))
        .route("/:subtask_id", delete(delete_subtask))
}
