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
    object_id::{ProjectId, TaskId},
    projects, rollup, tasks, PoolExt, TaskStatus,
};
use project_tracker_db as db;

use crate::{
    auth::Authenticated,
    ordering,
    policy::Action,
    shared_state::AppState,
    validation::validate_progress,
    Error,
};

#[derive(Debug, Deserialize)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: i32,
    pub project_id: ProjectId,
}

#[derive(Debug, Serialize, Queryable, Selectable)]
#[diesel(table_name = db::tasks)]
pub struct TaskOutput {
    id: TaskId,
    title: String,
    description: String,
    status: TaskStatus,
    progress: i32,
    project_id: ProjectId,
    created: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub project: Option<ProjectId>,
    pub status: Option<TaskStatus>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

async fn list_tasks(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Query(params): Query<ListTasksQuery>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::List)?;

    let objects = state
        .db
        .interact(move |conn| {
            use tasks::dsl;

            let mut q = tasks::table
                .inner_join(projects::table.inner_join(clients::table))
                .select(TaskOutput::as_select())
                .into_boxed();

            if !user.is_admin {
                q = q.filter(clients::email.eq(user.email.clone()));
            }

            if let Some(project) = params.project {
                q = q.filter(dsl::project_id.eq(project));
            }

            if let Some(status) = params.status {
                q = q.filter(dsl::status.eq(status));
            }

            if let Some(search) = params.search.as_deref() {
                let pattern = format!("%{search}%");
                q = q.filter(
                    dsl::title
                        .ilike(pattern.clone())
                        .or(dsl::description.ilike(pattern)),
                );
            }

            let ord = ordering::parse(params.ordering.as_deref(), "-created");
            q = match (ord.field, ord.descending) {
                ("title", false) => q.order(dsl::title.asc()),
                ("title", true) => q.order(dsl::title.desc()),
                ("status", false) => q.order(dsl::status.asc()),
                ("status", true) => q.order(dsl::status.desc()),
                ("created", false) => q.order(dsl::created.asc()),
                ("created", true) => q.order(dsl::created.desc()),
                _ => {
                    return Err(Error::Validation {
                        field: "ordering",
                        message: format!("cannot order tasks by {}", ord.field),
                    })
                }
            };

            q.load::<TaskOutput>(conn).map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::OK, Json(objects)))
}

async fn get_task(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(task_id): Path<TaskId>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Get)?;

    let object = state
        .db
        .interact(move |conn| {
            use tasks::dsl;

            let mut q = tasks::table
                .inner_join(projects::table.inner_join(clients::table))
                .select(TaskOutput::as_select())
                .filter(dsl::id.eq(task_id))
                .into_boxed();

            if !user.is_admin {
                q = q.filter(clients::email.eq(user.email.clone()));
            }

            q.first::<TaskOutput>(conn).map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::OK, Json(object)))
}

fn project_must_exist(conn: &mut PgConnection, project_id: ProjectId) -> Result<(), Error> {
    let exists: bool = diesel::select(diesel::dsl::exists(
        projects::table.filter(projects::id.eq(project_id)),
    ))
    .get_result(conn)?;

    if exists {
        Ok(())
    } else {
        Err(Error::Validation {
            field: "project_id",
            message: format!("project {project_id} does not exist"),
        })
    }
}

async fn new_task(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(body): Json<TaskInput>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Create)?;
    validate_progress(body.progress)?;

    let value = db::tasks::NewTask {
        id: TaskId::new(),
        title: body.title,
        description: body.description,
        status: body.status,
        progress: body.progress,
        project_id: body.project_id,
    };

    let result = state
        .db
        .transaction(move |conn| {
            // Record-level check; the field-level one already ran.
            validate_progress(value.progress)?;
            project_must_exist(conn, value.project_id)?;

            let task = diesel::insert_into(tasks::table)
                .values(&value)
                .returning(TaskOutput::as_select())
                .get_result::<TaskOutput>(conn)?;

            rollup::recompute_project_progress(conn, value.project_id)?;

            Ok::<_, Error>(task)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

async fn write_task(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(task_id): Path<TaskId>,
    Json(body): Json<TaskInput>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Update)?;
    validate_progress(body.progress)?;

    let result = state
        .db
        .transaction(move |conn| {
            use tasks::dsl;

            validate_progress(body.progress)?;
            project_must_exist(conn, body.project_id)?;

            let old_project_id = tasks::table
                .filter(dsl::id.eq(task_id))
                .select(dsl::project_id)
                .first::<ProjectId>(conn)?;

            let task = diesel::update(tasks::table)
                .filter(dsl::id.eq(task_id))
                .set((
                    dsl::title.eq(body.title),
                    dsl::description.eq(body.description),
                    dsl::status.eq(body.status),
                    dsl::progress.eq(body.progress),
                    dsl::project_id.eq(body.project_id),
                ))
                .returning(TaskOutput::as_select())
                .get_result::<TaskOutput>(conn)?;

            rollup::recompute_project_progress(conn, body.project_id)?;
            if old_project_id != body.project_id {
                // The task moved; the project it left needs a recompute too.
                rollup::recompute_project_progress(conn, old_project_id)?;
            }

            Ok::<_, Error>(task)
        })
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

async fn delete_task(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(task_id): Path<TaskId>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Delete)?;

    state
        .db
        .transaction(move |conn| {
            use tasks::dsl;

            let project_id = tasks::table
                .filter(dsl::id.eq(task_id))
                .select(dsl::project_id)
                .first::<ProjectId>(conn)
                .optional()?
                .ok_or(Error::NotFound)?;

            diesel::delete(tasks::table.filter(dsl::id.eq(task_id))).execute(conn)?;

            // Evaluated after removal, per the rollup contract.
            rollup::recompute_project_progress(conn, project_id)?;

            Ok::<_, Error>(())
        })
        .await?;

    Ok((StatusCode::OK, Json(json!({}))))
}

pub fn configure() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks))
        .route("/", post(new_task))
        .route("/:task_id", get(get_task))
        .route("/:task_id", put(write_task))
        .route("/:task_id", patch(write_task))
        .route("/:task_id", delete(delete_task))
}
