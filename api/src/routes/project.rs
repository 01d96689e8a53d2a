use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use diesel::{prelude::*, PgConnection};
use serde::{Deserialize, Serialize};
use serde_json::json;

use db::{
    clients,
    object_id::{ClientId, ProjectId},
    projects, rollup, PoolExt, ProjectStatus,
};
use project_tracker_db as db;

use crate::{
    auth::Authenticated,
    ordering,
    policy::Action,
    shared_state::AppState,
    validation::validate_project_dates,
    Error,
};

#[derive(Debug, Deserialize)]
pub struct ProjectInput {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    pub client_id: ClientId,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// `progress` is the server-computed rollup; there is no corresponding input
/// field, so callers cannot write it.
#[derive(Debug, Serialize, Queryable, Selectable)]
#[diesel(table_name = db::projects)]
pub struct ProjectOutput {
    id: ProjectId,
    name: String,
    description: String,
    status: ProjectStatus,
    progress: i32,
    client_id: ClientId,
    start_date: NaiveDate,
    due_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsQuery {
    pub client: Option<ClientId>,
    pub status: Option<ProjectStatus>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

async fn list_projects(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Query(params): Query<ListProjectsQuery>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::List)?;

    let objects = state
        .db
        .interact(move |conn| {
            use projects::dsl;

            let mut q = projects::table
                .inner_join(clients::table)
                .select(ProjectOutput::as_select())
                .into_boxed();

            if !user.is_admin {
                q = q.filter(clients::email.eq(user.email.clone()));
            }

            if let Some(client) = params.client {
                q = q.filter(dsl::client_id.eq(client));
            }

            if let Some(status) = params.status {
                q = q.filter(dsl::status.eq(status));
            }

            if let Some(search) = params.search.as_deref() {
                let pattern = format!("%{search}%");
                q = q.filter(
                    dsl::name
                        .ilike(pattern.clone())
                        .or(dsl::description.ilike(pattern)),
                );
            }

            let ord = ordering::parse(params.ordering.as_deref(), "-start_date");
            q = match (ord.field, ord.descending) {
                ("name", false) => q.order(dsl::name.asc()),
                ("name", true) => q.order(dsl::name.desc()),
                ("start_date", false) => q.order(dsl::start_date.asc()),
                ("start_date", true) => q.order(dsl::start_date.desc()),
                ("status", false) => q.order(dsl::status.asc()),
                ("status", true) => q.order(dsl::status.desc()),
                _ => {
                    return Err(Error::Validation {
                        field: "ordering",
                        message: format!("cannot order projects by {}", ord.field),
                    })
                }
            };

            q.load::<ProjectOutput>(conn).map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::OK, Json(objects)))
}

async fn get_project(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(project_id): Path<ProjectId>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Get)?;

    let object = state
        .db
        .interact(move |conn| {
            use projects::dsl;

            let mut q = projects::table
                .inner_join(clients::table)
                .select(ProjectOutput::as_select())
                .filter(dsl::id.eq(project_id))
                .into_boxed();

            if !user.is_admin {
                q = q.filter(clients::email.eq(user.email.clone()));
            }

            q.first::<ProjectOutput>(conn).map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::OK, Json(object)))
}

fn client_must_exist(conn: &mut PgConnection, client_id: ClientId) -> Result<(), Error> {
    let exists: bool = diesel::select(diesel::dsl::exists(
        clients::table.filter(clients::id.eq(client_id)),
    ))
    .get_result(conn)?;

    if exists {
        Ok(())
    } else {
        Err(Error::Validation {
            field: "client_id",
            message: format!("client {client_id} does not exist"),
        })
    }
}

async fn new_project(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(body): Json<ProjectInput>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Create)?;
    validate_project_dates(body.start_date, body.due_date)?;

    let value = db::projects::NewProject {
        id: ProjectId::new(),
        name: body.name,
        description: body.description,
        status: body.status,
        client_id: body.client_id,
        start_date: body.start_date,
        due_date: body.due_date,
    };

    let result = state
        .db
        .transaction(move |conn| {
            validate_project_dates(value.start_date, value.due_date)?;
            client_must_exist(conn, value.client_id)?;

            diesel::insert_into(projects::table)
                .values(&value)
                .returning(ProjectOutput::as_select())
                .get_result::<ProjectOutput>(conn)
                .map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

async fn write_project(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(project_id): Path<ProjectId>,
    Json(body): Json<ProjectInput>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Update)?;
    validate_project_dates(body.start_date, body.due_date)?;

    let result = state
        .db
        .transaction(move |conn| {
            use projects::dsl;

            validate_project_dates(body.start_date, body.due_date)?;
            client_must_exist(conn, body.client_id)?;

            let mut result = diesel::update(projects::table)
                .filter(dsl::id.eq(project_id))
                .set((
                    dsl::name.eq(body.name),
                    dsl::description.eq(body.description),
                    dsl::status.eq(body.status),
                    dsl::client_id.eq(body.client_id),
                    dsl::start_date.eq(body.start_date),
                    dsl::due_date.eq(body.due_date),
                ))
                .returning(ProjectOutput::as_select())
                .get_result::<ProjectOutput>(conn)?;

            result.progress = rollup::recompute_project_progress(conn, project_id)?;

            Ok::<_, Error>(result)
        })
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

/// Physical deletion; tasks and subtasks go with it via the FK cascades.
async fn delete_project(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(project_id): Path<ProjectId>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Delete)?;

    state
        .db
        .interact(move |conn| {
            use projects::dsl;

            let deleted = diesel::delete(projects::table.filter(dsl::id.eq(project_id)))
                .execute(conn)?;

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
        .route("/", get(list_projects))
        .route("/", post(new_project))
        .route("/:project_id", get(get_project))
        .route("/:project_id", put(write_project))
        .route("/:project_id", patch(write_project))
        .route("/:project_id", delete(delete_project))
}
