use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

use db::{clients, object_id::ClientId, PoolExt};
use project_tracker_db as db;

use crate::{
    auth::Authenticated,
    ordering,
    policy::Action,
    shared_state::AppState,
    Error,
};

#[derive(Debug, Deserialize)]
pub struct ClientInput {
    pub name: String,
    pub email: String,
    pub company: String,
}

#[derive(Debug, Serialize, Queryable, Selectable)]
#[diesel(table_name = db::clients)]
pub struct ClientOutput {
    id: ClientId,
    name: String,
    email: String,
    company: String,
    active: bool,
    created: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListClientsQuery {
    pub search: Option<String>,
    pub ordering: Option<String>,
}

async fn list_clients(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Query(params): Query<ListClientsQuery>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::List)?;

    let objects = state
        .db
        .interact(move |conn| {
            use clients::dsl;

            let mut q = clients::table
                .select(ClientOutput::as_select())
                .filter(dsl::active.eq(true))
                .into_boxed();

            if !user.is_admin {
                q = q.filter(dsl::email.eq(user.email.clone()));
            }

            if let Some(search) = params.search.as_deref() {
                let pattern = format!("%{search}%");
                q = q.filter(
                    dsl::name
                        .ilike(pattern.clone())
                        .or(dsl::email.ilike(pattern.clone()))
                        .or(dsl::company.ilike(pattern)),
                );
            }

            let ord = ordering::parse(params.ordering.as_deref(), "-created");
            q = match (ord.field, ord.descending) {
                ("name", false) => q.order(dsl::name.asc()),
                ("name", true) => q.order(dsl::name.desc()),
                ("email", false) => q.order(dsl::email.asc()),
                ("email", true) => q.order(dsl::email.desc()),
                ("created", false) => q.order(dsl::created.asc()),
                ("created", true) => q.order(dsl::created.desc()),
                _ => {
                    return Err(Error::Validation {
                        field: "ordering",
                        message: format!("cannot order clients by {}", ord.field),
                    })
                }
            };

            q.load::<ClientOutput>(conn).map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::OK, Json(objects)))
}

async fn get_client(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(client_id): Path<ClientId>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Get)?;

    // Not filtered on `active`: a deactivated client stays fetchable by ID,
    // it just drops out of the default listing.
    let object = state
        .db
        .interact(move |conn| {
            use clients::dsl;

            let mut q = clients::table
                .select(ClientOutput::as_select())
                .filter(dsl::id.eq(client_id))
                .into_boxed();

            if !user.is_admin {
                q = q.filter(dsl::email.eq(user.email.clone()));
            }

            q.first::<ClientOutput>(conn).map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::OK, Json(object)))
}

async fn new_client(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(body): Json<ClientInput>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Create)?;

    let value = db::clients::NewClient {
        id: ClientId::new(),
        name: body.name,
        email: body.email,
        company: body.company,
    };

    let result = state
        .db
        .interact(move |conn| {
            diesel::insert_into(clients::table)
                .values(&value)
                .returning(ClientOutput::as_select())
                .get_result::<ClientOutput>(conn)
                .map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

async fn write_client(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(client_id): Path<ClientId>,
    Json(body): Json<ClientInput>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Update)?;

    let result = state
        .db
        .interact(move |conn| {
            use clients::dsl;

            diesel::update(clients::table)
                .filter(dsl::id.eq(client_id))
                .set((
                    dsl::name.eq(body.name),
                    dsl::email.eq(body.email),
                    dsl::company.eq(body.company),
                ))
                .returning(ClientOutput::as_select())
                .get_result::<ClientOutput>(conn)
                .map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

/// Logical deletion: flip the active flag and keep the row. Projects under
/// the client are untouched.
async fn disable_client(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(client_id): Path<ClientId>,
) -> Result<impl IntoResponse, Error> {
    user.check(Action::Delete)?;

    state
        .db
        .interact(move |conn| {
            use clients::dsl;

            let updated = diesel::update(clients::table)
                .filter(dsl::id.eq(client_id))
                .set(dsl::active.eq(false))
                .execute(conn)?;

            if updated == 0 {
                return Err(Error::NotFound);
            }

            Ok(())
        })
        .await?;

    Ok((StatusCode::OK, Json(json!({}))))
}

pub fn configure() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients))
        .route("/", post(new_client))
        .route("/:client_id", get(get_client))
        .route("/:client_id", put(write_client))
        .route("/:client_id", patch(write_client))
        .route("/:client_id", delete(disable_client))
}
