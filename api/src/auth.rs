use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use diesel::prelude::*;
use http::header;

use db::object_id::UserId;
use project_tracker_db as db;
use project_tracker_db::PoolExt;

use crate::{shared_state::AppState, Error};

/// The identity attributes consumed by the access policy. How the caller
/// proved this identity is not the policy's concern.
#[derive(Clone, Debug, Queryable)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub is_admin: bool,
}

/// Extractor that resolves the bearer API key to a [Principal].
pub struct Authenticated(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(Error::Unauthenticated)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(Error::Unauthenticated)?;
        let hash = blake3::hash(token.as_bytes()).as_bytes().to_vec();

        let principal = state
            .db
            .interact(move |conn| {
                db::users::table
                    .filter(db::users::api_key_hash.eq(hash))
                    .select((db::users::id, db::users::email, db::users::is_admin))
                    .first::<Principal>(conn)
                    .optional()
                    .map_err(Error::from)
            })
            .await?
            .ok_or(Error::ApiKeyNotFound)?;

        Ok(Authenticated(principal))
    }
}
