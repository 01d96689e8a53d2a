//! Authenticated principals. Authentication itself is the api crate's API key
//! lookup; these rows just carry the identity attributes the access policy
//! consumes. The key hash is written separately after key generation.

use diesel::prelude::*;
use serde::Deserialize;

use crate::{object_id::UserId, schema::*};

pub use crate::schema::users::*;

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
}
