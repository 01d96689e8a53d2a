//! Clients commission projects. Deletion is logical via the `active` flag;
//! the row is never removed through the API.

use diesel::prelude::*;
use serde::Deserialize;

use crate::{object_id::ClientId, schema::*};

pub use crate::schema::clients::*;

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = clients)]
pub struct NewClient {
    pub id: ClientId,
    pub name: String,
    pub email: String,
    pub company: String,
}
