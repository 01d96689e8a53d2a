//! The `progress` column is derived from the project's tasks by the rollup
//! and is never written directly by API callers, so it has no slot in the
//! insertable; new projects start at the column default of 0.

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{ClientId, ProjectId},
    schema::*,
    ProjectStatus,
};

pub use crate::schema::projects::*;

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProject {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub client_id: ClientId,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
}
