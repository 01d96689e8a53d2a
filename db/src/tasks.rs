use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{ProjectId, TaskId},
    schema::*,
    TaskStatus,
};

pub use crate::schema::tasks::*;

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTask {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub progress: i32,
    pub project_id: ProjectId,
}
