use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{SubtaskId, TaskId},
    schema::*,
};

pub use crate::schema::subtasks::*;

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = subtasks)]
pub struct NewSubtask {
    pub id: SubtaskId,
    pub title: String,
    pub completed: bool,
    pub task_id: TaskId,
}
