use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

/// Lifecycle of a commissioned project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum)]
#[ExistingTypePath = "crate::schema::sql_types::ProjectStatus"]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Pending,
    InDevelopment,
    InTesting,
    Finished,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum)]
#[ExistingTypePath = "crate::schema::sql_types::TaskStatus"]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Blocked,
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}
