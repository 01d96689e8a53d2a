pub mod sql_types {
    #[derive(diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "project_status"))]
    pub struct ProjectStatus;

    #[derive(diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "task_status"))]
    pub struct TaskStatus;
}

diesel::table! {
    use diesel::sql_types::*;

    users (id) {
        id -> Uuid,
        email -> Text,
        name -> Text,
        is_admin -> Bool,
        api_key_hash -> Nullable<Bytea>,
        created -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;

    clients (id) {
        id -> Uuid,
        name -> Text,
        email -> Text,
        company -> Text,
        active -> Bool,
        created -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use super::sql_types::ProjectStatus;

    projects (id) {
        id -> Uuid,
        name -> Text,
        description -> Text,
        status -> ProjectStatus,
        progress -> Int4,
        client_id -> Uuid,
        start_date -> Date,
        due_date -> Date,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use super::sql_types::TaskStatus;

    tasks (id) {
        id -> Uuid,
        title -> Text,
        description -> Text,
        status -> TaskStatus,
        progress -> Int4,
        project_id -> Uuid,
        created -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;

    subtasks (id) {
        id -> Uuid,
        title -> Text,
        completed -> Bool,
        task_id -> Uuid,
        created -> Timestamptz,
    }
}

diesel::joinable!(projects -> clients (client_id));
diesel::joinable!(tasks -> projects (project_id));
diesel::joinable!(subtasks -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(users, clients, projects, tasks, subtasks,);
