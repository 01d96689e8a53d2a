use anyhow::Result;
use diesel::prelude::*;
use futures::Future;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

pub use crate::client::*;

use project_tracker_api::Server;
use project_tracker_db::object_id::UserId;
use project_tracker_db::test::{create_database, DatabaseUser, TestDatabase};
use project_tracker_db::users::NewUser;

pub struct TestUser {
    pub user_id: UserId,
    pub email: String,
    pub api_key: String,
    pub client: TestClient,
}

impl std::fmt::Debug for TestUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestUser")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

pub struct TestApp {
    pub database: TestDatabase,
    pub admin_user: TestUser,
    /// A client with no API key, set to the base url of the server.
    pub client: TestClient,
    pub address: String,
    pub base_url: String,
}

async fn start_app(database: TestDatabase, admin_user: DatabaseUser) -> Result<TestApp> {
    let config = project_tracker_api::config::Config {
        database_url: database.url.clone(),
        port: 0, // Bind to random port
        host: "127.0.0.1".to_string(),
        env: "test".to_string(),
    };
    Lazy::force(&project_tracker_test::TRACING);
    let Server { server, host, port } = project_tracker_api::run_server(config).await?;

    tokio::task::spawn(async move { server.await });

    let base_url = format!("http://{}:{}/api", host, port);
    let client = TestClient {
        base: base_url.clone(),
        client: reqwest::ClientBuilder::new()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Building client"),
        api_key: None,
    };

    let conn = database
        .pool
        .get()
        .await
        .expect("Getting postgres connection");

    let admin_user_id = admin_user.user_id;
    let api_key = conn
        .interact(move |conn| project_tracker_api::api_key::make_key(conn, admin_user_id))
        .await
        .unwrap()?
        .key;

    Ok(TestApp {
        database,
        admin_user: TestUser {
            user_id: admin_user.user_id,
            email: admin_user.email,
            client: client.clone_with_api_key(api_key.clone()),
            api_key,
        },
        client,
        address: format!("{}:{}", host, port),
        base_url,
    })
}

pub async fn run_app_test<F, R>(f: F)
where
    F: FnOnce(TestApp) -> R,
    R: Future<Output = Result<(), anyhow::Error>>,
{
    let (database, info) = create_database().await.expect("Creating database");
    let app = start_app(database.clone(), info.admin_user)
        .await
        .expect("Starting app");
    f(app).await.unwrap();
    database.drop_db().expect("Cleaning up");
}

impl TestApp {
    /// Add a user directly to the database and hand back a client
    /// authenticated as them.
    pub async fn add_user(&self, email: &str, is_admin: bool) -> Result<TestUser> {
        let user_id = UserId::new();
        let user = NewUser {
            id: user_id,
            email: email.to_string(),
            name: format!("Test User {user_id}"),
            is_admin,
        };

        let conn = self.database.pool.get().await?;
        let key = conn
            .interact(move |conn| {
                diesel::insert_into(project_tracker_db::users::table)
                    .values(&user)
                    .execute(conn)?;

                project_tracker_api::api_key::make_key(conn, user_id)
            })
            .await
            .unwrap()?
            .key;

        Ok(TestUser {
            user_id,
            email: email.to_string(),
            client: self.client.clone_with_api_key(key.clone()),
            api_key: key,
        })
    }

    /// Create a client over the API as the admin and return its ID.
    pub async fn add_client(&self, name: &str, email: &str) -> Result<String> {
        let response = self
            .admin_user
            .client
            .post("clients")
            .json(&json!({
                "name": name,
                "email": email,
                "company": format!("{name} Inc"),
            }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 201, "creating client {name}");
        let body: Value = response.json().await?;
        Ok(body["id"].as_str().expect("client id").to_string())
    }

    /// Create a project over the API as the admin and return its ID.
    pub async fn add_project(&self, name: &str, client_id: &str) -> Result<String> {
        let response = self
            .admin_user
            .client
            .post("projects")
            .json(&json!({
                "name": name,
                "description": format!("{name} description"),
                "client_id": client_id,
                "start_date": "2024-01-01",
                "due_date": "2024-12-31",
            }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 201, "creating project {name}");
        let body: Value = response.json().await?;
        Ok(body["id"].as_str().expect("project id").to_string())
    }

    /// Create a task over the API as the admin and return its ID.
    pub async fn add_task(&self, title: &str, project_id: &str, progress: i32) -> Result<String> {
        let response = self
            .admin_user
            .client
            .post("tasks")
            .json(&json!({
                "title": title,
                "description": format!("{title} description"),
                "project_id": project_id,
                "progress": progress,
            }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 201, "creating task {title}");
        let body: Value = response.json().await?;
        Ok(body["id"].as_str().expect("task id").to_string())
    }

    /// Fetch a project as the admin and return its rolled-up progress.
    pub async fn project_progress(&self, project_id: &str) -> Result<i64> {
        let response = self
            .admin_user
            .client
            .get(&format!("projects/{project_id}"))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 200, "fetching project");
        let body: Value = response.json().await?;
        Ok(body["progress"].as_i64().expect("project progress"))
    }
}
