//! Helpers for spinning up a throwaway Postgres database per test.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use deadpool_diesel::Manager;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};
use futures::Future;
use lazy_static::lazy_static;

use crate::object_id::UserId;
use crate::users::NewUser;
use crate::{Pool, PoolExt};

#[derive(Clone)]
pub struct TestDatabase {
    pub name: String,
    pub pool: Pool,
    pub url: String,
    global_connect_str: String,
}

impl TestDatabase {
    pub fn drop_db(&self) -> Result<()> {
        let mut conn = PgConnection::establish(self.global_connect_str.as_str())?;
        diesel::sql_query(&format!(r##"DROP DATABASE "{}" (FORCE)"##, self.name))
            .execute(&mut conn)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseUser {
    pub user_id: UserId,
    pub email: String,
}

pub async fn run_database_test<F, R>(f: F)
where
    F: FnOnce(TestDatabase) -> R,
    R: Future<Output = Result<(), anyhow::Error>>,
{
    let (database, _) = create_database().await.expect("Creating database");
    f(database.clone()).await.unwrap();
    database.drop_db().expect("Cleaning up");
}

const MIGRATIONS: EmbeddedMigrations = diesel_migrations::embed_migrations!();

pub struct DatabaseInfo {
    pub admin_user: DatabaseUser,
}

pub async fn create_database() -> Result<(TestDatabase, DatabaseInfo)> {
    dotenv::dotenv().ok();
    let host = std::env::var("TEST_DATABASE_HOST")
        .or_else(|_| std::env::var("DATABASE_HOST"))
        .unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("TEST_DATABASE_PORT")
        .or_else(|_| std::env::var("DATABASE_PORT"))
        .map_err(anyhow::Error::new)
        .and_then(|val| val.parse::<u16>().map_err(|e| anyhow!(e)))
        .unwrap_or(5432);
    let user = std::env::var("TEST_DATABASE_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = std::env::var("TEST_DATABASE_PASSWORD").unwrap_or_else(|_| "".to_string());
    let global_test_db =
        std::env::var("TEST_DATABASE_GLOBAL_DB").unwrap_or_else(|_| "postgres".to_string());

    let base_connect = format!("postgresql://{user}:{password}@{host}:{port}");
    let global_connect = format!("{base_connect}/{global_test_db}");
    let database = format!("project_tracker_test_{}", crate::new_uuid().simple());
    println!("Database name: {}", database);

    let mut global_conn = PgConnection::establish(global_connect.as_str())?;
    diesel::sql_query(&format!(r##"CREATE DATABASE "{}""##, database)).execute(&mut global_conn)?;
    drop(global_conn);

    let db_conn_str = format!("{base_connect}/{database}");
    let manager = Manager::new(db_conn_str.clone(), deadpool_diesel::Runtime::Tokio1);
    let pool = Pool::builder(manager).max_size(4).build()?;

    let db_info = pool
        .interact(|conn| {
            conn.run_pending_migrations(MIGRATIONS)
                .map_err(|e| anyhow!(e))?;
            let admin_user = populate_database(conn)?;
            Ok::<_, anyhow::Error>(admin_user)
        })
        .await?;

    Ok((
        TestDatabase {
            pool,
            url: db_conn_str,
            name: database,
            global_connect_str: global_connect,
        },
        db_info,
    ))
}

lazy_static! {
    static ref ADMIN_USER_ID: UserId = std::env::var("ADMIN_USER_ID")
        .map(|u| UserId::from_str(u.as_str()).unwrap())
        .unwrap_or_else(|_| UserId::new());
}

fn populate_database(conn: &mut PgConnection) -> Result<DatabaseInfo, anyhow::Error> {
    let user_id = *ADMIN_USER_ID;
    let email = format!("admin_{user_id}@example.com");

    diesel::insert_into(crate::users::table)
        .values(NewUser {
            id: user_id,
            email: email.clone(),
            name: "Test Admin User".to_string(),
            is_admin: true,
        })
        .execute(conn)?;

    Ok(DatabaseInfo {
        admin_user: DatabaseUser { user_id, email },
    })
}
