use clap::{Args, Subcommand};
use diesel::prelude::*;

use db::object_id::UserId;
use db::users::NewUser;
use db::PoolExt;
use project_tracker_api::api_key;
use project_tracker_db as db;

#[derive(Debug, Args)]
pub struct AdminArgs {
    #[clap(long = "db", env = "DATABASE_URL")]
    pub database_url: String,

    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Create a user (if needed) and print a fresh API key for it
    MakeApiKey {
        #[clap(long)]
        email: String,
        #[clap(long, default_value = "")]
        name: String,
        /// Grant the administrator role
        #[clap(long)]
        admin: bool,
    },
}

pub async fn run(args: AdminArgs) -> Result<(), anyhow::Error> {
    let pool = db::connect(args.database_url.as_str(), 2)?;

    match args.command {
        AdminCommand::MakeApiKey { email, name, admin } => {
            let key = pool
                .interact(move |conn| {
                    let existing = db::users::table
                        .filter(db::users::email.eq(email.clone()))
                        .select(db::users::id)
                        .first::<UserId>(conn)
                        .optional()?;

                    let user_id = match existing {
                        Some(id) => id,
                        None => {
                            let id = UserId::new();
                            diesel::insert_into(db::users::table)
                                .values(NewUser {
                                    id,
                                    email,
                                    name,
                                    is_admin: admin,
                                })
                                .execute(conn)?;
                            id
                        }
                    };

                    api_key::make_key(conn, user_id)
                })
                .await?;

            println!("{}", key.key);
        }
    }

    Ok(())
}
