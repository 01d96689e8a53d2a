mod cmd;

use clap::{Parser, Subcommand};

use project_tracker_api::config::Config;

#[derive(Debug, Parser)]
#[command(name = "project-tracker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the API server
    Server(Config),
    /// Administrative utilities
    Admin(cmd::admin::AdminArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Server(config) => cmd::server::run(config).await,
        Command::Admin(args) => cmd::admin::run(args).await,
    }
}
