use project_tracker_api::{config::Config, run_server, tracing_config};

pub async fn run(config: Config) -> Result<(), anyhow::Error> {
    tracing_config::configure("project-tracker", std::io::stdout)?;

    let server = run_server(config).await?;
    server.server.await?;

    Ok(())
}
