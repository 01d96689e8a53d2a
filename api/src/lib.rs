pub mod api_key;
pub mod auth;
pub mod config;
pub mod error;
pub mod obfuscate_errors;
pub mod ordering;
pub mod panic_handler;
pub mod policy;
pub mod routes;
pub mod shared_state;
pub mod tracing_config;
pub mod validation;

pub use error::Error;

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{routing::IntoMakeService, Router};
use hyper::server::conn::AddrIncoming;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::{event, Level};

use crate::{obfuscate_errors::ObfuscateErrorLayer, shared_state::InnerState};

pub struct Server {
    pub host: String,
    pub port: u16,
    pub server: axum::Server<AddrIncoming, IntoMakeService<Router>>,
}

pub async fn run_server(config: config::Config) -> Result<Server, anyhow::Error> {
    let db = project_tracker_db::connect(config.database_url.as_str(), 32)?;

    let production = config.env != "development" && !cfg!(debug_assertions);

    let state = Arc::new(InnerState { production, db });

    let app = Router::new()
        .nest("/api", routes::configure_routes())
        .with_state(state)
        .layer(
            // Global middlewares
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(move |err| {
                    panic_handler::handle_panic(production, err)
                }))
                .layer(ObfuscateErrorLayer::new(production))
                .compression()
                .decompression()
                .set_x_request_id(MakeRequestUuid)
                .propagate_x_request_id()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::INFO)),
                )
                .into_inner(),
        );

    let bind_ip: IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((bind_ip, config.port));
    let builder = axum::Server::bind(&addr);

    let server = builder.serve(app.into_make_service());
    let port = server.local_addr().port();
    event!(Level::INFO, "Listening on {}:{}", config.host, port);

    Ok(Server {
        host: config.host,
        port,
        server,
    })
}
