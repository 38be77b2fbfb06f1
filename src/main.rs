#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    connection::pool_options,
    error::{BindListenerSnafu, SatchelResult, ServeSnafu},
    state::SatchelState,
};
use snafu::ResultExt;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod config;
mod connection;
mod data;
mod error;
mod extract;
mod routes;
mod state;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
}

async fn run(config: RuntimeConfiguration) -> SatchelResult<()> {
    let db_config = config.db_config();
    let state = SatchelState::new(pool_options(&db_config), config).await?;

    let app = routes::router(state.clone());

    let server_ip = state.config().server_config().server_ip.clone();
    let listener = TcpListener::bind(&server_ip)
        .await
        .context(BindListenerSnafu { addr: &server_ip })?;

    info!(?server_ip, "Listening");
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(ServeSnafu);

    //in-flight requests have finished by now, so nothing still wants a connection
    state.sensible_shutdown().await;
    served
}

#[tokio::main]
async fn main() {
    //a missing .env is fine, the variables may come from the real environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            panic!("unable to load env vars: {e}");
        }
    }

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");

    let config = RuntimeConfiguration::new().expect("unable to create config");

    if let Err(e) = run(config).await {
        error!(?e, "Fatal error");
        std::process::exit(1);
    }
}
