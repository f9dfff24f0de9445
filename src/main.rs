use anyhow::Context;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use todo_rest::{SharedData, app_env, build_router, db, logging, persistence};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_result = dotenv();

    let otel_exporters = match (
        env::var(app_env::OTEL_SPAN_EXPORT_URL),
        env::var(app_env::OTEL_METRIC_EXPORT_URL),
    ) {
        (Ok(span_url), Ok(metric_url)) => Some(logging::init_exporters(&span_url, &metric_url)?),
        _ => None,
    };
    let otel_enabled = otel_exporters.is_some();
    logging::setup_logging_and_tracing(logging::init_env_filter()?, otel_exporters);

    if dotenv_result.is_err() {
        info!("No .env file found, reading configuration from the environment only");
    }
    if !otel_enabled {
        warn!("OpenTelemetry export URLs not set, traces and metrics will only be logged locally");
    }

    let db_url = env::var(app_env::DB_URL)
        .with_context(|| format!("reading the {} environment variable", app_env::DB_URL))?;
    let sqlx_db_connection = db::connect_sqlx(&db_url).await?;
    db::run_migrations(&sqlx_db_connection).await?;

    let ext_cxn = persistence::ExternalConnectivity::new(sqlx_db_connection);
    let router = build_router(Arc::new(SharedData { ext_cxn }));

    let listen_address = env::var(app_env::LISTEN_ADDRESS)
        .unwrap_or_else(|_| app_env::DEFAULT_LISTEN_ADDRESS.to_owned());
    let network_listener = TcpListener::bind(&listen_address)
        .await
        .with_context(|| format!("binding to {listen_address}"))?;

    info!(%listen_address, "Starting server");
    axum::serve(network_listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running the HTTP server")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for the shutdown signal, running until killed: {err}");
        std::future::pending::<()>().await;
    }
}
