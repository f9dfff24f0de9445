use anyhow::Context;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Schema for the todo_item table, embedded at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const MAX_CONNECTIONS: u32 = 20;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

/// Builds the connection pool shared by every request handler
pub async fn connect_sqlx(db_url: &str) -> Result<PgPool, anyhow::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(db_url)
        .await
        .context("connecting to the database")
}

/// Applies any pending migrations so the todo_item table and its indexes exist
pub async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    MIGRATOR
        .run(pool)
        .await
        .context("running database migrations")
}
