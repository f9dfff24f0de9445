use axum::Router;
use axum::body::{self, Body};
use axum::http::{Request, Response, header};
use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{Rng, thread_rng};
use serde::de::DeserializeOwned;
use sqlx::{Connection, PgConnection};
use std::env;
use std::future::Future;
use std::sync::Arc;
use todo_rest::{SharedData, build_router, db, persistence};
use tokio::runtime::Runtime;
use tower::ServiceExt;

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

/// A scratch database that gets dropped when the test finishes
struct TestDatabase {
    base_url: String,
    db_name: String,
}

impl TestDatabase {
    async fn create(base_url: &str) -> Result<Self, sqlx::Error> {
        let schema_id: u32 = thread_rng().gen_range(10_000..99_999);
        let db_name = format!("test_db_{schema_id}");

        let mut conn = PgConnection::connect(base_url).await?;
        let create_result = sqlx::query(format!("CREATE DATABASE {db_name}").as_str())
            .execute(&mut conn)
            .await;
        conn.close().await?;
        create_result?;

        Ok(Self {
            base_url: base_url.to_owned(),
            db_name,
        })
    }

    fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.db_name)
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        let db_to_drop = self.db_name.clone();
        let conn_str = self.base_url.clone();

        TOKIO_RT.block_on(async move {
            let mut conn = match PgConnection::connect(&conn_str).await {
                Ok(cxn) => cxn,
                Err(conn_err) => {
                    println!(
                        "Failed to reconnect to database to drop test database {db_to_drop}, please remove it manually. Error: {conn_err}"
                    );
                    return;
                }
            };

            let drop_result =
                sqlx::query(format!("DROP DATABASE IF EXISTS {db_to_drop} WITH (FORCE)").as_str())
                    .execute(&mut conn)
                    .await;
            if let Err(db_err) = drop_result {
                println!(
                    "Failed to drop test database {db_to_drop}, please remove it manually. Error: {db_err}"
                );
            }
        });
    }
}

/// Creates a fresh, migrated database for a test and hands the test a router wired up to it.
///
/// Expects that the TEST_DB_URL environment variable is populated with a postgres connection
/// string that has no database name on the end
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(Router) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    let pg_connection_base_url = env::var("TEST_DB_URL").expect(
        "You must provide the TEST_DB_URL environment variable as the base postgres connection string",
    );

    // The database has to outlive the runtime's block_on so its Drop can block on cleanup
    let test_db = TOKIO_RT.block_on(async {
        TestDatabase::create(&pg_connection_base_url)
            .await
            .unwrap_or_else(|db_err| panic!("Failed to start test database: {db_err}"))
    });

    TOKIO_RT.block_on(async {
        let sqlx_pool = db::connect_sqlx(&test_db.url())
            .await
            .expect("Could not connect to the test database");
        db::run_migrations(&sqlx_pool)
            .await
            .expect("Could not migrate the test database");

        let router = build_router(Arc::new(SharedData {
            ext_cxn: persistence::ExternalConnectivity::new(sqlx_pool.clone()),
        }));
        test_fn(router).await;

        sqlx_pool.close().await;
    });
}

/// Sends a single request through the router
pub async fn send(router: &Router, method: &str, uri: &str, json_body: Option<&str>) -> Response<Body> {
    let request_builder = Request::builder().method(method).uri(uri);
    let request = match json_body {
        Some(json) => request_builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_owned())),
        None => request_builder.body(Body::empty()),
    }
    .expect("Test request should be well-formed");

    router
        .clone()
        .oneshot(request)
        .await
        .expect("The router should always produce a response")
}

/// Reads the whole response body and parses it as JSON
pub async fn deserialize_body<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read data from response body!");

    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!(
            "Could not parse body content into data structure! Error: {}, Received body: {:?}",
            err, bytes
        )
    })
}
