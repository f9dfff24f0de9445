use sqlx::PgConnection;

/// Something which can lend out a live database connection to a driven adapter
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Abstraction over the clients business logic needs to reach systems outside this process.
/// Driven adapters ask it for connections so the domain never touches a pool directly.
pub trait ExternalConnectivity: Send {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}
