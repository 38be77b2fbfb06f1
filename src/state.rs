use crate::{
    config::RuntimeConfiguration,
    connection::connect_with_backoff,
    error::{GetDatabaseConnectionSnafu, MigrateSnafu, SatchelResult},
};
use snafu::ResultExt;
use sqlx::{Pool, Postgres, migrate::Migrator, pool::PoolConnection, postgres::PgPoolOptions};
use std::ops::Deref;

pub static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Clone, Debug)]
pub struct SatchelState {
    pool: Pool<Postgres>,
    config: RuntimeConfiguration,
}

impl SatchelState {
    pub async fn new(options: PgPoolOptions, config: RuntimeConfiguration) -> SatchelResult<Self> {
        let pool = connect_with_backoff(options, &config.db_config()).await?;

        MIGRATOR.run(&pool).await.context(MigrateSnafu)?;

        Ok(Self::from_pool(pool, config))
    }

    ///for a pool that has already been connected and migrated
    pub fn from_pool(pool: Pool<Postgres>, config: RuntimeConfiguration) -> Self {
        Self { pool, config }
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    ///the connection goes back to the pool when the guard drops, on error paths too
    pub async fn get_connection(&self) -> SatchelResult<PoolConnection<Postgres>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }

    pub async fn sensible_shutdown(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

impl Deref for SatchelState {
    type Target = Pool<Postgres>;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}
