use crate::{
    config::DbConfig,
    error::{OpenDatabaseSnafu, SatchelResult},
};
use snafu::ResultExt;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

pub fn pool_options(config: &DbConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .test_before_acquire(true)
}

///how long to wait after the `attempt`th failed connect (1-based): doubles each time, capped at a minute
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(MAX_RETRY_DELAY)
}

pub async fn connect_with_backoff(options: PgPoolOptions, config: &DbConfig) -> SatchelResult<PgPool> {
    let mut attempt = 1;
    loop {
        match options.clone().connect(config.get_db_url()).await {
            Ok(pool) => {
                info!(attempt, "Connected to database");
                return Ok(pool);
            }
            Err(e) if attempt < config.connect_attempts => {
                let delay = backoff_delay(config.retry_delay, attempt);
                warn!(?e, attempt, ?delay, "Database connection failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).context(OpenDatabaseSnafu { attempts: attempt });
            }
        }
    }
}
