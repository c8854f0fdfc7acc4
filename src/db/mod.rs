pub mod open_interest_repo;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::models::{Sample, StoredSample};

pub async fn init_pool(options: PgConnectOptions) -> anyhow::Result<PgPool> {
    // One cycle at a time never needs more than a couple of connections.
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await?;

    // Verify connectivity
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Append-only time series of open interest samples.
#[async_trait]
pub trait SampleStore: Send + Sync {
    async fn most_recent(&self) -> anyhow::Result<Option<StoredSample>>;

    async fn append(&self, sample: &Sample) -> anyhow::Result<StoredSample>;
}

/// `SampleStore` backed by the `open_interest` Postgres table.
#[derive(Debug, Clone)]
pub struct PgSampleStore {
    pool: PgPool,
}

impl PgSampleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SampleStore for PgSampleStore {
    async fn most_recent(&self) -> anyhow::Result<Option<StoredSample>> {
        open_interest_repo::get_most_recent(&self.pool).await
    }

    async fn append(&self, sample: &Sample) -> anyhow::Result<StoredSample> {
        open_interest_repo::insert_sample(&self.pool, sample).await
    }
}
