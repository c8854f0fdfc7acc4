use sqlx::PgPool;

use crate::models::sample::SAMPLE_COLUMNS;
use crate::models::{Sample, StoredSample};

/// Fetch the latest stored sample, if any.
pub async fn get_most_recent(pool: &PgPool) -> anyhow::Result<Option<StoredSample>> {
    let row = sqlx::query_as::<_, StoredSample>(
        "SELECT * FROM open_interest ORDER BY timestamp DESC, id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Append a sample stamped with the current time. Rows are never updated.
pub async fn insert_sample(pool: &PgPool, sample: &Sample) -> anyhow::Result<StoredSample> {
    let sql = format!(
        "INSERT INTO open_interest ({}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        SAMPLE_COLUMNS.join(", ")
    );
    let row = sqlx::query_as::<_, StoredSample>(&sql)
        .bind(sample.sol_long_interest)
        .bind(sample.sol_short_interest)
        .bind(sample.btc_long_interest)
        .bind(sample.btc_short_interest)
        .bind(sample.eth_long_interest)
        .bind(sample.eth_short_interest)
        .fetch_one(pool)
        .await?;

    Ok(row)
}
