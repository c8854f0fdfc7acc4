use oi_tracker::config::{AppConfig, LogFormat};
use oi_tracker::db::{self, PgSampleStore};
use oi_tracker::metrics::init_metrics;
use oi_tracker::perps::constants::{JUPITER_PERPETUALS_PROGRAM_ID, POSITION_ACCOUNT};
use oi_tracker::perps::{account_discriminator, CustodyMap, PerpsClient, PositionDecoder};
use oi_tracker::services::{run_tracker, Notifier, Tracker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    // sqlx and reqwest both pull in rustls; pick the provider explicitly.
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        tracing::debug!("rustls crypto provider already installed");
    }

    if let Some(addr) = config.metrics_addr {
        init_metrics(addr)?;
        tracing::info!(%addr, "Prometheus metrics listener started");
    }

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(config.database.connect_options()?).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("Database connected");

    let decoder = PositionDecoder::new(
        account_discriminator(POSITION_ACCOUNT),
        CustodyMap::jupiter()?,
    );
    let source = PerpsClient::new(
        PerpsClient::http_client(config.rpc_timeout)?,
        config.solana_rpc_url.clone(),
        JUPITER_PERPETUALS_PROGRAM_ID.into(),
        decoder,
    );

    let notifier = if config.has_telegram() {
        Some(Notifier::new(
            reqwest::Client::new(),
            config.telegram_bot_token.clone().unwrap_or_default(),
            config.telegram_chat_id.clone().unwrap_or_default(),
        ))
    } else {
        tracing::warn!(
            "TG_API_KEY or TG_EMERGENCY_CHANNEL_ID missing — alerts will only be logged"
        );
        None
    };

    let tracker = Tracker::new(
        source,
        PgSampleStore::new(pool.clone()),
        notifier,
        config.alert_policy,
    );

    run_tracker(&tracker, config.poll_interval, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for interrupt signal");
            std::future::pending::<()>().await;
        }
    })
    .await;

    pool.close().await;
    tracing::info!("Database pool closed");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}
