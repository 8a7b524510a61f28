use std::sync::Arc;

use crate::config::{Config, LogFormat};
use productsmgmt_core::products::{ProductService, ProductServiceTrait};
use productsmgmt_storage_sqlite::{db, products::ProductRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub product_service: Arc<dyn ProductServiceTrait>,
}

pub fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::init_schema(&pool)?;
    let writer = db::spawn_writer(pool.clone());

    let exchange = config.exchange.build()?;
    tracing::info!(
        "Exchange provider: {} (max {} attempts, cache ttl {}s)",
        config.exchange.provider,
        config.exchange.max_attempts,
        config.exchange.cache_ttl_secs
    );

    let product_repository = Arc::new(ProductRepository::new(pool.clone(), writer.clone()));
    let product_service: Arc<dyn ProductServiceTrait> =
        Arc::new(ProductService::new(product_repository, exchange));

    Ok(Arc::new(AppState { product_service }))
}
