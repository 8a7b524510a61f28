use productsmgmt_server::config::Config;
use productsmgmt_server::{build_state, init_tracing, scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);
    let state = build_state(&config).await?;

    let refresh = scheduler::start_pricing_refresh_scheduler(state.clone(), config.refresh_interval);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested, stopping pricing refresh");
    refresh.abort();
    Ok(())
}
