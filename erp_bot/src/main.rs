mod scheduler;

use anyhow::Context;
use erp_core::config::Config;
use erp_core::erp::CamuClient;
use erp_core::notifier::TelegramNotifier;
use erp_core::schedule::ScheduleConfig;
use tracing_subscriber::EnvFilter;

use crate::scheduler::runner::{
    DailyReporter, HTTP_TIMEOUT, POLL_INTERVAL, REPORT_HOUR, REPORT_MINUTE,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    log::info!("Starting erp_bot...");

    let config = Config::from_env().context("failed to load configuration")?;
    log::info!("Loaded configuration: {:?}", config);

    let schedule = ScheduleConfig::ist_daily(REPORT_HOUR, REPORT_MINUTE, POLL_INTERVAL)
        .context("invalid report schedule")?;
    let erp = CamuClient::new(config.erp_base_url.clone(), HTTP_TIMEOUT);
    let notifier = TelegramNotifier::new(&config.telegram_bot_token, HTTP_TIMEOUT)
        .context("failed to build Telegram client")?;

    DailyReporter::new(erp, notifier, config, schedule)
        .run_forever()
        .await;

    Ok(())
}
