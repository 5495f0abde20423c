use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use giveaway_alert::WEBHOOK_URL_VAR;
use giveaway_alert::api::GamerPowerClient;
use giveaway_alert::config::{AppConfig, CONFIG_PATH};
use giveaway_alert::engine::run_once;
use giveaway_alert::history::HistoryStore;
use giveaway_alert::notifier::{DiscordWebhook, LogNotifier, Notifier};
use giveaway_alert::reporter;

#[derive(Parser)]
#[command(
    name = "giveaway-alert",
    about = "Announce new GamerPower free-game giveaways to a Discord webhook"
)]
struct Args {
    /// Path to the TOML config file (optional; defaults apply when absent)
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Override the history file from the config
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Override the platform filter from the config (e.g. pc, steam, epic-games-store)
    #[arg(long)]
    platform: Option<String>,

    /// Log the messages instead of posting them, and leave history untouched
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut app_config = AppConfig::load_or_default(&args.config)?;
    if let Some(history_file) = args.history_file {
        app_config.settings.history_file = history_file;
    }
    if let Some(platform) = args.platform {
        app_config.source.platform = platform;
    }

    // Fail before any network or history I/O when the webhook is missing
    let config = app_config.resolve(std::env::var(WEBHOOK_URL_VAR).ok())?;

    let mode = if args.dry_run { "dry-run" } else { "live" };
    info!(
        "Starting giveaway-alert ({mode}) — platform={} history={} timeout={}s",
        config.platform,
        config.history_file.display(),
        config.http_timeout.as_secs(),
    );

    let source = GamerPowerClient::new(&config.api_base, &config.platform, config.http_timeout)?;
    let store = HistoryStore::new(&config.history_file);
    let notifier: Box<dyn Notifier> = if args.dry_run {
        Box::new(LogNotifier::new(&config.webhook))
    } else {
        Box::new(DiscordWebhook::new(config.webhook.clone(), config.http_timeout)?)
    };

    let summary = run_once(&source, notifier.as_ref(), &store, args.dry_run).await?;
    info!(
        "Run complete: {} notified, {} failed, {} already seen",
        summary.notified.len(),
        summary.failed.len(),
        summary.already_seen,
    );
    reporter::report_summary(&summary);

    Ok(())
}
