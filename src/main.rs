//! Judgment monitor — binary entrypoint.
//! Parses the command line, loads settings and secrets, then runs the poller
//! until it finishes (test / CI) or receives Ctrl-C.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use judgment_monitor::browse::http::HttpBrowser;
use judgment_monitor::cli::{ci_marker_present, Args};
use judgment_monitor::config::{load_settings, Transport};
use judgment_monitor::{Poller, TelegramNotifier};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the variables come from the runner.
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    let ci = ci_marker_present();
    let plan = args.plan(ci);
    let settings = load_settings(args.config.as_deref())?;

    let transport = Transport::from_env();
    if !transport.is_enabled() {
        tracing::warn!("TELEGRAM_TOKEN / CHAT_ID not configured; notifications will only be logged");
    }

    tracing::info!(
        mode = ?plan.mode,
        count = plan.count,
        ci,
        categories = settings.categories.len(),
        "judgment monitor starting"
    );

    let browser = Arc::new(HttpBrowser::new(settings.navigation_timeout())?);
    let notifier = Arc::new(TelegramNotifier::new(transport));
    let poller = Poller::new(browser, notifier, settings, plan);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, stopping after the current cycle");
            on_signal.cancel();
        }
    });

    poller.run(cancel).await
}
