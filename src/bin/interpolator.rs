//! Interpolator: synthetic trader fleet for the Reactive Stock gateway.
//!
//!   TransactionStream (WS) ───────────────────────────────→ log, forever
//!   ActorDriver: register ×N → settle → login ×N → order wave (BUY/SELL)
//!
//! Runs until killed.

use std::path::Path;

use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use reactive_interpolator::simulator::endpoints::TABLE_SERVICE;
use reactive_interpolator::{
    ActorDriver, EndpointRegistry, GatewayClient, Settings, TransactionStream,
};

fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "interpolator.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let settings = Settings::from_env()?;
    let _log_guard = init_tracing(settings.log_dir.as_deref());

    info!("═══════════════════════════════════════════════════");
    info!("  Interpolator: Reactive Stock trader fleet");
    info!("═══════════════════════════════════════════════════");

    let registry = EndpointRegistry::reactive_stock();
    let client = GatewayClient::new(settings.gateway_url.clone());

    let stream_endpoint = registry.get(TABLE_SERVICE, "resolvedTransactionsStream")?;
    let stream_url = client.stream_url(stream_endpoint)?;
    let driver = ActorDriver::new(settings.driver.clone(), client, &registry)?;

    tokio::spawn(TransactionStream::new(stream_url).run());

    let wave = driver.run().await?;
    info!("🚀 Fleet launched: {:?}", wave.report);

    tokio::spawn(async move {
        let outcome = wave.join().await;
        if outcome.failed > 0 {
            error!("📤 Order wave done: {} placed, {} failed", outcome.placed, outcome.failed);
        } else {
            info!("📤 Order wave done: {} placed", outcome.placed);
        }
    });

    // Keep the stream consumer alive
    std::future::pending::<()>().await;
    Ok(())
}
