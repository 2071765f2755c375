//! Shared setup for the demo binaries.

use std::error::Error;

use drainpipe::{PipelineConfig, Variant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,drainpipe=debug")),
        )
        .with_target(false)
        .init();
}

/// Run `variant` with its demo configuration.
///
/// The coordinator cancels after the configured delay, or earlier on
/// Ctrl-C.
pub async fn run(variant: Variant) -> Result<(), Box<dyn Error>> {
    let config: PipelineConfig = variant.config();
    info!(%variant, shutdown_after = ?config.shutdown_after, "starting pipeline");

    let delay = config.shutdown_after;
    let trigger = async move {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            interrupted = tokio::signal::ctrl_c() => {
                if let Err(e) = interrupted {
                    error!("failed to listen for ctrl-c: {e}");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    };

    let report = drainpipe::run_until(variant, config, trigger).await?;
    for stage in &report.stages {
        info!(stage = %stage.kind, exit = %stage.exit, handled = stage.handled, "stage report");
    }
    info!(elapsed = ?report.elapsed, "clean shutdown");
    Ok(())
}
