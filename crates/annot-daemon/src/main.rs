//! Annotation hub daemon — thin process entrypoint.
//!
//! Loads config, sets up logging, constructs the shipped in-memory
//! backplane, spawns the hub and control ingress, and waits for a
//! shutdown signal. The HTTP/WebSocket upgrade path that accepts
//! connections and calls [`annot_hub::HubHandle::open`] lives outside
//! this crate (see the module docs for the boundary).

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::sync::Arc;

use annot_backplane::{memory::InMemoryBackplane, Backplane};
use annot_config::HubConfig;
use annot_hub::{hub, ControlIngress};
use annot_telemetry::LogConfig;
use anyhow::{Context, Result};
use tracing::info;

fn config_path_from_args() -> Option<std::path::PathBuf> {
    std::env::args().nth(1).map(std::path::PathBuf::from)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = config_path_from_args();
    let config =
        HubConfig::load(config_path.as_deref()).context("failed to load hub configuration")?;

    annot_telemetry::setup_logging(&LogConfig::new(config.log_level.clone()))
        .context("failed to initialize logging")?;

    info!(
        max_conns_per_user = config.quotas.max_conns_per_user,
        max_subs_per_conn = config.quotas.max_subs_per_conn,
        "starting annotation hub daemon"
    );

    let backplane: Arc<dyn Backplane> = Arc::new(InMemoryBackplane::new());
    let (hub_handle, hub_task) = hub::spawn(config, backplane.clone());
    let control_ingress = ControlIngress::spawn(&backplane, hub_handle.clone())
        .await
        .context("failed to establish control-ingress subscriptions")?;

    info!("hub ready; waiting for shutdown signal");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!("shutdown signal received, stopping hub");
    control_ingress.shutdown();
    hub_handle.shutdown();
    let _ = hub_task.await;

    Ok(())
}
