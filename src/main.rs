use futures::StreamExt;
use location_gateway::app_config::AppConfig;
use location_gateway::domain::{ProviderEvent, UpdateMode};
use location_gateway::gateway::{GatewayHandle, LocationGateway};
use location_gateway::simulation::{SimulatedProvider, load_track, replay};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task;
use tokio::time::timeout;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!("✅  Loaded configuration");

    let track = load_track(config.simulation().track()).await?;
    info!(steps = track.len(), "✅  Loaded track '{}'", config.simulation().track());

    let (events_tx, events_rx) = mpsc::channel::<ProviderEvent>(config.gateway().event_buffer_size());
    let provider = Arc::new(SimulatedProvider::new(events_tx, config.simulation().settings()));
    let gateway = LocationGateway::new(provider.clone(), config.gateway_config());
    let (handle, gateway_task) = GatewayHandle::spawn(gateway, events_rx, config.gateway().command_buffer_size());
    info!("✅  Initialized location gateway");

    let status = handle.status().await?;
    if status.authorization.is_undetermined() {
        let authorization = handle.request_permission().await?;
        info!("✅  Location access granted: '{}'", authorization);
    }

    let mut samples = handle.subscribe(UpdateMode::Foreground).await?;

    task::spawn(replay(provider.clone(), track, config.simulation().interval()));
    info!("🔥 {} is up and running", env!("CARGO_PKG_NAME"));

    let request_timeout = config.gateway().request_timeout();
    let first = handle.request_update_within(UpdateMode::Foreground, request_timeout).await?;
    info!(accuracy = first.accuracy, "📍 First fix at {}, {}", first.latitude, first.longitude);

    for _ in 0..config.simulation().samples() {
        match timeout(request_timeout, samples.next()).await {
            Ok(Some(Ok(sample))) => info!(accuracy = sample.accuracy, timestamp = %sample.timestamp, "📍 {}, {}", sample.latitude, sample.longitude),
            Ok(Some(Err(e))) => warn!("⚠️ Location update failed: {}", e),
            Ok(None) => break,
            Err(_) => {
                warn!("⏳ No location update for {} seconds", request_timeout.as_secs());
                break;
            }
        }
    }

    handle.stop_update().await?;
    drop(samples);
    drop(handle);

    gateway_task.await?;
    info!("👋 {} stopped", env!("CARGO_PKG_NAME"));

    Ok(())
}
