use crate::domain::ProviderEvent;
use crate::simulation::{SimulatedProvider, Track, TrackStep};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Plays a track against the provider, one step per interval. Samples and errors are dropped while
/// the provider is not streaming, like a platform that has been told to stop.
#[instrument(skip_all, fields(steps = track.len()))]
pub async fn replay(provider: Arc<SimulatedProvider>, track: Track, interval: Duration) {
    info!("🎬 Replaying track...");
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));

    for (index, step) in track.into_iter().enumerate() {
        ticker.tick().await;

        let delivered = match step {
            TrackStep::Samples(samples) if provider.is_updating() => provider.deliver(ProviderEvent::Samples(samples)).await,
            TrackStep::Error(error) if provider.is_updating() => provider.deliver(ProviderEvent::Error(error)).await,
            TrackStep::Samples(_) | TrackStep::Error(_) => {
                debug!(step = index, "🎬 Skipping step, updates are not running");
                Ok(())
            }
            TrackStep::Authorization(status) => provider.change_authorization(status).await,
            TrackStep::ServiceEnabled(enabled) => {
                provider.set_service_enabled(enabled);
                Ok(())
            }
        };

        if let Err(e) = delivered {
            warn!(step = index, "⚠️ Gateway stopped listening, aborting replay: {}", e);
            return;
        }
    }

    info!("🎬 Replaying track... OK");
}
