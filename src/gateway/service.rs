use crate::domain::{ProviderEvent, UpdateMode};
use crate::gateway::{GatewayError, GatewayStatus, LocationGateway, PermissionResult, SampleResult};
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, instrument, warn};

pub type SampleStream = Pin<Box<dyn Stream<Item = SampleResult> + Send>>;

#[derive(Debug)]
pub enum GatewayCommand {
    RequestUpdate {
        mode: UpdateMode,
        reply: oneshot::Sender<SampleResult>,
    },
    Subscribe {
        mode: UpdateMode,
        reply: oneshot::Sender<Result<broadcast::Receiver<SampleResult>, GatewayError>>,
    },
    StopUpdate,
    RequestPermission {
        reply: oneshot::Sender<PermissionResult>,
    },
    Status {
        reply: oneshot::Sender<GatewayStatus>,
    },
}

/// Owns the gateway and feeds it commands and provider events one at a time. Returns the gateway once
/// every [GatewayHandle] has been dropped.
#[instrument(skip_all)]
pub async fn listen(mut gateway: LocationGateway, mut commands: Receiver<GatewayCommand>, mut events: Receiver<ProviderEvent>) -> LocationGateway {
    let mut events_open = true;

    loop {
        tokio::select! {
            biased;

            event = events.recv(), if events_open => match event {
                Some(event) => gateway.handle_event(event),
                None => {
                    warn!("⚠️ Provider event channel closed");
                    events_open = false;
                }
            },

            command = commands.recv() => match command {
                Some(command) => handle_command(&mut gateway, command),
                None => break,
            },
        }
    }

    info!("⏹️ Location gateway stopped");
    gateway
}

fn handle_command(gateway: &mut LocationGateway, command: GatewayCommand) {
    debug!("🔵 Received command: {:?}", command);
    match command {
        GatewayCommand::RequestUpdate { mode, reply } => gateway.enqueue_update(
            mode,
            Box::new(move |result| {
                reply.send(result).unwrap_or_default();
            }),
        ),
        GatewayCommand::Subscribe { mode, reply } => {
            reply.send(gateway.subscribe(mode)).unwrap_or_default();
        }
        GatewayCommand::StopUpdate => gateway.stop_update(),
        GatewayCommand::RequestPermission { reply } => gateway.request_permission(Box::new(move |result| {
            reply.send(result).unwrap_or_default();
        })),
        GatewayCommand::Status { reply } => {
            reply.send(gateway.status()).unwrap_or_default();
        }
    }
}

/// Async front for a gateway running in [listen].
#[derive(Clone, Debug)]
pub struct GatewayHandle {
    tx: Sender<GatewayCommand>,
}

impl GatewayHandle {
    pub fn new(tx: Sender<GatewayCommand>) -> Self {
        GatewayHandle { tx }
    }

    /// Spawns [listen] for the gateway and returns a handle to it.
    pub fn spawn(gateway: LocationGateway, events: Receiver<ProviderEvent>, buffer_size: usize) -> (GatewayHandle, JoinHandle<LocationGateway>) {
        let (tx, rx) = mpsc::channel::<GatewayCommand>(buffer_size.max(1));
        let task = tokio::spawn(listen(gateway, rx, events));

        (GatewayHandle::new(tx), task)
    }

    pub async fn request_update(&self) -> SampleResult {
        self.update(UpdateMode::Foreground).await
    }

    pub async fn request_background_update(&self) -> SampleResult {
        self.update(UpdateMode::Background).await
    }

    pub async fn update(&self, mode: UpdateMode) -> SampleResult {
        let (reply, rx) = oneshot::channel();
        self.send(GatewayCommand::RequestUpdate { mode, reply }).await?;
        rx.await.map_err(|_| GatewayError::Closed)?
    }

    /// Like [GatewayHandle::update] but gives up after `limit`. The request stays queued in the gateway
    /// until the next sample or error arrives.
    pub async fn request_update_within(&self, mode: UpdateMode, limit: Duration) -> SampleResult {
        timeout(limit, self.update(mode)).await.map_err(|_| GatewayError::TimedOut(limit))?
    }

    pub async fn subscribe(&self, mode: UpdateMode) -> Result<SampleStream, GatewayError> {
        let (reply, rx) = oneshot::channel();
        self.send(GatewayCommand::Subscribe { mode, reply }).await?;
        let receiver = rx.await.map_err(|_| GatewayError::Closed)??;

        let stream = BroadcastStream::new(receiver).filter_map(|item| match item {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("⚠️ Location subscriber fell behind: {}", e);
                None
            }
        });

        Ok(Box::pin(stream))
    }

    pub async fn stop_update(&self) -> Result<(), GatewayError> {
        self.send(GatewayCommand::StopUpdate).await
    }

    pub async fn request_permission(&self) -> PermissionResult {
        let (reply, rx) = oneshot::channel();
        self.send(GatewayCommand::RequestPermission { reply }).await?;
        rx.await.map_err(|_| GatewayError::Closed)?
    }

    /// Like [GatewayHandle::request_permission] but gives up after `limit`. Platforms do not answer a prompt
    /// once the authorization is determined, so an unbounded request can wait forever.
    pub async fn request_permission_within(&self, limit: Duration) -> PermissionResult {
        timeout(limit, self.request_permission()).await.map_err(|_| GatewayError::TimedOut(limit))?
    }

    pub async fn status(&self) -> Result<GatewayStatus, GatewayError> {
        let (reply, rx) = oneshot::channel();
        self.send(GatewayCommand::Status { reply }).await?;
        rx.await.map_err(|_| GatewayError::Closed)
    }

    async fn send(&self, command: GatewayCommand) -> Result<(), GatewayError> {
        self.tx.send(command).await.map_err(|_| GatewayError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthorizationStatus, LocationSample, ProviderError};
    use crate::gateway::GatewayConfig;
    use crate::simulation::{SimulatedProvider, SimulationSettings};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use test_log::test;

    fn start(settings: SimulationSettings) -> (Arc<SimulatedProvider>, GatewayHandle, JoinHandle<LocationGateway>) {
        let (events_tx, events_rx) = mpsc::channel::<ProviderEvent>(16);
        let provider = Arc::new(SimulatedProvider::new(events_tx, settings));
        let gateway = LocationGateway::new(provider.clone(), GatewayConfig::default());
        let (handle, task) = GatewayHandle::spawn(gateway, events_rx, 8);

        (provider, handle, task)
    }

    fn authorized() -> SimulationSettings {
        SimulationSettings {
            initial_authorization: AuthorizationStatus::AuthorizedAlways,
            ..SimulationSettings::default()
        }
    }

    fn sample() -> LocationSample {
        LocationSample::new(51.8615899, 4.3580323, Utc::now(), 5.0)
    }

    async fn wait_for_pending_updates(handle: &GatewayHandle, count: usize) {
        while handle.status().await.unwrap().pending_updates < count {
            tokio::task::yield_now().await;
        }
    }

    #[test(tokio::test)]
    async fn resolves_a_permission_request_with_the_prompt_outcome() {
        let (_provider, handle, _task) = start(SimulationSettings::default());

        let result = handle.request_permission().await;

        assert_eq!(result, Ok(AuthorizationStatus::AuthorizedWhenInUse));
        assert!(!handle.status().await.unwrap().permission_pending);
    }

    #[test(tokio::test)]
    async fn resolves_an_update_with_the_next_sample() {
        let (provider, handle, _task) = start(authorized());

        let request_handle = handle.clone();
        let request = tokio::spawn(async move { request_handle.request_update().await });
        wait_for_pending_updates(&handle, 1).await;

        let sample = sample();
        provider.deliver(ProviderEvent::Samples(vec![sample.clone()])).await.unwrap();

        assert_eq!(request.await.unwrap(), Ok(sample));
    }

    #[test(tokio::test)]
    async fn rejects_an_update_when_the_service_is_disabled() {
        let settings = SimulationSettings {
            service_enabled: false,
            ..authorized()
        };
        let (_provider, handle, _task) = start(settings);

        assert_eq!(handle.request_background_update().await, Err(GatewayError::Disabled));
    }

    #[test(tokio::test(start_paused = true))]
    async fn times_out_when_no_sample_arrives() {
        let (_provider, handle, _task) = start(authorized());

        let result = handle.request_update_within(UpdateMode::Foreground, Duration::from_secs(5)).await;

        assert_eq!(result, Err(GatewayError::TimedOut(Duration::from_secs(5))));
        assert_eq!(handle.status().await.unwrap().pending_updates, 1);
    }

    #[test(tokio::test(start_paused = true))]
    async fn bounds_a_permission_request_when_the_status_is_already_determined() {
        let (_provider, handle, _task) = start(authorized());

        let result = handle.request_permission_within(Duration::from_millis(300)).await;

        assert_eq!(result, Err(GatewayError::TimedOut(Duration::from_millis(300))));
        assert!(handle.status().await.unwrap().permission_pending);
    }

    #[test(tokio::test)]
    async fn resolves_a_bounded_permission_request_with_the_prompt_outcome() {
        let (_provider, handle, _task) = start(SimulationSettings::default());

        let result = handle.request_permission_within(Duration::from_secs(5)).await;

        assert_eq!(result, Ok(AuthorizationStatus::AuthorizedWhenInUse));
    }

    #[test(tokio::test)]
    async fn accepts_a_zero_command_buffer() {
        let (events_tx, events_rx) = mpsc::channel::<ProviderEvent>(1);
        let provider = Arc::new(SimulatedProvider::new(events_tx, authorized()));
        let gateway = LocationGateway::new(provider, GatewayConfig::default());

        let (handle, _task) = GatewayHandle::spawn(gateway, events_rx, 0);

        assert!(handle.status().await.unwrap().authorization_valid);
    }

    #[test(tokio::test)]
    async fn streams_samples_and_errors_to_subscribers() {
        let (provider, handle, _task) = start(authorized());
        let mut stream = handle.subscribe(UpdateMode::Foreground).await.unwrap();

        let sample = sample();
        provider.deliver(ProviderEvent::Samples(vec![sample.clone()])).await.unwrap();
        provider.deliver(ProviderEvent::Error(ProviderError::Network)).await.unwrap();

        assert_eq!(stream.next().await, Some(Ok(sample)));
        assert_eq!(stream.next().await, Some(Err(GatewayError::Custom(ProviderError::Network))));
    }

    #[test(tokio::test)]
    async fn rejects_a_subscription_when_not_authorized() {
        let (_provider, handle, _task) = start(SimulationSettings::default());

        let result = handle.subscribe(UpdateMode::Background).await;

        assert!(matches!(result, Err(GatewayError::NotAuthorized)));
    }

    #[test(tokio::test)]
    async fn stops_the_provider_on_request() {
        let (provider, handle, _task) = start(authorized());
        let _stream = handle.subscribe(UpdateMode::Foreground).await.unwrap();
        assert!(provider.is_updating());

        handle.stop_update().await.unwrap();

        assert_eq!(handle.status().await.unwrap().active_mode, None);
        assert!(!provider.is_updating());
    }

    #[test(tokio::test)]
    async fn returns_the_gateway_once_every_handle_is_dropped() {
        let (_provider, handle, task) = start(authorized());
        handle.stop_update().await.unwrap();

        drop(handle);
        let gateway = task.await.unwrap();

        assert_eq!(gateway.status().pending_updates, 0);
    }

    #[test(tokio::test)]
    async fn reports_closed_once_the_gateway_stopped() {
        let (_provider, handle, task) = start(authorized());

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        assert_eq!(handle.request_update().await, Err(GatewayError::Closed));
        assert_eq!(handle.status().await, Err(GatewayError::Closed));
    }
}
