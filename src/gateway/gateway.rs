use crate::domain::{AuthorizationStatus, LocationSample, ProviderError, ProviderEvent, UpdateConfig, UpdateMode, ValidStatusSet};
use crate::gateway::GatewayError;
use crate::provider::LocationProvider;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, trace, warn};

pub type SampleResult = Result<LocationSample, GatewayError>;
pub type PermissionResult = Result<AuthorizationStatus, GatewayError>;

pub type UpdateCallback = Box<dyn FnOnce(SampleResult) + Send>;
pub type PermissionCallback = Box<dyn FnOnce(PermissionResult) + Send>;

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub valid_statuses: ValidStatusSet,
    pub updates: UpdateConfig,
    pub subscriber_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            valid_statuses: ValidStatusSet::default(),
            updates: UpdateConfig::default(),
            subscriber_capacity: 16,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GatewayStatus {
    pub service_enabled: bool,
    pub authorization: AuthorizationStatus,
    pub authorization_valid: bool,
    pub active_mode: Option<UpdateMode>,
    pub pending_updates: usize,
    pub permission_pending: bool,
    pub subscribers: usize,
}

/// Mediates between callers and a [LocationProvider]. Updates are only started while the service is
/// enabled and authorized, and every permission request resolves exactly once.
///
/// The gateway is not synchronized, callers and provider events must be serialized by the owner
/// (see [`listen`](crate::gateway::listen)).
pub struct LocationGateway {
    provider: Arc<dyn LocationProvider>,
    valid_statuses: ValidStatusSet,
    updates: UpdateConfig,
    active_mode: Option<UpdateMode>,
    pending_updates: Vec<UpdateCallback>,
    pending_permission: Option<PermissionCallback>,
    subscribers: broadcast::Sender<SampleResult>,
}

impl LocationGateway {
    pub fn new(provider: Arc<dyn LocationProvider>, config: GatewayConfig) -> Self {
        let (subscribers, _) = broadcast::channel(config.subscriber_capacity.max(1));

        LocationGateway {
            provider,
            valid_statuses: config.valid_statuses,
            updates: config.updates,
            active_mode: None,
            pending_updates: Vec::new(),
            pending_permission: None,
            subscribers,
        }
    }

    pub fn request_update(&mut self, callback: UpdateCallback) {
        self.enqueue_update(UpdateMode::Foreground, callback);
    }

    pub fn request_background_update(&mut self, callback: UpdateCallback) {
        self.enqueue_update(UpdateMode::Background, callback);
    }

    /// Queues a one-shot callback, it is invoked with the next valid sample or provider error and then dropped.
    /// Precondition failures invoke the callback before returning.
    pub fn enqueue_update(&mut self, mode: UpdateMode, callback: UpdateCallback) {
        if let Err(error) = self.check_preconditions() {
            debug!(?mode, "📍 Rejecting location request: {}", error);
            callback(Err(error));
            return;
        }

        self.pending_updates.push(callback);
        debug!(?mode, pending = self.pending_updates.len(), "📍 Queued location request");
        self.start(mode);
    }

    /// Opens a persistent subscription that receives every valid sample and every surfaced error.
    pub fn subscribe(&mut self, mode: UpdateMode) -> Result<broadcast::Receiver<SampleResult>, GatewayError> {
        self.check_preconditions().inspect_err(|error| debug!(?mode, "📍 Rejecting subscription: {}", error))?;

        let receiver = self.subscribers.subscribe();
        info!(?mode, subscribers = self.subscribers.receiver_count(), "📍 Opened location subscription");
        self.start(mode);

        Ok(receiver)
    }

    /// Stops the provider. Queued requests stay queued.
    pub fn stop_update(&mut self) {
        info!(pending = self.pending_updates.len(), "⏹️ Stopping location updates");
        self.provider.stop_updates();
        self.active_mode = None;
    }

    pub fn request_permission(&mut self, callback: PermissionCallback) {
        if let Some(superseded) = self.pending_permission.take() {
            warn!("⚠️ A permission request was still pending, resolving it as superseded");
            superseded(Err(GatewayError::Superseded));
        }

        self.pending_permission = Some(callback);
        info!(status = %self.provider.authorization_status(), "🔑 Requesting location authorization");
        self.provider.request_authorization();
    }

    pub fn is_service_enabled(&self) -> bool {
        self.provider.is_service_enabled()
    }

    pub fn is_authorization_valid(&self) -> bool {
        self.valid_statuses.contains(self.provider.authorization_status())
    }

    pub fn is_authorization_undetermined(&self) -> bool {
        self.provider.authorization_status().is_undetermined()
    }

    pub fn is_authorization_denied(&self) -> bool {
        self.provider.authorization_status().is_denied()
    }

    pub fn status(&self) -> GatewayStatus {
        GatewayStatus {
            service_enabled: self.is_service_enabled(),
            authorization: self.provider.authorization_status(),
            authorization_valid: self.is_authorization_valid(),
            active_mode: self.active_mode,
            pending_updates: self.pending_updates.len(),
            permission_pending: self.pending_permission.is_some(),
            subscribers: self.subscribers.receiver_count(),
        }
    }

    #[instrument(skip_all)]
    pub fn handle_event(&mut self, event: ProviderEvent) {
        trace!("🔸 Received provider event: {:?}", event);
        match event {
            ProviderEvent::Samples(samples) => self.on_samples(samples),
            ProviderEvent::Error(error) => self.on_error(error),
            ProviderEvent::AuthorizationChanged(status) => self.on_authorization_change(status),
        }
    }

    /// Only the most recent sample of a batch is considered.
    pub fn on_samples(&mut self, samples: Vec<LocationSample>) {
        let Some(sample) = samples.into_iter().last() else {
            trace!("Ignoring empty sample batch");
            return;
        };

        if !sample.is_valid() {
            debug!(latitude = sample.latitude, longitude = sample.longitude, "🔸 Ignoring sample without a fix");
            return;
        }

        let fulfilled = self.pending_updates.len();
        for callback in self.pending_updates.drain(..) {
            callback(Ok(sample.clone()));
        }
        let subscribers = self.subscribers.send(Ok(sample.clone())).unwrap_or_default();

        debug!(
            latitude = sample.latitude,
            longitude = sample.longitude,
            accuracy = sample.accuracy,
            fulfilled,
            subscribers,
            "📍 Delivered location sample"
        );
    }

    pub fn on_error(&mut self, error: ProviderError) {
        if error.is_denied() {
            warn!("⚠️ Provider reported that location access was denied, stopping updates");
            self.provider.stop_updates();
            self.active_mode = None;
            self.fail_pending(GatewayError::NotAuthorized);
            return;
        }

        warn!("⚠️ Provider reported an error: {}", error);
        self.fail_pending(GatewayError::Custom(error));
    }

    pub fn on_authorization_change(&mut self, status: AuthorizationStatus) {
        if status.is_undetermined() {
            trace!("Ignoring authorization change to '{}'", status);
            return;
        }

        let Some(callback) = self.pending_permission.take() else {
            debug!("🔑 Authorization changed to '{}' without a pending request", status);
            return;
        };

        if self.valid_statuses.contains(status) {
            info!("🔑 Authorization granted: '{}'", status);
            callback(Ok(status));
        } else {
            info!("🔑 Authorization refused: '{}'", status);
            callback(Err(GatewayError::NotAuthorized));
        }
    }

    fn check_preconditions(&self) -> Result<(), GatewayError> {
        if !self.is_service_enabled() {
            return Err(GatewayError::Disabled);
        }

        if !self.is_authorization_valid() {
            return Err(GatewayError::NotAuthorized);
        }

        Ok(())
    }

    fn start(&mut self, mode: UpdateMode) {
        // A running background session is not downgraded by a foreground request
        let mode = match (self.active_mode, mode) {
            (Some(UpdateMode::Background), _) => UpdateMode::Background,
            (_, mode) => mode,
        };

        let config = self.updates.for_mode(mode);
        debug!(?mode, ?config, "▶️ Starting location updates");
        self.provider.start_updates(&config);
        self.active_mode = Some(mode);
    }

    fn fail_pending(&mut self, error: GatewayError) {
        for callback in self.pending_updates.drain(..) {
            callback(Err(error.clone()));
        }
        self.subscribers.send(Err(error)).unwrap_or_default();
    }
}

impl Debug for LocationGateway {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationGateway")
            .field("provider", &self.provider)
            .field("valid_statuses", &self.valid_statuses)
            .field("active_mode", &self.active_mode)
            .field("pending_updates", &self.pending_updates.len())
            .field("permission_pending", &self.pending_permission.is_some())
            .finish()
    }
}
