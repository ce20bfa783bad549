use crate::domain::{AuthorizationStatus, ProviderEvent, UpdateConfig};
use crate::provider::LocationProvider;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::SendError;
use tracing::{debug, info, warn};

/// Calls the gateway made into the provider, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderCall {
    StartUpdates(UpdateConfig),
    StopUpdates,
    RequestAuthorization,
}

#[derive(Clone, Debug)]
pub struct SimulationSettings {
    pub service_enabled: bool,
    pub initial_authorization: AuthorizationStatus,
    /// Status the simulated user picks when prompted
    pub granted_authorization: AuthorizationStatus,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            service_enabled: true,
            initial_authorization: AuthorizationStatus::NotDetermined,
            granted_authorization: AuthorizationStatus::AuthorizedWhenInUse,
        }
    }
}

#[derive(Debug)]
struct SimulatedState {
    service_enabled: bool,
    authorization: AuthorizationStatus,
    granted_authorization: AuthorizationStatus,
    active_config: Option<UpdateConfig>,
    calls: Vec<ProviderCall>,
}

/// In-process stand-in for a platform location service.
#[derive(Debug)]
pub struct SimulatedProvider {
    state: Mutex<SimulatedState>,
    events: Sender<ProviderEvent>,
}

impl SimulatedProvider {
    pub fn new(events: Sender<ProviderEvent>, settings: SimulationSettings) -> Self {
        SimulatedProvider {
            state: Mutex::new(SimulatedState {
                service_enabled: settings.service_enabled,
                authorization: settings.initial_authorization,
                granted_authorization: settings.granted_authorization,
                active_config: None,
                calls: Vec::new(),
            }),
            events,
        }
    }

    pub fn set_service_enabled(&self, enabled: bool) {
        info!("🛰️ Location services {}", if enabled { "enabled" } else { "disabled" });
        self.state().service_enabled = enabled;
    }

    /// Changes the authorization outside of a prompt, as a settings change would, and reports it.
    pub async fn change_authorization(&self, status: AuthorizationStatus) -> Result<(), SendError<ProviderEvent>> {
        info!("🛰️ Authorization changed to '{}'", status);
        self.state().authorization = status;
        self.deliver(ProviderEvent::AuthorizationChanged(status)).await
    }

    pub async fn deliver(&self, event: ProviderEvent) -> Result<(), SendError<ProviderEvent>> {
        self.events.send(event).await
    }

    pub fn is_updating(&self) -> bool {
        self.state().active_config.is_some()
    }

    pub fn active_config(&self) -> Option<UpdateConfig> {
        self.state().active_config.clone()
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state().calls.clone()
    }

    fn state(&self) -> MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocationProvider for SimulatedProvider {
    fn is_service_enabled(&self) -> bool {
        self.state().service_enabled
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        self.state().authorization
    }

    fn start_updates(&self, config: &UpdateConfig) {
        let mut state = self.state();
        state.calls.push(ProviderCall::StartUpdates(config.clone()));
        state.active_config = Some(config.clone());
        debug!(?config, "🛰️ Streaming updates");
    }

    fn stop_updates(&self) {
        let mut state = self.state();
        state.calls.push(ProviderCall::StopUpdates);
        state.active_config = None;
        debug!("🛰️ Stopped streaming updates");
    }

    fn request_authorization(&self) {
        let mut state = self.state();
        state.calls.push(ProviderCall::RequestAuthorization);

        // Platforms only prompt while the status is undetermined
        if !state.authorization.is_undetermined() {
            debug!(status = %state.authorization, "🛰️ Authorization already determined, not prompting");
            return;
        }

        state.authorization = state.granted_authorization;
        let event = ProviderEvent::AuthorizationChanged(state.granted_authorization);
        if let Err(e) = self.events.try_send(event) {
            warn!("⚠️ Could not report the authorization decision: {}", e);
        }
    }
}
