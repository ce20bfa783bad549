use crate::domain::{AuthorizationStatus, LocationSample, ProviderError};

/// Everything a provider can tell the gateway, delivered over a single channel.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderEvent {
    Samples(Vec<LocationSample>),
    Error(ProviderError),
    AuthorizationChanged(AuthorizationStatus),
}
