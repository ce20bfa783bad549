use crate::domain::{AuthorizationStatus, UpdateConfig};
use std::fmt::Debug;

/// Outbound side of a platform location service. Inbound traffic arrives as
/// [`ProviderEvent`](crate::domain::ProviderEvent)s on a channel.
pub trait LocationProvider: Debug + Send + Sync {
    fn is_service_enabled(&self) -> bool;

    fn authorization_status(&self) -> AuthorizationStatus;

    fn start_updates(&self, config: &UpdateConfig);

    fn stop_updates(&self);

    /// Shows the platform authorization prompt. The outcome is reported later as an authorization change.
    fn request_authorization(&self);
}
