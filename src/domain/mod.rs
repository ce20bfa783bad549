mod authorization_status;
pub mod events;
mod location_sample;
mod provider_error;
mod update_config;
mod valid_status_set;

pub use authorization_status::AuthorizationStatus;
pub use events::ProviderEvent;
pub use location_sample::LocationSample;
pub use provider_error::ProviderError;
pub use update_config::{UpdateConfig, UpdateMode};
pub use valid_status_set::ValidStatusSet;
