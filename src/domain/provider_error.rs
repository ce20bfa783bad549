use serde::Deserialize;
use thiserror::Error;

/// Failures reported asynchronously by the location provider.
#[derive(Error, Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderError {
    #[error("access to location data was denied")]
    Denied,
    #[error("the location is currently unknown")]
    LocationUnknown,
    #[error("the network was unavailable")]
    Network,
    #[error("the heading could not be determined")]
    HeadingFailure,
    #[error("provider failure: {0}")]
    Other(String),
}

impl ProviderError {
    pub fn is_denied(&self) -> bool {
        matches!(self, ProviderError::Denied)
    }
}
