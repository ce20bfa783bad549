use crate::domain::ProviderError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq)]
pub enum GatewayError {
    #[error("location services are disabled")]
    Disabled,
    #[error("location access is not authorized")]
    NotAuthorized,
    #[error(transparent)]
    Custom(#[from] ProviderError),
    #[error("the permission request was superseded by a newer request")]
    Superseded,
    #[error("no response received within {0:?}")]
    TimedOut(Duration),
    #[error("the location gateway is no longer running")]
    Closed,
}
