mod error;
mod gateway;
mod service;

pub use error::GatewayError;
pub use gateway::{GatewayConfig, GatewayStatus, LocationGateway, PermissionCallback, PermissionResult, SampleResult, UpdateCallback};
pub use service::{GatewayCommand, GatewayHandle, SampleStream, listen};
