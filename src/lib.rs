pub mod app_config;
pub mod domain;
pub mod gateway;
mod location_sample_deserializer;
pub mod provider;
pub mod simulation;
