use crate::domain::{AuthorizationStatus, UpdateConfig, ValidStatusSet};
use crate::gateway::GatewayConfig;
use crate::simulation::SimulationSettings;
use config::{Config, ConfigError};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    gateway: Gateway,
    updates: UpdateConfig,
    simulation: Simulation,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name("config").required(true))
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(config::Environment::with_prefix("LOCATION_GATEWAY").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn updates(&self) -> &UpdateConfig {
        &self.updates
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            valid_statuses: self.gateway.valid_statuses.clone(),
            updates: self.updates.clone(),
            subscriber_capacity: self.gateway.subscriber_capacity,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Gateway {
    command_buffer_size: usize,
    event_buffer_size: usize,
    subscriber_capacity: usize,
    #[serde(default)]
    valid_statuses: ValidStatusSet,
    #[serde(with = "humantime_serde")]
    request_timeout: Duration,
}

impl Gateway {
    // Channels need a capacity of at least one
    pub fn command_buffer_size(&self) -> usize {
        self.command_buffer_size.max(1)
    }

    pub fn event_buffer_size(&self) -> usize {
        self.event_buffer_size.max(1)
    }

    pub fn valid_statuses(&self) -> &ValidStatusSet {
        &self.valid_statuses
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[derive(Debug, Deserialize)]
pub struct Simulation {
    track: String,
    #[serde(with = "humantime_serde")]
    interval: Duration,
    service_enabled: bool,
    initial_authorization: AuthorizationStatus,
    granted_authorization: AuthorizationStatus,
    samples: usize,
}

impl Simulation {
    pub fn track(&self) -> &str {
        &self.track
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of subscription samples the binary logs before stopping
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn settings(&self) -> SimulationSettings {
        SimulationSettings {
            service_enabled: self.service_enabled,
            initial_authorization: self.initial_authorization,
            granted_authorization: self.granted_authorization,
        }
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                gateway: Gateway {
                    command_buffer_size: 8,
                    event_buffer_size: 8,
                    subscriber_capacity: 4,
                    valid_statuses: ValidStatusSet::default(),
                    request_timeout: Duration::from_secs(5),
                },
                updates: UpdateConfig::default(),
                simulation: Simulation {
                    track: "tests/resources/track.json".to_string(),
                    interval: Duration::from_millis(100),
                    service_enabled: true,
                    initial_authorization: AuthorizationStatus::NotDetermined,
                    granted_authorization: AuthorizationStatus::AuthorizedWhenInUse,
                    samples: 1,
                },
            },
        }
    }

    pub fn buffer_sizes(mut self, command_buffer_size: usize, event_buffer_size: usize) -> Self {
        self.config.gateway.command_buffer_size = command_buffer_size;
        self.config.gateway.event_buffer_size = event_buffer_size;
        self
    }

    pub fn valid_statuses(mut self, valid_statuses: ValidStatusSet) -> Self {
        self.config.gateway.valid_statuses = valid_statuses;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};
    use pretty_assertions::assert_eq;

    const CONFIG: &str = r#"
        [gateway]
        command_buffer_size = 32
        event_buffer_size = 16
        subscriber_capacity = 8
        request_timeout = "30s"

        [updates]
        desired_accuracy_m = 5.0
        distance_filter_m = 10.0

        [simulation]
        track = "resources/track.json"
        interval = "500ms"
        service_enabled = true
        initial_authorization = "not_determined"
        granted_authorization = "authorized_always"
        samples = 3
    "#;

    fn parse(toml: &str) -> Result<AppConfig, ConfigError> {
        Config::builder().add_source(File::from_str(toml, FileFormat::Toml)).build()?.try_deserialize()
    }

    #[test]
    fn parses_a_configuration() {
        let config = parse(CONFIG).unwrap();

        assert_eq!(config.gateway().command_buffer_size(), 32);
        assert_eq!(config.gateway().event_buffer_size(), 16);
        assert_eq!(config.gateway().request_timeout(), Duration::from_secs(30));
        assert_eq!(config.gateway().valid_statuses(), &ValidStatusSet::default());
        assert_eq!(
            config.updates(),
            &UpdateConfig {
                desired_accuracy_m: 5.0,
                distance_filter_m: Some(10.0),
                allows_background_updates: false,
                pauses_automatically: true,
            }
        );
        assert_eq!(config.simulation().interval(), Duration::from_millis(500));
        assert_eq!(config.simulation().settings().granted_authorization, AuthorizationStatus::AuthorizedAlways);
        assert_eq!(config.simulation().samples(), 3);
    }

    #[test]
    fn parses_explicit_valid_statuses() {
        let toml = CONFIG.replace("subscriber_capacity = 8", "subscriber_capacity = 8\nvalid_statuses = [\"authorized_always\"]");
        let config = parse(&toml).unwrap();

        assert!(config.gateway().valid_statuses().contains(AuthorizationStatus::AuthorizedAlways));
        assert!(!config.gateway().valid_statuses().contains(AuthorizationStatus::AuthorizedWhenInUse));
    }

    #[test]
    fn fails_without_a_simulation_section() {
        let toml = CONFIG.split("[simulation]").next().unwrap();
        assert!(parse(toml).is_err());
    }

    #[test]
    fn parses_the_shipped_configuration() {
        let config = parse(include_str!("../config.toml")).unwrap();

        assert_eq!(config.gateway().request_timeout(), Duration::from_secs(10));
        assert_eq!(config.gateway().valid_statuses(), &ValidStatusSet::default());
        assert_eq!(config.simulation().track(), "resources/track.json");
        assert_eq!(config.simulation().settings().initial_authorization, AuthorizationStatus::NotDetermined);
    }

    #[test]
    fn never_reports_a_zero_buffer_size() {
        let config = AppConfigBuilder::new().buffer_sizes(0, 0).build();

        assert_eq!(config.gateway().command_buffer_size(), 1);
        assert_eq!(config.gateway().event_buffer_size(), 1);
    }

    #[test]
    fn builds_the_gateway_config() {
        let valid_statuses = ValidStatusSet::from_iter([AuthorizationStatus::AuthorizedAlways]);
        let config = AppConfigBuilder::new().valid_statuses(valid_statuses.clone()).build();

        let gateway_config = config.gateway_config();

        assert_eq!(gateway_config.valid_statuses, valid_statuses);
        assert_eq!(gateway_config.subscriber_capacity, 4);
        assert_eq!(gateway_config.updates, UpdateConfig::default());
    }
}
