use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    Foreground,
    Background,
}

/// Provider settings passed to `start_updates`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UpdateConfig {
    pub desired_accuracy_m: f64,
    #[serde(default)]
    pub distance_filter_m: Option<f64>,
    #[serde(default)]
    pub allows_background_updates: bool,
    #[serde(default = "default_pauses_automatically")]
    pub pauses_automatically: bool,
}

fn default_pauses_automatically() -> bool {
    true
}

impl UpdateConfig {
    pub fn for_mode(&self, mode: UpdateMode) -> UpdateConfig {
        match mode {
            UpdateMode::Foreground => self.clone(),
            UpdateMode::Background => UpdateConfig {
                allows_background_updates: true,
                pauses_automatically: false,
                ..self.clone()
            },
        }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        UpdateConfig {
            desired_accuracy_m: 10.0,
            distance_filter_m: None,
            allows_background_updates: false,
            pauses_automatically: true,
        }
    }
}
