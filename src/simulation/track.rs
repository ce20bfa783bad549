use crate::domain::{AuthorizationStatus, LocationSample, ProviderError};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackStep {
    Samples(Vec<LocationSample>),
    Error(ProviderError),
    Authorization(AuthorizationStatus),
    ServiceEnabled(bool),
}

/// A scripted sequence of provider behaviour.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Track {
    steps: Vec<TrackStep>,
}

impl Track {
    pub fn new(steps: Vec<TrackStep>) -> Self {
        Track { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl IntoIterator for Track {
    type Item = TrackStep;
    type IntoIter = std::vec::IntoIter<TrackStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("unable to read track: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse track: {0}")]
    Parse(#[from] serde_json::Error),
}

#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn load_track(path: impl AsRef<Path>) -> Result<Track, TrackError> {
    debug!("Loading track...");
    let json = tokio::fs::read_to_string(path.as_ref()).await?;
    let track = serde_json::from_str::<Track>(&json)?;
    debug!(steps = track.len(), "Loading track... OK");

    Ok(track)
}
