use crate::domain::LocationSample;
use chrono::{DateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};

impl<'de> Deserialize<'de> for LocationSample {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Debug, Deserialize)]
        pub struct Inner {
            latitude: f64,
            longitude: f64,
            accuracy_m: f64,
            timestamp: DateTime<Utc>,
        }

        let inner = Inner::deserialize(deserializer)?;
        if !(inner.latitude >= -90.0 && inner.latitude <= 90.0) {
            return Err(Error::custom(format!("invalid sample latitude: {}, must be between -90 and 90", inner.latitude)));
        }

        if !(inner.longitude >= -180.0 && inner.longitude <= 180.0) {
            return Err(Error::custom(format!("invalid sample longitude: {}, must be between -180 and 180", inner.longitude)));
        }

        if inner.accuracy_m < 0.0 {
            return Err(Error::custom(format!("invalid sample accuracy: {}, must not be negative", inner.accuracy_m)));
        }

        Ok(LocationSample {
            latitude: inner.latitude,
            longitude: inner.longitude,
            timestamp: inner.timestamp,
            accuracy: inner.accuracy_m,
        })
    }
}
