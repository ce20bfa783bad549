use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    pub accuracy: f64, // Horizontal, in meters
}

impl LocationSample {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>, accuracy: f64) -> Self {
        LocationSample {
            latitude,
            longitude,
            timestamp,
            accuracy,
        }
    }

    /// Providers report a zeroed coordinate before they have a fix, such a sample is never forwarded.
    pub fn is_valid(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(51.8615899, 4.3580323, true)]
    #[case(-33.8688, -151.2093, true)]
    #[case(0.0, 0.0, false)]
    #[case(0.0, 4.3580323, false)]
    #[case(51.8615899, 0.0, false)]
    fn is_valid_requires_non_zero_coordinates(#[case] latitude: f64, #[case] longitude: f64, #[case] expected: bool) {
        let sample = LocationSample::new(latitude, longitude, Utc::now(), 5.0);
        assert_eq!(sample.is_valid(), expected);
    }
}
