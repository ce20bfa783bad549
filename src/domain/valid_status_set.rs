use crate::domain::AuthorizationStatus;
use serde::Deserialize;
use std::collections::HashSet;

/// The authorization statuses under which the gateway is allowed to request locations.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ValidStatusSet(HashSet<AuthorizationStatus>);

impl ValidStatusSet {
    pub fn contains(&self, status: AuthorizationStatus) -> bool {
        self.0.contains(&status)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ValidStatusSet {
    fn default() -> Self {
        ValidStatusSet::from_iter([AuthorizationStatus::AuthorizedWhenInUse, AuthorizationStatus::AuthorizedAlways])
    }
}

impl FromIterator<AuthorizationStatus> for ValidStatusSet {
    fn from_iter<I: IntoIterator<Item = AuthorizationStatus>>(iter: I) -> Self {
        ValidStatusSet(iter.into_iter().collect())
    }
}
