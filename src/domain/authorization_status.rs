use serde::Deserialize;
use std::fmt::Display;

/// Authorization state reported by the platform. The gateway only ever reads it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Denied,
    Restricted,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl AuthorizationStatus {
    pub fn is_undetermined(&self) -> bool {
        matches!(self, AuthorizationStatus::NotDetermined)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AuthorizationStatus::Denied | AuthorizationStatus::Restricted)
    }
}

impl Display for AuthorizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            AuthorizationStatus::NotDetermined => "not determined",
            AuthorizationStatus::Denied => "denied",
            AuthorizationStatus::Restricted => "restricted",
            AuthorizationStatus::AuthorizedWhenInUse => "authorized when in use",
            AuthorizationStatus::AuthorizedAlways => "authorized always",
        };
        write!(f, "{}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AuthorizationStatus::NotDetermined, false)]
    #[case(AuthorizationStatus::Denied, true)]
    #[case(AuthorizationStatus::Restricted, true)]
    #[case(AuthorizationStatus::AuthorizedWhenInUse, false)]
    #[case(AuthorizationStatus::AuthorizedAlways, false)]
    fn treats_restricted_as_denied(#[case] status: AuthorizationStatus, #[case] denied: bool) {
        assert_eq!(status.is_denied(), denied);
    }

    #[test]
    fn deserializes_snake_case_names() {
        let status: AuthorizationStatus = serde_json::from_str("\"authorized_when_in_use\"").unwrap();
        assert_eq!(status, AuthorizationStatus::AuthorizedWhenInUse);
    }
}
