// ── Profile identity ──
//
// A managed profile is known externally by `operator/profile`. Only the
// profile part appears in API paths; the operator selects the collection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::profile::validate_id;
use crate::error::CoreError;

/// Composite external id of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileAddress {
    pub operator: String,
    pub profile: String,
}

impl ProfileAddress {
    pub fn new(operator: impl Into<String>, profile: impl Into<String>) -> Result<Self, CoreError> {
        let addr = Self {
            operator: operator.into(),
            profile: profile.into(),
        };
        validate_id("operator", &addr.operator)?;
        validate_id("id", &addr.profile)?;
        Ok(addr)
    }

    /// Collection path all of this operator's profiles live under.
    pub fn collection_path(&self) -> String {
        collection_path(&self.operator)
    }
}

pub(crate) fn collection_path(operator: &str) -> String {
    format!("/operator/{operator}/profile")
}

impl fmt::Display for ProfileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.operator, self.profile)
    }
}

impl FromStr for ProfileAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((operator, profile)) = s.split_once('/') else {
            return Err(CoreError::validation(
                "import id",
                format!("'{s}' must have the form operator/profile"),
            ));
        };
        Self::new(operator, profile)
    }
}

impl TryFrom<String> for ProfileAddress {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ProfileAddress> for String {
    fn from(addr: ProfileAddress) -> Self {
        addr.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_composite_id() {
        let addr: ProfileAddress = "acme/abc".parse().unwrap();
        assert_eq!(addr.operator, "acme");
        assert_eq!(addr.profile, "abc");
        assert_eq!(addr.to_string(), "acme/abc");
        assert_eq!(addr.collection_path(), "/operator/acme/profile");
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!("acme".parse::<ProfileAddress>().is_err());
        assert!("acme/abc/extra".parse::<ProfileAddress>().is_err());
        assert!("Acme/abc".parse::<ProfileAddress>().is_err());
    }
}
