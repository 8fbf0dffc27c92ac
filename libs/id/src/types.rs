//! Typed ID definitions for cloud resources and the provider ID codec.

use url::Url;

use crate::define_id;
use crate::IdError;

// =============================================================================
// Cloud Resources
// =============================================================================

define_id!(DatacenterId, "datacenter");
define_id!(ServerId, "server");

// =============================================================================
// Provider ID
// =============================================================================

/// URL scheme used by all provider IDs issued by this provider.
pub const PROVIDER_ID_SCHEME: &str = "ionos";

/// External identity of a machine: the datacenter it lives in and the
/// server backing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderId {
    datacenter_id: DatacenterId,
    server_id: ServerId,
}

impl ProviderId {
    /// Encodes a datacenter/server pair into its URI form.
    ///
    /// This is a pure concatenation; no validation takes place.
    #[must_use]
    pub fn encode(datacenter_id: &str, server_id: &str) -> String {
        format!("{PROVIDER_ID_SCHEME}:///{datacenter_id}/{server_id}")
    }

    /// Decodes a provider ID.
    ///
    /// Fails if the input is not a URI, uses a foreign scheme, does not
    /// carry exactly two non-empty path segments, or if either segment is
    /// not a UUID.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        let url = Url::parse(s).map_err(|e| IdError::MalformedIdentity(e.to_string()))?;

        if url.scheme() != PROVIDER_ID_SCHEME {
            return Err(IdError::UnsupportedScheme {
                expected: PROVIDER_ID_SCHEME,
                actual: url.scheme().to_string(),
            });
        }

        let path = url.path().strip_prefix('/').unwrap_or(url.path());
        let segments: Vec<&str> = path.split('/').collect();

        let [datacenter, server] = segments.as_slice() else {
            return Err(IdError::IncompleteIdentity(s.to_string()));
        };

        if datacenter.is_empty() || server.is_empty() {
            return Err(IdError::IncompleteIdentity(s.to_string()));
        }

        Ok(Self {
            datacenter_id: DatacenterId::parse(datacenter)?,
            server_id: ServerId::parse(server)?,
        })
    }

    /// Returns the datacenter component.
    #[must_use]
    pub fn datacenter_id(&self) -> &DatacenterId {
        &self.datacenter_id
    }

    /// Returns the server component.
    #[must_use]
    pub fn server_id(&self) -> &ServerId {
        &self.server_id
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&Self::encode(
            self.datacenter_id.as_str(),
            self.server_id.as_str(),
        ))
    }
}

impl std::str::FromStr for ProviderId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for ProviderId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ProviderId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const DATACENTER: &str = "01234567-89ab-4def-0123-c56789abcdef";
    const SERVER: &str = "6789abcd-ef01-4345-6789-abcdef012325";

    #[test]
    fn test_encode() {
        assert_eq!(
            ProviderId::encode(DATACENTER, SERVER),
            format!("ionos:///{DATACENTER}/{SERVER}")
        );
    }

    #[test]
    fn test_parse_valid() {
        let id = ProviderId::parse(&ProviderId::encode(DATACENTER, SERVER)).unwrap();
        assert_eq!(id.datacenter_id().as_str(), DATACENTER);
        assert_eq!(id.server_id().as_str(), SERVER);
        assert_eq!(id.to_string(), ProviderId::encode(DATACENTER, SERVER));
    }

    #[test]
    fn test_parse_malformed() {
        let err = ProviderId::parse("not a uri").unwrap_err();
        assert!(matches!(err, IdError::MalformedIdentity(_)));

        let err = ProviderId::parse("").unwrap_err();
        assert!(matches!(err, IdError::MalformedIdentity(_)));
    }

    #[test]
    fn test_parse_unsupported_scheme() {
        let err = ProviderId::parse("invalid:///test").unwrap_err();
        assert_eq!(
            err,
            IdError::UnsupportedScheme {
                expected: "ionos",
                actual: "invalid".to_string(),
            }
        );
    }

    #[rstest]
    #[case("ionos:///test")]
    #[case("ionos:///01234567-89ab-4def-0123-c56789abcdef")]
    #[case("ionos:///01234567-89ab-4def-0123-c56789abcdef/")]
    #[case("ionos:////6789abcd-ef01-4345-6789-abcdef012325")]
    #[case("ionos:///a/b/c")]
    fn test_parse_incomplete(#[case] input: &str) {
        let err = ProviderId::parse(input).unwrap_err();
        assert!(matches!(err, IdError::IncompleteIdentity(_)), "{input}: {err}");
    }

    #[test]
    fn test_parse_invalid_server_component() {
        let err = ProviderId::parse(&format!("ionos:///{DATACENTER}/nan")).unwrap_err();
        match err {
            IdError::InvalidComponent {
                component, value, ..
            } => {
                assert_eq!(component, "server");
                assert_eq!(value, "nan");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_invalid_datacenter_component() {
        let err = ProviderId::parse("ionos:///test/nan").unwrap_err();
        assert!(matches!(
            err,
            IdError::InvalidComponent {
                component: "datacenter",
                ..
            }
        ));
        assert!(err.to_string().starts_with("datacenter ID found is invalid"));
    }

    #[test]
    fn test_typed_id_keeps_original_text() {
        let upper = "01234567-89AB-4DEF-0123-C56789ABCDEF";
        let id = DatacenterId::parse(upper).unwrap();
        assert_eq!(id.as_str(), upper);
    }

    #[test]
    fn test_provider_id_serde() {
        let id = ProviderId::parse(&ProviderId::encode(DATACENTER, SERVER)).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"ionos:///{DATACENTER}/{SERVER}\""));

        let back: ProviderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let bad: Result<ProviderId, _> = serde_json::from_str("\"ionos:///x/y\"");
        assert!(bad.is_err());
    }
}
