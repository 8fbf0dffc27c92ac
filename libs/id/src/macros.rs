//! Macros for defining typed resource ID types.

/// Macro to define a typed cloud resource ID.
///
/// The cloud API hands out identifiers as UUID-formatted strings. The
/// generated newtype keeps the exact string it was parsed from so that
/// encoding and decoding are lossless, while guaranteeing it is a
/// well-formed UUID. It provides:
/// - A `COMPONENT` constant used in error messages
/// - `new()` to generate a fresh random ID
/// - `parse()` to validate a string
/// - `Display`, `FromStr`, `AsRef<str>`, `Serialize` and `Deserialize`
///
/// # Example
///
/// ```ignore
/// define_id!(DatacenterId, "datacenter");
///
/// let id: DatacenterId = "01234567-89ab-4def-0123-c56789abcdef".parse()?;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $component:literal) => {
        /// A typed, UUID-validated identifier for this resource type.
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Human readable name of the resource this ID refers to.
            pub const COMPONENT: &'static str = $component;

            /// Creates a new ID from a random UUID.
            #[must_use]
            pub fn new() -> Self {
                Self($crate::Uuid::new_v4().to_string())
            }

            /// Parses an ID from a string, requiring UUID syntax.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                $crate::Uuid::parse_str(s).map_err(|e| $crate::IdError::InvalidComponent {
                    component: Self::COMPONENT,
                    value: s.to_string(),
                    reason: e.to_string(),
                })?;

                Ok(Self(s.to_string()))
            }

            /// Returns the ID exactly as it was parsed.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
