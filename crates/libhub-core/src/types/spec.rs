//! Version specifications.
//!
//! A specification is an optional [`Modifier`] plus a base [`Version`]:
//! `1.2.3` (exact), `~1.2.3`, `^1.2.3` or `+1.2.3`.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::version::{Modifier, Version};
use crate::error::SpecError;

/// Constraint selecting a subset of versions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionSpec {
    modifier: Option<Modifier>,
    version: Version,
    text: String,
}

impl VersionSpec {
    /// Parse a version specification string
    pub fn parse(input: &str) -> Result<Self, SpecError> {
        let first = input.chars().next().ok_or(SpecError::Empty)?;
        if Modifier::from_char(first).is_none() && !first.is_ascii_digit() {
            return Err(SpecError::InvalidPrefix {
                input: input.to_string(),
                found: first,
            });
        }

        let (modifier, version) =
            Version::parse_with_modifier(input).map_err(|source| SpecError::InvalidVersion {
                input: input.to_string(),
                source,
            })?;

        Ok(Self {
            modifier,
            version,
            text: input.to_string(),
        })
    }

    /// The range modifier, `None` for an exact match
    pub fn modifier(&self) -> Option<Modifier> {
        self.modifier
    }

    /// The base version of the range
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Check if a version meets this specification
    pub fn satisfies(&self, version: &Version) -> bool {
        let base = &self.version;
        match self.modifier {
            Some(Modifier::Tilde) => {
                base.major == version.major && base.minor == version.minor && base <= version
            },
            Some(Modifier::Caret) => base.major == version.major && base <= version,
            Some(Modifier::Plus) => base <= version,
            None => base == version,
        }
    }
}

impl FromStr for VersionSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionSpec::parse(s)
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for VersionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn version() -> impl Strategy<Value = Version> {
        (0u64..20, 0u64..20, 0u64..20).prop_map(|(a, b, c)| Version::new(a, b, c))
    }

    proptest! {
        #[test]
        fn tilde_implies_caret_implies_plus(base in version(), candidate in version()) {
            let tilde = VersionSpec::parse(&format!("~{}", base)).unwrap();
            let caret = VersionSpec::parse(&format!("^{}", base)).unwrap();
            let plus = VersionSpec::parse(&format!("+{}", base)).unwrap();

            if tilde.satisfies(&candidate) {
                prop_assert!(caret.satisfies(&candidate));
            }
            if caret.satisfies(&candidate) {
                prop_assert!(plus.satisfies(&candidate));
            }
            prop_assert_eq!(plus.satisfies(&candidate), base <= candidate);
        }

        #[test]
        fn exact_spec_only_matches_itself(base in version(), candidate in version()) {
            let exact = VersionSpec::parse(&base.to_string()).unwrap();
            prop_assert_eq!(exact.satisfies(&candidate), base == candidate);
        }
    }
}
