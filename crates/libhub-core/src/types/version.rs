//! Exact semantic versions.
//!
//! A [`Version`] is a `major.minor.patch` triple with a total order. The
//! same grammar, optionally prefixed by a [`Modifier`], is the body of a
//! version specification, so the prefix-aware parser lives here too.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::VersionError;

/// Semantic version (major.minor.patch)
///
/// Field order matters: the derived ordering compares major, then minor,
/// then patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// Prefix that turns a version into a range in a specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `~1.2.3`: same major and minor, at least 1.2.3
    Tilde,
    /// `^1.2.3`: same major, at least 1.2.3
    Caret,
    /// `+1.2.3`: at least 1.2.3
    Plus,
}

impl Modifier {
    /// Recognize a modifier character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '~' => Some(Modifier::Tilde),
            '^' => Some(Modifier::Caret),
            '+' => Some(Modifier::Plus),
            _ => None,
        }
    }

    /// The character this modifier is written as
    pub fn as_char(self) -> char {
        match self {
            Modifier::Tilde => '~',
            Modifier::Caret => '^',
            Modifier::Plus => '+',
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Version {
    /// Create a new version
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Stable versions have a non-zero major release number
    pub fn is_stable(&self) -> bool {
        self.major != 0
    }

    /// Parse a version that may carry a leading `~`, `^` or `+`.
    ///
    /// The text must start with a digit or a modifier, and what follows the
    /// modifier must be exactly three dot-separated runs of ASCII digits.
    pub fn parse_with_modifier(input: &str) -> Result<(Option<Modifier>, Version), VersionError> {
        let first = input.chars().next().ok_or(VersionError::Empty)?;

        let (modifier, body) = match Modifier::from_char(first) {
            Some(modifier) => (Some(modifier), &input[first.len_utf8()..]),
            None if first.is_ascii_digit() => (None, input),
            None => {
                return Err(VersionError::InvalidStart {
                    input: input.to_string(),
                })
            },
        };

        let parts: Vec<&str> = body.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
                parts: parts.len(),
            });
        }

        Ok((
            modifier,
            Version {
                major: parse_component(parts[0])?,
                minor: parse_component(parts[1])?,
                patch: parse_component(parts[2])?,
            },
        ))
    }
}

// u64::from_str accepts a leading '+', so check the digits first.
fn parse_component(component: &str) -> Result<u64, VersionError> {
    let invalid = || VersionError::InvalidNumber {
        component: component.to_string(),
    };

    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    component.parse().map_err(|_| invalid())
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Version::parse_with_modifier(s)? {
            (None, version) => Ok(version),
            (Some(modifier), _) => Err(VersionError::UnexpectedModifier {
                input: s.to_string(),
                modifier: modifier.as_char(),
            }),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn version() -> impl Strategy<Value = Version> {
        (0u64..1000, 0u64..1000, 0u64..1000).prop_map(|(a, b, c)| Version::new(a, b, c))
    }

    proptest! {
        #[test]
        fn version_round_trip(major in any::<u64>(), minor in any::<u64>(), patch in any::<u64>()) {
            let original = Version::new(major, minor, patch);
            let parsed = Version::from_str(&original.to_string()).unwrap();
            prop_assert_eq!(parsed, original);
        }

        #[test]
        fn version_order_is_total(a in version(), b in version()) {
            let outcomes = [a < b, a == b, a > b];
            prop_assert_eq!(outcomes.iter().filter(|&&held| held).count(), 1);
            prop_assert_eq!(a <= b, a < b || a == b);
            prop_assert_eq!(a >= b, a > b || a == b);
        }

        #[test]
        fn version_order_matches_tuple_order(a in version(), b in version()) {
            prop_assert_eq!(
                a.cmp(&b),
                (a.major, a.minor, a.patch).cmp(&(b.major, b.minor, b.patch))
            );
        }

        #[test]
        fn version_comparison_transitivity(a in version(), b in version(), c in version()) {
            if a < b && b < c {
                prop_assert!(a < c, "Transitivity violated: {} < {} < {} but {} >= {}", a, b, c, a, c);
            }
        }
    }
}
