//! Error types and result aliases for the layers below the registry.
//!
//! Each layer fails with its own precise error: versions with
//! [`VersionError`], specifications with [`SpecError`] and libraries with
//! [`LibraryError`]. Lower errors are kept as `source()` so callers can walk
//! the chain.

use thiserror::Error;

use crate::types::{LibraryId, Version};

/// Version parsing and validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Version string is empty")]
    Empty,

    #[error("Version '{input}' must start with a digit or one of '~', '^', '+'")]
    InvalidStart { input: String },

    #[error("Version '{input}' must have exactly three dot-separated parts, found {parts}")]
    InvalidFormat { input: String, parts: usize },

    #[error("Invalid number in version: '{component}'")]
    InvalidNumber { component: String },

    #[error("Version '{input}' is an exact version and cannot carry a '{modifier}' prefix")]
    UnexpectedModifier { input: String, modifier: char },
}

/// Version specification parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("Version specification is empty")]
    Empty,

    #[error("Version specification '{input}' starts with '{found}', expected a digit or one of '~', '^', '+'")]
    InvalidPrefix { input: String, found: char },

    #[error("Version specification '{input}' does not contain a valid version")]
    InvalidVersion {
        input: String,
        #[source]
        source: VersionError,
    },
}

/// Library construction and dependency rule violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("Library name must not be empty")]
    InvalidName,

    #[error("Library '{name}' has an invalid version '{input}'")]
    InvalidVersion {
        name: String,
        input: String,
        #[source]
        source: VersionError,
    },

    #[error("Cannot compare versions of differently named libraries '{left}' and '{right}'")]
    NameMismatch { left: String, right: String },

    #[error("Stable library {library} cannot depend on unstable library {dependency}")]
    UnstableDependency {
        library: LibraryId,
        dependency: LibraryId,
    },

    #[error("{library} already depends on {name}@{existing}")]
    DuplicateDependency {
        library: LibraryId,
        name: String,
        existing: Version,
    },

    #[error("{library} cannot depend on {dependency}: it requires a library named '{}'", .library.name)]
    CyclicDependency {
        library: LibraryId,
        dependency: LibraryId,
    },

    #[error("{library} does not depend on '{name}'")]
    MissingDependency { library: LibraryId, name: String },

    #[error("{library} depends on {name}@{expected}, not {name}@{found}")]
    DependencyVersionMismatch {
        library: LibraryId,
        name: String,
        expected: Version,
        found: Version,
    },
}

/// Result type alias for library operations
pub type LibraryResult<T> = Result<T, LibraryError>;

impl LibraryError {
    /// Check if this error is a dependency rule violation rather than bad input
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            LibraryError::UnstableDependency { .. }
                | LibraryError::DuplicateDependency { .. }
                | LibraryError::CyclicDependency { .. }
        )
    }
}
