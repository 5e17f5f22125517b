//! Registry error type.
//!
//! Every failure beneath the registry is normalized into [`RegistryError`];
//! the lower-level error, when there is one, is kept as its `source()`.

use std::error::Error;
use thiserror::Error;

use libhub_core::{LibraryError, LibraryId, SpecError, Version, VersionError};

/// Error for all hub operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Cannot register library '{name}'")]
    Registration {
        name: String,
        #[source]
        source: LibraryError,
    },

    #[error("Library {name}@{version} is already registered")]
    Duplicate { name: String, version: Version },

    #[error("Invalid version '{input}' for library '{name}'")]
    InvalidVersion {
        name: String,
        input: String,
        #[source]
        source: VersionError,
    },

    #[error("Invalid version specification '{input}' for library '{name}'")]
    InvalidSpecification {
        name: String,
        input: String,
        #[source]
        source: SpecError,
    },

    #[error("Library '{name}' is not registered")]
    UnknownLibrary { name: String },

    #[error("No registered version of '{name}' satisfies '{spec}'")]
    Unsatisfied { name: String, spec: String },

    #[error("Library {name}@{version} is not registered")]
    MissingVersion { name: String, version: Version },

    #[error("Cannot change the dependencies of {library}")]
    Dependency {
        library: LibraryId,
        #[source]
        source: LibraryError,
    },
}

impl RegistryError {
    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            RegistryError::Duplicate { .. } => {
                Some("Bump the version number to publish a new release")
            },
            RegistryError::InvalidVersion { .. } => {
                Some("Versions are written as major.minor.patch, for example 1.4.2")
            },
            RegistryError::InvalidSpecification { .. } => {
                Some("Use an exact version or prefix it with '~', '^' or '+', for example ^1.4.0")
            },
            RegistryError::UnknownLibrary { .. } | RegistryError::MissingVersion { .. } => {
                Some("Run 'libhub list' to see the registered libraries")
            },
            RegistryError::Unsatisfied { .. } => {
                Some("Loosen the specification or register a matching version")
            },
            RegistryError::Dependency { source, .. } if source.is_rule_violation() => {
                Some(match source {
                    LibraryError::CyclicDependency { .. } => {
                        "Remove circular dependencies by restructuring your libraries"
                    },
                    LibraryError::UnstableDependency { .. } => {
                        "Stable libraries (major version >= 1) may only depend on stable libraries"
                    },
                    _ => "Run 'libhub undepend' to drop the existing edge first",
                })
            },
            _ => None,
        }
    }

    /// Render the error followed by its causes, separated by ": "
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_includes_cause_chain() {
        let err = RegistryError::InvalidSpecification {
            name: "log".to_string(),
            input: "~1.2".to_string(),
            source: SpecError::InvalidVersion {
                input: "~1.2".to_string(),
                source: VersionError::InvalidFormat {
                    input: "~1.2".to_string(),
                    parts: 2,
                },
            },
        };

        let report = err.report();
        assert!(report.starts_with("Invalid version specification '~1.2' for library 'log'"));
        assert!(report.contains("does not contain a valid version"));
        assert!(report.ends_with("must have exactly three dot-separated parts, found 2"));
    }

    #[test]
    fn test_suggestions() {
        let err = RegistryError::UnknownLibrary {
            name: "log".to_string(),
        };
        assert!(err.suggestion().unwrap().contains("libhub list"));

        let err = RegistryError::Dependency {
            library: LibraryId::new("app", Version::new(1, 0, 0)),
            source: LibraryError::MissingDependency {
                library: LibraryId::new("app", Version::new(1, 0, 0)),
                name: "log".to_string(),
            },
        };
        assert_eq!(err.suggestion(), None);
    }

    #[test]
    fn test_rule_violation_suggestions() {
        let app = LibraryId::new("app", Version::new(1, 0, 0));
        let dependency_error = |source| RegistryError::Dependency {
            library: app.clone(),
            source,
        };

        let err = dependency_error(LibraryError::DuplicateDependency {
            library: app.clone(),
            name: "log".to_string(),
            existing: Version::new(1, 0, 0),
        });
        assert!(err.suggestion().unwrap().contains("libhub undepend"));

        let err = dependency_error(LibraryError::CyclicDependency {
            library: app.clone(),
            dependency: LibraryId::new("log", Version::new(1, 0, 0)),
        });
        assert!(err.suggestion().unwrap().contains("circular"));
    }
}
