//! Registered libraries and their dependency edges.
//!
//! A [`Library`] records its dependencies as `name -> exact version` keys
//! rather than owning the libraries it depends on. Walking the dependency
//! closure goes back through a [`LibrarySource`], which the registry
//! implements, so the graph has a single owner and no reference cycles.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::{Version, VersionSpec};
use crate::error::{LibraryError, LibraryResult};

/// Unique identifier for a registered library
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LibraryId {
    /// Library name
    pub name: String,
    /// Exact version
    pub version: Version,
}

/// Lookup of registered libraries by exact name and version
pub trait LibrarySource {
    /// Get the library registered as `name@version`, if any
    fn library(&self, name: &str, version: &Version) -> Option<&Library>;
}

/// A published library
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Library {
    name: String,
    version: Version,
    registered_by: String,
    dependencies: IndexMap<String, Version>,
}

impl LibraryId {
    /// Create a new library ID
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl Library {
    /// Create a new library from an exact version string
    pub fn new(
        name: impl Into<String>,
        version: &str,
        registered_by: impl Into<String>,
    ) -> LibraryResult<Self> {
        let name = name.into();
        let parsed = version
            .parse()
            .map_err(|source| LibraryError::InvalidVersion {
                name: name.clone(),
                input: version.to_string(),
                source,
            })?;
        Self::with_version(name, parsed, registered_by)
    }

    /// Create a new library from an already parsed version
    pub fn with_version(
        name: impl Into<String>,
        version: Version,
        registered_by: impl Into<String>,
    ) -> LibraryResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LibraryError::InvalidName);
        }

        Ok(Self {
            name,
            version,
            registered_by: registered_by.into(),
            dependencies: IndexMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Who registered this library
    pub fn registered_by(&self) -> &str {
        &self.registered_by
    }

    pub fn id(&self) -> LibraryId {
        LibraryId::new(self.name.clone(), self.version)
    }

    /// Dependencies in the order they were added
    pub fn dependencies(&self) -> impl Iterator<Item = (&str, &Version)> {
        self.dependencies
            .iter()
            .map(|(name, version)| (name.as_str(), version))
    }

    /// Version of the dependency named `name`, if this library has one
    pub fn dependency(&self, name: &str) -> Option<&Version> {
        self.dependencies.get(name)
    }

    /// Check if this library has a stable version number
    pub fn is_stable(&self) -> bool {
        self.version.is_stable()
    }

    /// Check if this library's version satisfies a specification
    pub fn satisfies(&self, spec: &VersionSpec) -> bool {
        spec.satisfies(&self.version)
    }

    /// Check if this library's version comes after `other`'s
    pub fn is_later_version_than(&self, other: &Library) -> LibraryResult<bool> {
        if self.name != other.name {
            return Err(LibraryError::NameMismatch {
                left: self.name.clone(),
                right: other.name.clone(),
            });
        }
        Ok(self.version > other.version)
    }

    /// Add `dep` as a library this one depends upon.
    ///
    /// `source` resolves the edges of `dep`'s dependency closure; every
    /// reachable library is checked for a name clash with this library.
    pub fn add_dependency<S>(&mut self, dep: &Library, source: &S) -> LibraryResult<()>
    where
        S: LibrarySource + ?Sized,
    {
        if self.is_stable() && !dep.is_stable() {
            return Err(LibraryError::UnstableDependency {
                library: self.id(),
                dependency: dep.id(),
            });
        }

        if let Some(existing) = self.dependencies.get(&dep.name) {
            return Err(LibraryError::DuplicateDependency {
                library: self.id(),
                name: dep.name.clone(),
                existing: *existing,
            });
        }

        if requires_name(dep, &self.name, source) {
            return Err(LibraryError::CyclicDependency {
                library: self.id(),
                dependency: dep.id(),
            });
        }

        self.dependencies.insert(dep.name.clone(), dep.version);
        Ok(())
    }

    /// Remove `dep` from the dependencies of this library
    pub fn remove_dependency(&mut self, dep: &Library) -> LibraryResult<()> {
        match self.dependencies.get(&dep.name) {
            None => Err(LibraryError::MissingDependency {
                library: self.id(),
                name: dep.name.clone(),
            }),
            Some(stored) if *stored != dep.version => {
                Err(LibraryError::DependencyVersionMismatch {
                    library: self.id(),
                    name: dep.name.clone(),
                    expected: *stored,
                    found: dep.version,
                })
            },
            Some(_) => {
                self.dependencies.shift_remove(&dep.name);
                Ok(())
            },
        }
    }
}

/// Depth-first walk of `start` and everything it requires, stopping at the
/// first library (or dangling edge) named `name`.
fn requires_name<'a, S>(start: &'a Library, name: &str, source: &'a S) -> bool
where
    S: LibrarySource + ?Sized,
{
    let mut stack = vec![start];
    let mut visited: HashSet<(&str, &Version)> = HashSet::new();

    while let Some(library) = stack.pop() {
        if library.name == name {
            return true;
        }
        if !visited.insert((library.name.as_str(), &library.version)) {
            continue;
        }

        for (dep_name, dep_version) in &library.dependencies {
            if dep_name == name {
                return true;
            }
            if let Some(next) = source.library(dep_name, dep_version) {
                stack.push(next);
            }
        }
    }

    false
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} Dependencies: {{",
            self.name, self.version, self.registered_by
        )?;
        for (i, (name, version)) in self.dependencies.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, version)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VersionError;

    /// Flat list of libraries standing in for a registry
    struct Shelf(Vec<Library>);

    impl LibrarySource for Shelf {
        fn library(&self, name: &str, version: &Version) -> Option<&Library> {
            self.0
                .iter()
                .find(|lib| lib.name() == name && lib.version() == version)
        }
    }

    fn lib(name: &str, version: &str) -> Library {
        Library::new(name, version, "ada").unwrap()
    }

    #[test]
    fn test_library_creation() {
        let library = Library::new("serde", "1.0.188", "dtolnay").unwrap();

        assert_eq!(library.name(), "serde");
        assert_eq!(library.version(), &Version::new(1, 0, 188));
        assert_eq!(library.registered_by(), "dtolnay");
        assert_eq!(library.dependencies().count(), 0);
        assert_eq!(library.id().to_string(), "serde@1.0.188");
    }

    #[test]
    fn test_invalid_library_inputs() {
        assert_eq!(Library::new("", "1.0.0", "ada"), Err(LibraryError::InvalidName));
        assert_eq!(Library::new("  ", "1.0.0", "ada"), Err(LibraryError::InvalidName));

        let err = Library::new("serde", "1.0", "ada").unwrap_err();
        assert!(matches!(
            err,
            LibraryError::InvalidVersion {
                source: VersionError::InvalidFormat { .. },
                ..
            }
        ));

        let err = Library::new("serde", "^1.0.0", "ada").unwrap_err();
        assert!(matches!(
            err,
            LibraryError::InvalidVersion {
                source: VersionError::UnexpectedModifier { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_stability_and_spec() {
        assert!(lib("a", "1.0.0").is_stable());
        assert!(!lib("a", "0.3.0").is_stable());

        let spec = VersionSpec::parse("^1.0.0").unwrap();
        assert!(lib("a", "1.4.0").satisfies(&spec));
        assert!(!lib("a", "2.0.0").satisfies(&spec));
    }

    #[test]
    fn test_is_later_version() {
        assert!(lib("a", "1.2.0").is_later_version_than(&lib("a", "1.1.9")).unwrap());
        assert!(!lib("a", "1.2.0").is_later_version_than(&lib("a", "1.2.0")).unwrap());
        assert!(!lib("a", "0.1.0").is_later_version_than(&lib("a", "1.0.0")).unwrap());

        assert!(matches!(
            lib("a", "2.0.0").is_later_version_than(&lib("b", "1.0.0")),
            Err(LibraryError::NameMismatch { .. })
        ));
    }

    #[test]
    fn test_add_dependency() {
        let shelf = Shelf(vec![]);
        let mut app = lib("app", "1.0.0");

        app.add_dependency(&lib("log", "1.2.0"), &shelf).unwrap();
        app.add_dependency(&lib("json", "2.0.0"), &shelf).unwrap();

        let deps: Vec<_> = app.dependencies().collect();
        assert_eq!(
            deps,
            vec![("log", &Version::new(1, 2, 0)), ("json", &Version::new(2, 0, 0))]
        );
        assert_eq!(app.dependency("log"), Some(&Version::new(1, 2, 0)));
    }

    #[test]
    fn test_stable_cannot_depend_on_unstable() {
        let shelf = Shelf(vec![]);
        let mut app = lib("app", "1.0.0");

        let err = app.add_dependency(&lib("beta", "0.9.0"), &shelf).unwrap_err();
        assert!(matches!(err, LibraryError::UnstableDependency { .. }));

        // unstable libraries may depend on anything
        let mut sketch = lib("sketch", "0.1.0");
        sketch.add_dependency(&lib("beta", "0.9.0"), &shelf).unwrap();
        sketch.add_dependency(&lib("app", "1.0.0"), &shelf).unwrap();
    }

    #[test]
    fn test_duplicate_dependency_name() {
        let shelf = Shelf(vec![]);
        let mut app = lib("app", "1.0.0");
        app.add_dependency(&lib("log", "1.0.0"), &shelf).unwrap();

        let err = app.add_dependency(&lib("log", "2.0.0"), &shelf).unwrap_err();
        assert_eq!(
            err,
            LibraryError::DuplicateDependency {
                library: app.id(),
                name: "log".to_string(),
                existing: Version::new(1, 0, 0),
            }
        );
    }

    #[test]
    fn test_self_dependency() {
        let shelf = Shelf(vec![]);
        let mut app = lib("app", "2.0.0");

        let err = app.add_dependency(&lib("app", "1.0.0"), &shelf).unwrap_err();
        assert!(matches!(err, LibraryError::CyclicDependency { .. }));
    }

    #[test]
    fn test_transitive_cycle_through_later_branch() {
        // util depends on [fmt, io]; only the second branch leads back to app.
        let mut io = lib("io", "1.0.0");
        io.add_dependency(&lib("app", "1.0.0"), &Shelf(vec![])).unwrap();

        let mut util = lib("util", "1.0.0");
        util.add_dependency(&lib("fmt", "1.0.0"), &Shelf(vec![])).unwrap();
        util.add_dependency(&io, &Shelf(vec![])).unwrap();

        let shelf = Shelf(vec![lib("fmt", "1.0.0"), io, util.clone()]);

        let mut app = lib("app", "2.0.0");
        let err = app.add_dependency(&util, &shelf).unwrap_err();
        assert!(matches!(err, LibraryError::CyclicDependency { .. }));
        assert_eq!(app.dependencies().count(), 0);
    }

    #[test]
    fn test_unrelated_closure_is_accepted() {
        let mut io = lib("io", "1.0.0");
        io.add_dependency(&lib("fmt", "1.0.0"), &Shelf(vec![])).unwrap();
        let shelf = Shelf(vec![lib("fmt", "1.0.0"), io.clone()]);

        let mut app = lib("app", "1.0.0");
        app.add_dependency(&io, &shelf).unwrap();
        assert_eq!(app.dependency("io"), Some(&Version::new(1, 0, 0)));
    }

    #[test]
    fn test_remove_dependency() {
        let shelf = Shelf(vec![]);
        let mut app = lib("app", "1.0.0");
        app.add_dependency(&lib("log", "1.2.0"), &shelf).unwrap();

        let err = app.remove_dependency(&lib("log", "1.3.0")).unwrap_err();
        assert!(matches!(err, LibraryError::DependencyVersionMismatch { .. }));

        app.remove_dependency(&lib("log", "1.2.0")).unwrap();
        assert_eq!(app.dependency("log"), None);

        let err = app.remove_dependency(&lib("log", "1.2.0")).unwrap_err();
        assert!(matches!(err, LibraryError::MissingDependency { .. }));
    }

    #[test]
    fn test_display() {
        let shelf = Shelf(vec![]);
        let mut app = Library::new("app", "1.0.0", "grace").unwrap();
        assert_eq!(app.to_string(), "app 1.0.0 grace Dependencies: {}");

        app.add_dependency(&lib("log", "1.2.0"), &shelf).unwrap();
        app.add_dependency(&lib("json", "2.0.0"), &shelf).unwrap();
        assert_eq!(
            app.to_string(),
            "app 1.0.0 grace Dependencies: {log: 1.2.0, json: 2.0.0}"
        );
    }
}
