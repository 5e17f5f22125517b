//! The library hub: registration, constraint lookup and dependency edges.

use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::debug;

use libhub_core::{Library, LibrarySource, Version, VersionSpec};

use crate::{RegistryError, RegistryResult};

/// In-memory registry of every version of every library
///
/// Names keep their registration order, and so do the versions under each
/// name.
#[derive(Debug, Clone, Default)]
pub struct Hub {
    libraries: IndexMap<String, Vec<Library>>,
}

impl Hub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a library and return the stored entry
    pub fn register(
        &mut self,
        name: &str,
        version: &str,
        registered_by: &str,
    ) -> RegistryResult<&Library> {
        let library =
            Library::new(name, version, registered_by).map_err(|source| {
                RegistryError::Registration {
                    name: name.to_string(),
                    source,
                }
            })?;

        let entries = self.libraries.entry(name.to_string()).or_default();
        if entries.iter().any(|existing| existing.version() == library.version()) {
            return Err(RegistryError::Duplicate {
                name: name.to_string(),
                version: *library.version(),
            });
        }

        debug!(library = %library.id(), registered_by, "Registered library");
        let index = entries.len();
        entries.push(library);
        Ok(&entries[index])
    }

    /// Get the latest registered version of `name` that satisfies `spec`.
    ///
    /// An unregistered name, or one with no satisfying version, yields
    /// `Ok(None)`; only a malformed specification is an error.
    pub fn lookup(&self, name: &str, spec: &str) -> RegistryResult<Option<&Library>> {
        let spec = parse_spec(name, spec)?;
        Ok(self.lookup_spec(name, &spec))
    }

    /// Same as [`Hub::lookup`] with an already parsed specification
    pub fn lookup_spec(&self, name: &str, spec: &VersionSpec) -> Option<&Library> {
        self.versions(name)
            .iter()
            .filter(|library| library.satisfies(spec))
            .reduce(|best, library| {
                if library.version() > best.version() {
                    library
                } else {
                    best
                }
            })
    }

    /// Get the library registered as exactly `name@version`
    pub fn get(&self, name: &str, version: &Version) -> Option<&Library> {
        self.versions(name)
            .iter()
            .find(|library| library.version() == version)
    }

    /// Every registered version of `name`, in registration order
    pub fn versions(&self, name: &str) -> &[Library] {
        self.libraries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Registered library names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.libraries.keys().map(String::as_str)
    }

    /// Every registered library
    pub fn libraries(&self) -> impl Iterator<Item = &Library> {
        self.libraries.values().flatten()
    }

    /// Number of registered (name, version) entries
    pub fn len(&self) -> usize {
        self.libraries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make `lib_name@lib_version` depend on the latest version of
    /// `dep_name` that satisfies `dep_spec`.
    ///
    /// The receiving library is updated on a copy that replaces the stored
    /// entry only once every rule has passed.
    pub fn add_dependency(
        &mut self,
        lib_name: &str,
        lib_version: &str,
        dep_name: &str,
        dep_spec: &str,
    ) -> RegistryResult<()> {
        let version = parse_version(lib_name, lib_version)?;
        let spec = parse_spec(dep_name, dep_spec)?;

        if !self.libraries.contains_key(dep_name) {
            return Err(RegistryError::UnknownLibrary {
                name: dep_name.to_string(),
            });
        }
        let dep = self
            .lookup_spec(dep_name, &spec)
            .ok_or_else(|| RegistryError::Unsatisfied {
                name: dep_name.to_string(),
                spec: spec.to_string(),
            })?
            .clone();

        let position = self.locate(lib_name, &version)?;
        let mut updated = self.libraries[lib_name][position].clone();
        let id = updated.id();
        updated
            .add_dependency(&dep, &*self)
            .map_err(|source| RegistryError::Dependency {
                library: id.clone(),
                source,
            })?;

        debug!(library = %id, dependency = %dep.id(), "Added dependency");
        self.libraries[lib_name][position] = updated;
        Ok(())
    }

    /// Remove the dependency on exactly `dep_name@dep_version` from
    /// `lib_name@lib_version`
    pub fn remove_dependency(
        &mut self,
        lib_name: &str,
        lib_version: &str,
        dep_name: &str,
        dep_version: &str,
    ) -> RegistryResult<()> {
        let version = parse_version(lib_name, lib_version)?;
        let dep_version = parse_version(dep_name, dep_version)?;

        let dep = self
            .get(dep_name, &dep_version)
            .ok_or_else(|| self.missing(dep_name, dep_version))?
            .clone();

        let position = self.locate(lib_name, &version)?;
        let library = &mut self.libraries[lib_name][position];
        library
            .remove_dependency(&dep)
            .map_err(|source| RegistryError::Dependency {
                library: library.id(),
                source,
            })?;

        debug!(library = %library.id(), dependency = %dep.id(), "Removed dependency");
        Ok(())
    }

    /// Registrants of the libraries `lib_name@lib_version` requires.
    ///
    /// The dependency graph is walked breadth-first up to `level` edges from
    /// the library (`None` walks everything). The library's own registrant
    /// is only included if one of its dependencies shares it.
    pub fn contacts(
        &self,
        lib_name: &str,
        lib_version: &str,
        level: Option<usize>,
    ) -> RegistryResult<BTreeSet<String>> {
        let version = parse_version(lib_name, lib_version)?;
        let root = self
            .get(lib_name, &version)
            .ok_or_else(|| self.missing(lib_name, version))?;

        let mut contacts = BTreeSet::new();
        let mut seen: HashSet<(&str, &Version)> = HashSet::from([(root.name(), root.version())]);
        let mut queue = VecDeque::from([(root, 0usize)]);

        while let Some((library, depth)) = queue.pop_front() {
            if level.is_some_and(|max| depth >= max) {
                continue;
            }
            for (name, version) in library.dependencies() {
                if !seen.insert((name, version)) {
                    continue;
                }
                if let Some(dep) = self.get(name, version) {
                    contacts.insert(dep.registered_by().to_string());
                    queue.push_back((dep, depth + 1));
                }
            }
        }

        Ok(contacts)
    }

    /// Position of `name@version` within the versions of `name`
    fn locate(&self, name: &str, version: &Version) -> RegistryResult<usize> {
        self.versions(name)
            .iter()
            .position(|library| library.version() == version)
            .ok_or_else(|| self.missing(name, *version))
    }

    fn missing(&self, name: &str, version: Version) -> RegistryError {
        if self.libraries.contains_key(name) {
            RegistryError::MissingVersion {
                name: name.to_string(),
                version,
            }
        } else {
            RegistryError::UnknownLibrary {
                name: name.to_string(),
            }
        }
    }
}

impl LibrarySource for Hub {
    fn library(&self, name: &str, version: &Version) -> Option<&Library> {
        self.get(name, version)
    }
}

fn parse_version(name: &str, input: &str) -> RegistryResult<Version> {
    input
        .parse()
        .map_err(|source| RegistryError::InvalidVersion {
            name: name.to_string(),
            input: input.to_string(),
            source,
        })
}

fn parse_spec(name: &str, input: &str) -> RegistryResult<VersionSpec> {
    VersionSpec::parse(input).map_err(|source| RegistryError::InvalidSpecification {
        name: name.to_string(),
        input: input.to_string(),
        source,
    })
}
