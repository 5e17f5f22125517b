//! In-memory library registry for libhub
//!
//! This crate provides the [`Hub`], which stores every registered version of
//! every library, answers constraint lookups with the latest matching
//! version, and is the only place dependency edges are added or removed.
//! The [`import`] module loads registrations in bulk from delimited files.

pub mod error;
pub mod hub;
pub mod import;

// Re-export main types
pub use error::RegistryError;
pub use hub::Hub;
pub use import::{hub_from_file, import_file, import_reader, ImportError, ImportReport, SkipReason, SkippedRow};

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
